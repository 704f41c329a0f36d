use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;
use vitrine_client::ProfileClient;
use vitrine_core::catalog::last_visit;
use vitrine_core::document::{API_CONTENT, CARDS_CONTAINER, Element, PROFILE_ICON};
use vitrine_core::page::{Page, PageConfig};
use vitrine_core::profile::{PaintOutcome, PanelState};
use vitrine_core::render::{card_lines, panel_lines};
use vitrine_core::store::Storage;
use vitrine_core::store_helpers::{clear_storage, view_storage};
use vitrine_core::wiring::{Reaction, UiEvent};

pub mod jobs;

pub use jobs::{Completion, Job, completion_channel, spawn_job};

const HISTORY_FILE: &str = ".vitrine_history";

#[derive(Debug, Clone, Copy, PartialEq)]
enum ExitMode {
    Normal,    // exit, quit - ask about saving
    ForceQuit, // :q! - don't save, don't ask
    WriteQuit, // :wq!, ZZ - save and quit, don't ask
}

/// Console state: the open page, its store, and the line editor around them.
pub struct App {
    input: String,
    history: Vec<String>,
    output: Vec<String>,
    cursor_position: usize,
    should_quit: bool,
    scroll_offset: usize,
    history_index: Option<usize>,
    temp_input: String,
    awaiting_save_confirmation: bool,
    history_path: PathBuf,
    store: Box<dyn Storage>,
    config: PageConfig,
    page: Page,
    jobs: Vec<Job>,
}

impl App {
    /// Opens the page against `store`. The first profile fetch and the icon
    /// load are queued as jobs.
    pub fn new(mut store: Box<dyn Storage>, config: PageConfig) -> Result<Self> {
        let (page, ticket) = Page::open(store.as_mut(), &config)?;

        let banner = r#"
    ╔══════════════════════════════════════════════╗
    ║   __   __ _  _          _                    ║
    ║   \ \ / /(_)| |_  _ _  (_) _ _   ___         ║
    ║    \ V / | ||  _|| '_| | || ' \ / -_)        ║
    ║     \_/  |_| \__||_|   |_||_||_|\___|        ║
    ║                                              ║
    ║          Dev Tools Store console             ║
    ╚══════════════════════════════════════════════╝
        "#;

        let mut output = Vec::new();
        for line in banner.lines() {
            output.push(line.to_string());
        }
        output.push(String::new());
        output.push("  Type 'help' for available commands, 'exit' or 'quit' to exit.".to_string());
        output.push(String::new());

        let mut app = Self {
            input: String::new(),
            history: Vec::new(),
            output,
            cursor_position: 0,
            should_quit: false,
            scroll_offset: 0,
            history_index: None,
            temp_input: String::new(),
            awaiting_save_confirmation: false,
            history_path: default_history_path(),
            store,
            config,
            page,
            jobs: Vec::new(),
        };
        app.queue_page_jobs(ticket)?;
        Ok(app)
    }

    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = path.into();
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Hands over every queued job; the caller is expected to run them.
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.jobs)
    }

    fn queue_page_jobs(&mut self, ticket: vitrine_core::profile::FetchTicket) -> Result<()> {
        let icon = self.page.document.image(PROFILE_ICON)?.src.clone();
        self.jobs.push(Job::Profile(ticket));
        self.jobs.push(Job::Icon(icon));
        Ok(())
    }

    pub fn add_output(&mut self, message: impl Into<String>) {
        self.output.push(message.into());
        // Keep only last 1000 lines to prevent memory issues
        if self.output.len() > 1000 {
            self.output.drain(0..self.output.len() - 1000);
        }
        // Reset scroll to auto-scroll to bottom on new output
        self.scroll_offset = 0;
    }

    fn add_lines(&mut self, lines: Vec<String>) {
        for line in lines {
            self.add_output(format!("  {}", line));
        }
    }

    /// Applies a finished job to the page.
    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Profile(ticket, fetched) => match self.page.complete_fetch(ticket, fetched) {
                Ok(PaintOutcome::Success) => self.add_output("✓ got customer data"),
                Ok(PaintOutcome::Failure(message)) => {
                    self.add_output(format!("✗ ERROR: {}", message))
                }
                Ok(PaintOutcome::Stale) => self.add_output(format!(
                    "  discarded response for request #{} (superseded)",
                    ticket.id()
                )),
                Err(e) => self.add_output(format!("Error: {}", e)),
            },
            Completion::Icon(src, loaded) => self.apply_icon(src, loaded),
        }
    }

    fn apply_icon(&mut self, src: String, loaded: std::result::Result<(), vitrine_client::FetchError>) {
        let current = match self.page.document.image(PROFILE_ICON) {
            Ok(image) => image.src.clone(),
            Err(e) => {
                self.add_output(format!("Error: {}", e));
                return;
            }
        };
        if current != src {
            // Source changed since the probe started
            return;
        }

        if let Err(e) = loaded {
            self.add_output(format!("⚠ image failed to load: {}", e));
            match self.page.dispatch(&UiEvent::ImageError(PROFILE_ICON.to_string())) {
                Ok(Reaction::FallbackApplied(fallback)) => {
                    self.add_output("  switched profile icon to the fallback");
                    self.jobs.push(Job::Icon(fallback));
                }
                Ok(Reaction::FallbackFailed) => {
                    self.add_output("  fallback icon failed too, keeping current source")
                }
                Ok(_) => {}
                Err(e) => self.add_output(format!("Error: {}", e)),
            }
        }
    }

    fn start_refresh(&mut self) {
        match self.page.begin_fetch() {
            Ok(ticket) => {
                self.add_output(format!(
                    "  getting customer data from server (request #{})",
                    ticket.id()
                ));
                self.jobs.push(Job::Profile(ticket));
            }
            Err(e) => self.add_output(format!("Error: {}", e)),
        }
    }

    fn reload(&mut self) {
        match self.page.reopen(self.store.as_mut(), &self.config) {
            Ok((page, ticket)) => {
                self.page = page;
                self.add_output("  page reloaded");
                if let Err(e) = self.queue_page_jobs(ticket) {
                    self.add_output(format!("Error: {}", e));
                }
            }
            Err(e) => self.add_output(format!("Error: {}", e)),
        }
    }

    fn click(&mut self, id: &str) {
        match self.page.dispatch(&UiEvent::click(id)) {
            Ok(Reaction::RefreshProfile) => {
                self.add_output("  refreshing customer data...");
                self.start_refresh();
            }
            Ok(Reaction::Logged) => self.add_output("  profile clicked"),
            Ok(Reaction::Ignored) => self.add_output(format!("  no handler attached to '{}'", id)),
            Ok(other) => self.add_output(format!("  {:?}", other)),
            Err(e) => self.add_output(format!("Error: {}", e)),
        }
    }

    fn show_html(&mut self, id: Option<&str>) {
        let html = match id {
            None => self.page.to_html(),
            Some(id) => match self.page.document.get_element_by_id(id) {
                Ok(Element::Container(region)) => Ok(region.inner_html().to_string()),
                Ok(Element::Button(button)) => Ok(format!("<button id=\"{}\">{}</button>", id, button.label)),
                Ok(Element::Image(image)) => Ok(format!("<img id=\"{}\" src=\"{}\">", id, image.src)),
                Err(e) => Err(e),
            },
        };

        match html {
            Ok(html) => {
                for line in html.lines() {
                    self.add_output(line.to_string());
                }
            }
            Err(e) => self.add_output(format!("Error: {}", e)),
        }
    }

    fn region_lines(&mut self, id: &str) {
        let lines = self.page.region(id).and_then(|region| {
            if id == CARDS_CONTAINER {
                card_lines(region)
            } else {
                panel_lines(region)
            }
        });

        match lines {
            Ok(lines) => self.add_lines(lines),
            Err(e) => self.add_output(format!("Error: {}", e)),
        }
    }

    pub fn navigate_history_backward(&mut self) {
        if self.history.is_empty() {
            return;
        }

        // If starting history navigation, save current input
        if self.history_index.is_none() {
            self.temp_input = self.input.clone();
        }

        let new_index = match self.history_index {
            None => Some(self.history.len() - 1),
            Some(0) => Some(0), // Already at oldest
            Some(idx) => Some(idx - 1),
        };

        if let Some(idx) = new_index {
            self.history_index = new_index;
            self.input = self.history[idx].clone();
            self.cursor_position = self.input.len();
        }
    }

    pub fn navigate_history_forward(&mut self) {
        if self.history.is_empty() || self.history_index.is_none() {
            return;
        }

        let new_index = match self.history_index {
            Some(idx) if idx >= self.history.len() - 1 => {
                // Reached the end, restore temp input
                self.input = self.temp_input.clone();
                self.cursor_position = self.input.len();
                self.history_index = None;
                self.temp_input.clear();
                return;
            }
            Some(idx) => Some(idx + 1),
            None => None,
        };

        if let Some(idx) = new_index {
            self.history_index = new_index;
            self.input = self.history[idx].clone();
            self.cursor_position = self.input.len();
        }
    }

    pub fn load_history(&mut self) {
        if let Ok(content) = fs::read_to_string(&self.history_path) {
            let mut lines: Vec<String> = content.lines().map(|s| s.to_string()).collect();

            // Keep only the last 100 entries
            if lines.len() > 100 {
                lines.drain(0..lines.len() - 100);
            }

            self.history = lines;
        }
    }

    pub fn save_history(&self) -> Result<()> {
        fs::write(&self.history_path, self.history.join("\n"))?;
        Ok(())
    }

    fn save_history_with_report(&mut self) {
        match self.save_history() {
            Ok(()) => self.add_output(format!("History saved to {}", self.history_path.display())),
            Err(e) => self.add_output(format!("Error saving history: {}", e)),
        }
    }

    fn request_exit(&mut self, mode: ExitMode) {
        match mode {
            ExitMode::Normal => {
                // Ask user if they want to save
                if !self.history.is_empty() {
                    self.awaiting_save_confirmation = true;
                    self.add_output("");
                    self.add_output(format!(
                        "Save command history to {}? [y/N]:",
                        self.history_path.display()
                    ));
                } else {
                    self.should_quit = true;
                }
            }
            ExitMode::ForceQuit => {
                self.should_quit = true;
            }
            ExitMode::WriteQuit => {
                if !self.history.is_empty() {
                    self.save_history_with_report();
                }
                self.should_quit = true;
            }
        }
    }

    pub fn handle_save_confirmation(&mut self, response: &str) {
        self.awaiting_save_confirmation = false;

        let response = response.trim().to_lowercase();
        if response == "y" || response == "yes" {
            self.save_history_with_report();
        } else {
            self.add_output("History not saved.");
        }
        self.should_quit = true;
    }

    pub fn handle_input(&mut self, input: String) {
        if input.is_empty() {
            return;
        }

        // If awaiting save confirmation, handle it separately
        if self.awaiting_save_confirmation {
            self.handle_save_confirmation(&input);
            return;
        }

        // Add command to history and limit to 100 items
        self.history.push(input.clone());
        if self.history.len() > 100 {
            self.history.remove(0);
        }

        // Reset history navigation
        self.history_index = None;
        self.temp_input.clear();

        self.add_output(format!("> {}", input));

        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            return;
        }

        match normalize_command(parts[0]) {
            "exit" | "quit" => self.request_exit(ExitMode::Normal),
            ":q!" => self.request_exit(ExitMode::ForceQuit),
            ":wq!" | "ZZ" => self.request_exit(ExitMode::WriteQuit),
            "help" => {
                self.add_output("Available commands:");
                self.add_output("  cards                          - Show the product cards");
                self.add_output("  api                            - Show the customer panel");
                self.add_output("  html [id]                      - Print the page markup, or one element's");
                self.add_output("  click <id>                     - Click an element (debugBtn, profileIcon)");
                self.add_output("  refresh                        - Fetch the customer record again");
                self.add_output("  reload                         - Reload the page from the store");
                self.add_output("  lastVisit                      - Show when the page was last opened");
                self.add_output("  apiData                        - Show the last fetched customer record");
                self.add_output("  storeHelpers.viewStorage()     - Print the raw stored catalog");
                self.add_output("  storeHelpers.clearStorage()    - Erase every stored key");
                self.add_output("  storeHelpers.refreshCustomer() - Same as refresh");
                self.add_output("  clear                          - Clear the output");
                self.add_output("  help                           - Show this help message");
                self.add_output("  exit, quit                     - Exit the console");
            }
            "clear" => {
                self.output.clear();
            }
            "cards" => self.region_lines(CARDS_CONTAINER),
            "api" => self.region_lines(API_CONTENT),
            "html" => self.show_html(parts.get(1).copied()),
            "click" => match parts.get(1) {
                Some(id) => self.click(id),
                None => self.add_output("Error: click requires an element id"),
            },
            "refresh" | "refreshCustomer" => self.start_refresh(),
            "reload" => self.reload(),
            "lastVisit" => match last_visit(self.store.as_ref()) {
                Ok(Some(at)) => self.add_output(format!("  {}", at.to_rfc3339())),
                Ok(None) => self.add_output("  null"),
                Err(e) => self.add_output(format!("Error: {}", e)),
            },
            "apiData" => {
                let json = self
                    .page
                    .panel
                    .last_record()
                    .map(serde_json::to_string_pretty);
                match json {
                    Some(Ok(json)) => self.add_lines(json.lines().map(str::to_string).collect()),
                    Some(Err(e)) => self.add_output(format!("Error: {}", e)),
                    None => self.add_output("  undefined"),
                }
            }
            "viewStorage" => match view_storage(self.store.as_ref()) {
                Ok(raw) => self.add_output(format!(
                    "  LocalStorage: {}",
                    raw.as_deref().unwrap_or("null")
                )),
                Err(e) => self.add_output(format!("Error: {}", e)),
            },
            "clearStorage" => match clear_storage(self.store.as_mut()) {
                Ok(removed) => self.add_output(format!("  storage cleared ({} keys)", removed)),
                Err(e) => self.add_output(format!("Error: {}", e)),
            },
            _ => {
                self.add_output(format!("Unknown command: {}", parts[0]));
                self.add_output("Type 'help' for available commands");
            }
        }
    }

    fn status_label(&self) -> &'static str {
        match self.page.panel.state() {
            PanelState::Idle => "idle",
            PanelState::Loading => "loading",
            PanelState::Loaded => "loaded",
            PanelState::Failed(_) => "failed",
        }
    }
}

/// `storeHelpers.clearStorage()` and `clearStorage` name the same command.
fn normalize_command(raw: &str) -> &str {
    let name = raw.strip_prefix("storeHelpers.").unwrap_or(raw);
    name.strip_suffix("()").unwrap_or(name)
}

fn default_history_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(HISTORY_FILE)
}

/// Runs the console until the user quits. Fetches run as tasks on `handle`.
pub fn run(
    handle: Handle,
    store: Box<dyn Storage>,
    client: ProfileClient,
    config: PageConfig,
) -> Result<()> {
    // Open the page before touching the terminal so a load error prints normally
    let mut app = App::new(store, config)?;
    app.load_history();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &handle, &client);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    handle: &Handle,
    client: &ProfileClient,
) -> Result<()> {
    let (tx, mut rx) = completion_channel();

    loop {
        for job in app.take_jobs() {
            spawn_job(handle, client, job, tx.clone());
        }
        while let Ok(completion) = rx.try_recv() {
            app.apply(completion);
        }

        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            break;
        }

        // Wake up regularly so finished fetches get painted without a keypress
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            // Only process KeyPress events, ignore KeyRelease
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char(c) => {
                    app.input.insert(app.cursor_position, c);
                    app.cursor_position += c.len_utf8();
                    // Reset history navigation when typing
                    app.history_index = None;
                    app.temp_input.clear();
                }
                KeyCode::Backspace => {
                    if let Some((idx, _)) = app.input[..app.cursor_position].char_indices().next_back() {
                        app.input.remove(idx);
                        app.cursor_position = idx;
                        // Reset history navigation when editing
                        app.history_index = None;
                        app.temp_input.clear();
                    }
                }
                KeyCode::Enter => {
                    let input = app.input.drain(..).collect();
                    app.cursor_position = 0;
                    app.handle_input(input);
                }
                KeyCode::Up => app.navigate_history_backward(),
                KeyCode::Down => app.navigate_history_forward(),
                KeyCode::Left => {
                    if let Some((idx, _)) = app.input[..app.cursor_position].char_indices().next_back() {
                        app.cursor_position = idx;
                    }
                }
                KeyCode::Right => {
                    if let Some(c) = app.input[app.cursor_position..].chars().next() {
                        app.cursor_position += c.len_utf8();
                    }
                }
                KeyCode::Home => app.cursor_position = 0,
                KeyCode::End => app.cursor_position = app.input.len(),
                KeyCode::Esc => app.should_quit = true,
                KeyCode::PageUp => {
                    app.scroll_offset = app.scroll_offset.saturating_sub(10);
                }
                KeyCode::PageDown => {
                    app.scroll_offset =
                        (app.scroll_offset + 10).min(app.output.len().saturating_sub(1));
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Output area
            Constraint::Length(1), // Horizontal rule
            Constraint::Length(1), // Input area
            Constraint::Length(1), // Horizontal rule
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let output_height = chunks[0].height as usize;
    let total_lines = app.output.len();

    // Auto-scroll to bottom if not manually scrolled
    let scroll_offset = if app.scroll_offset == 0 && total_lines > output_height {
        total_lines.saturating_sub(output_height)
    } else {
        app.scroll_offset
            .min(total_lines.saturating_sub(output_height))
    };

    let visible_output: Vec<Line> = app
        .output
        .iter()
        .skip(scroll_offset)
        .take(output_height)
        .map(|line| Line::from(line.clone()))
        .collect();

    let output = Paragraph::new(visible_output).style(Style::default().fg(Color::White));
    f.render_widget(output, chunks[0]);

    let rule1 = Paragraph::new("─".repeat(chunks[1].width as usize))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(rule1, chunks[1]);

    let prompt = "vit> ";
    let input = Paragraph::new(format!("{}{}", prompt, app.input))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(input, chunks[2]);

    let cursor_column = app.input[..app.cursor_position].chars().count();
    f.set_cursor_position((
        chunks[2].x + prompt.len() as u16 + cursor_column as u16,
        chunks[2].y,
    ));

    let rule2 = Paragraph::new("─".repeat(chunks[3].width as usize))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(rule2, chunks[3]);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let status = Paragraph::new(Line::from(vec![
        Span::raw("customer: "),
        Span::styled(app.status_label(), bold),
        Span::raw(" | "),
        Span::styled("ESC", bold),
        Span::raw(" or "),
        Span::styled("exit", bold),
        Span::raw(" to quit | "),
        Span::styled("help", bold),
        Span::raw(" for commands | "),
        Span::styled("↑↓", bold),
        Span::raw(" history | "),
        Span::styled("PgUp/PgDn", bold),
        Span::raw(" scroll"),
    ]))
    .style(Style::default().fg(Color::DarkGray));

    f.render_widget(status, chunks[4]);
}
