use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use vitrine_client::{DEFAULT_ENDPOINT, ProfileClient};
use vitrine_core::catalog::{initialize_storage, last_visit};
use vitrine_core::document::{API_CONTENT, CARDS_CONTAINER, Region};
use vitrine_core::page::{Page, PageConfig, load_page};
use vitrine_core::profile::{PaintOutcome, PaintPolicy, ProfilePanel};
use vitrine_core::render::{card_lines, panel_lines};
use vitrine_core::store::{Database, Storage};
use vitrine_core::store_helpers::{clear_storage, refresh_customer, view_storage};

pub const DEFAULT_DATA_DIR: &str = "~/.config/vitrine/";
pub const DB_FILE_NAME: &str = "vitrine.db";

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub endpoint: Url,
    pub timeout: Option<Duration>,
    pub paint_policy: PaintPolicy,
}

impl Settings {
    pub fn from_matches(args: &ArgMatches) -> Result<Self, String> {
        let data_dir = args
            .get_one::<String>("data-dir")
            .map(String::as_str)
            .unwrap_or(DEFAULT_DATA_DIR);

        let endpoint = match args.get_one::<Url>("endpoint") {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_ENDPOINT).map_err(|e| e.to_string())?,
        };

        let paint_policy = parse_paint_policy(
            args.get_one::<String>("paint-policy")
                .map(String::as_str)
                .unwrap_or("latest"),
        )?;

        Ok(Self {
            data_dir: resolve_data_dir(data_dir),
            endpoint,
            timeout: args.get_one::<u64>("timeout").map(|s| Duration::from_secs(*s)),
            paint_policy,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn page_config(&self) -> PageConfig {
        PageConfig {
            paint_policy: self.paint_policy,
            ..PageConfig::default()
        }
    }
}

/// Expands a leading `~` in a user-supplied directory
pub fn resolve_data_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn parse_paint_policy(raw: &str) -> Result<PaintPolicy, String> {
    PaintPolicy::from_str(raw).ok_or_else(|| {
        format!(
            "Unknown paint policy '{}' (expected 'latest' or 'last-resolved')",
            raw
        )
    })
}

/// Opens the database inside `data_dir`, creating the directory if needed
pub fn open_store(data_dir: &Path) -> Result<Database, String> {
    fs::create_dir_all(data_dir)
        .map_err(|e| format!("Failed to create {}: {}", data_dir.display(), e))?;

    let db_path = data_dir.join(DB_FILE_NAME);
    Database::new(&db_path).map_err(|e| format!("Failed to open {}: {}", db_path.display(), e))
}

pub fn build_client(settings: &Settings) -> Result<ProfileClient, String> {
    let client = ProfileClient::with_timeout(settings.timeout).map_err(|e| e.to_string())?;
    Ok(client.with_endpoint(settings.endpoint.clone()))
}

/// Runs the load sequence without touching the network
pub fn render_offline(store: &mut dyn Storage, config: &PageConfig) -> Result<String, String> {
    let (page, _ticket) = Page::open(store, config).map_err(|e| e.to_string())?;
    page.to_html().map_err(|e| e.to_string())
}

pub async fn render_online(
    store: &mut dyn Storage,
    client: &ProfileClient,
    config: &PageConfig,
) -> Result<String, String> {
    let (page, _outcome) = load_page(store, client, config)
        .await
        .map_err(|e| e.to_string())?;
    page.to_html().map_err(|e| e.to_string())
}

pub fn write_html(html: &str, output: Option<&PathBuf>) -> Result<(), String> {
    match output {
        Some(path) => {
            fs::write(path, html)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!(
                "{} Page written to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", html),
    }
    Ok(())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

fn print_last_visit(store: &dyn Storage) -> Result<(), String> {
    match last_visit(store).map_err(|e| e.to_string())? {
        Some(at) => println!(
            "{} Last visit: {}",
            "ℹ".blue(),
            at.to_rfc3339().bright_white()
        ),
        None => println!("{} Last visit: {}", "ℹ".blue(), "never".dimmed()),
    }
    Ok(())
}

fn print_panel(region: &Region, outcome: &PaintOutcome) -> Result<(), String> {
    for line in panel_lines(region).map_err(|e| e.to_string())? {
        match outcome {
            PaintOutcome::Failure(_) => println!("  {}", line.red()),
            _ => println!("  {}", line.bright_white()),
        }
    }
    Ok(())
}

pub fn handle_init(args: &ArgMatches, settings: &Settings) -> Result<(), String> {
    print_divider();
    println!("{}", "  VITRINE INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let force = args.get_flag("force");
    let db_path = settings.db_path();

    println!(
        "{} Target: {}",
        "→".blue(),
        db_path.display().to_string().bright_white()
    );
    println!();

    if force && Database::exists(&db_path) {
        println!(
            "{} Deleting existing database (force mode)",
            "→".yellow().bold()
        );
        Database::drop(&db_path)
            .map_err(|e| format!("Failed to delete {}: {}", db_path.display(), e))?;
        println!("{} Existing database removed", "✓".green().bold());
        println!();
    }

    let mut db = open_store(&settings.data_dir)?;
    let outcome = initialize_storage(&mut db).map_err(|e| e.to_string())?;

    if outcome.seeded {
        println!("{} Product catalog seeded", "✓".green().bold());
    } else {
        println!(
            "{} Product catalog already present, left untouched",
            "→".blue()
        );
    }
    print_last_visit(&db)?;

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    Ok(())
}

pub async fn handle_render(args: &ArgMatches, settings: &Settings) -> Result<(), String> {
    let offline = args.get_flag("offline");
    let output = args.get_one::<PathBuf>("output");
    let config = settings.page_config();
    let mut db = open_store(&settings.data_dir)?;

    let html = if offline {
        render_offline(&mut db, &config)?
    } else {
        let client = build_client(settings)?;
        let spinner = spinner("getting customer info...");
        let html = render_online(&mut db, &client, &config).await;
        spinner.finish_and_clear();
        html?
    };

    write_html(&html, output)
}

pub fn handle_cards(settings: &Settings) -> Result<(), String> {
    let mut db = open_store(&settings.data_dir)?;
    let (page, _ticket) = Page::open(&mut db, &settings.page_config()).map_err(|e| e.to_string())?;
    let region = page.region(CARDS_CONTAINER).map_err(|e| e.to_string())?;

    println!("{}", "PRODUCTS".bright_blue().bold());
    for line in card_lines(region).map_err(|e| e.to_string())? {
        println!("  {} {}", "•".cyan(), line);
    }
    Ok(())
}

pub async fn handle_profile(settings: &Settings) -> Result<(), String> {
    let client = build_client(settings)?;
    let mut panel = ProfilePanel::new(settings.paint_policy);
    let mut region = Region::new(API_CONTENT);

    let spinner = spinner("getting customer info...");
    let ticket = panel.begin(&mut region);
    let fetched = client.fetch_profile().await;
    spinner.finish_and_clear();

    let outcome = panel
        .complete(&mut region, ticket, fetched)
        .map_err(|e| e.to_string())?;

    println!("{}", "CUSTOMER".bright_blue().bold());
    print_panel(&region, &outcome)?;

    match outcome {
        PaintOutcome::Failure(message) => Err(format!("Profile fetch failed: {}", message)),
        _ => Ok(()),
    }
}

pub fn handle_debug_view(settings: &Settings) -> Result<(), String> {
    let db = open_store(&settings.data_dir)?;
    let raw = view_storage(&db).map_err(|e| e.to_string())?;

    println!("{}", "LocalStorage:".bright_blue().bold());
    println!("{}", raw.as_deref().unwrap_or("null"));
    print_last_visit(&db)
}

pub fn handle_debug_clear(settings: &Settings) -> Result<(), String> {
    let mut db = open_store(&settings.data_dir)?;
    let removed = clear_storage(&mut db).map_err(|e| e.to_string())?;

    println!(
        "{} storage cleared ({} keys removed)",
        "✓".green().bold(),
        removed.to_string().cyan()
    );
    Ok(())
}

pub async fn handle_debug_refresh(settings: &Settings) -> Result<(), String> {
    let client = build_client(settings)?;
    let mut panel = ProfilePanel::new(settings.paint_policy);
    let mut region = Region::new(API_CONTENT);

    let spinner = spinner("refreshing customer data...");
    let outcome = refresh_customer(&client, &mut panel, &mut region).await;
    spinner.finish_and_clear();

    let outcome = outcome.map_err(|e| e.to_string())?;
    match outcome {
        PaintOutcome::Failure(_) => println!("{}", region.inner_html().red()),
        _ => println!("{}", region.inner_html()),
    }
    Ok(())
}

pub fn handle_ui(settings: &Settings) -> Result<(), String> {
    let store = open_store(&settings.data_dir)?;
    let client = build_client(settings)?;
    let config = settings.page_config();
    let handle = tokio::runtime::Handle::current();

    // The console loop blocks on terminal input; keep it off the async workers
    tokio::task::block_in_place(|| vitrine_tui::run(handle, Box::new(store), client, config))
        .map_err(|e| format!("Error running TUI: {}", e))
}
