use colored::Colorize;
use tracing::Level;
use vitrine::commands::command_argument_builder;
use vitrine::handlers::{
    Settings, handle_cards, handle_debug_clear, handle_debug_refresh, handle_debug_view,
    handle_init, handle_profile, handle_render, handle_ui,
};
use vitrine_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let Some((name, sub_matches)) = chosen_command.subcommand() else {
        // No subcommand provided, just show the banner
        return;
    };

    // The console owns the terminal, so log lines would corrupt it
    if name != "ui" {
        init_logging(quiet);
    }

    let settings = match Settings::from_matches(&chosen_command) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    let result = match name {
        "init" => handle_init(sub_matches, &settings),
        "render" => handle_render(sub_matches, &settings).await,
        "cards" => handle_cards(&settings),
        "profile" => handle_profile(&settings).await,
        "debug" => match sub_matches.subcommand() {
            Some(("view", _)) => handle_debug_view(&settings),
            Some(("clear", _)) => handle_debug_clear(&settings),
            Some(("refresh", _)) => handle_debug_refresh(&settings).await,
            _ => unreachable!("clap should ensure we don't get here"),
        },
        "ui" => handle_ui(&settings),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn init_logging(quiet: bool) {
    let level = if quiet { Level::WARN } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    std::process::exit(1);
}
