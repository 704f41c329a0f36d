use clap::{arg, command};
use url::Url;
use vitrine_client::DEFAULT_ENDPOINT;

use crate::handlers::DEFAULT_DATA_DIR;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("vitrine")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("vitrine")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"data-dir" <PATH>)
                .required(false)
                .global(true)
                .help("Directory holding the vitrine database")
                .default_value(DEFAULT_DATA_DIR),
        )
        .arg(
            arg!(--"endpoint" <URL>)
                .required(false)
                .global(true)
                .help("Profile endpoint to fetch the customer record from")
                .value_parser(clap::value_parser!(Url))
                .default_value(DEFAULT_ENDPOINT),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .global(true)
                .help("Request timeout in seconds (default: wait as long as the network allows)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            arg!(--"paint-policy" <POLICY>)
                .required(false)
                .global(true)
                .help("Which profile response wins when fetches overlap")
                .value_parser(["latest", "last-resolved"])
                .default_value("latest"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Seeds the product catalog and stamps the visit time")
                .arg(
                    arg!(-f --"force")
                        .help("Deletes any existing database before seeding")
                        .required(false),
                ),
        )
        .subcommand(
            command!("render")
                .about("Loads the page and writes it out as standalone HTML")
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the page to a file (default: print to stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"offline")
                        .required(false)
                        .help("Skip the network: the profile panel keeps its loading placeholder")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(command!("cards").about("Lists the product cards as the page shows them"))
        .subcommand(command!("profile").about("Fetches the customer profile and prints the panel"))
        .subcommand(
            command!("debug")
                .about("Manual debugging helpers for the store and the profile panel")
                .subcommand_required(true)
                .subcommand(command!("view").about("Prints the raw stored catalog"))
                .subcommand(command!("clear").about("Erases every key in the store"))
                .subcommand(command!("refresh").about("Re-runs the profile fetch and prints the panel markup")),
        )
        .subcommand(command!("ui").about("Opens the page in an interactive console"))
}
