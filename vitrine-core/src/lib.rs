pub mod catalog;
pub mod document;
pub mod error;
pub mod page;
pub mod profile;
pub mod render;
pub mod store;
pub mod store_helpers;
pub mod wiring;

pub use error::{Result, VitrineError};
pub use vitrine_client::{FetchError, ProfileClient, ProfileRecord};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
        _ _        _
 __   _(_) |_ _ __(_)_ __   ___
 \ \ / / | __| '__| | '_ \ / _ \
  \ V /| | |_| |  | | | | |  __/
   \_/ |_|\__|_|  |_|_| |_|\___|
"#;
    println!("{}", banner.bright_blue().bold());
    println!(
        "  {} {}\n",
        "a tiny product showcase".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
