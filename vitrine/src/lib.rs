pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    Settings, build_client, open_store, parse_paint_policy, render_offline, render_online,
    resolve_data_dir, write_html,
};
