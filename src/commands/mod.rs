//! CLI command handlers.

mod config;
mod proxies;
mod seen;
mod version;

pub use config::{run_config_init_command, run_config_path_command};
pub use proxies::run_proxies_check_command;
pub use seen::{run_seen_diff_command, run_seen_update_command};
pub use version::run_version_command;
