//! Settings resolved once at startup and shared by every command.

use std::path::PathBuf;

use jobcli_core::{Config, GlobalOptions};

/// Global switches plus the loaded config, so command handlers do not
/// re-read the environment.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) global: GlobalOptions,
    pub(crate) quiet: bool,
    /// Whether `-v`/`-q` were given, so `RUST_LOG` should not win.
    pub(crate) force_log_level: bool,
    pub(crate) config: Config,
    pub(crate) config_dir: Option<PathBuf>,
}
