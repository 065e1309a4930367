use anyhow::Result;
use jobcli_core::Config;
use jobcli_core::config::config_dir;
use tracing::debug;

use crate::ProcessExit;
use crate::app::context::RunSettings;
use crate::app::{command_dispatcher, config_runtime};

pub(crate) async fn run_jobcli() -> Result<ProcessExit> {
    let (cli, cli_sources) = config_runtime::parse_cli_with_sources();

    let global =
        config_runtime::resolve_global_options(&cli.global, &cli_sources, |key| {
            std::env::var(key).ok()
        });

    let config_dir = config_dir();
    let config = match config_dir.as_deref() {
        Some(dir) => Config::load_from(dir, Config::from_env())?,
        None => Config::from_env(),
    };

    let settings = RunSettings {
        global,
        quiet: cli.global.quiet,
        force_log_level: cli_sources.forces_log_level(),
        config,
        config_dir,
    };

    let exit = command_dispatcher::dispatch_command(&cli.command, settings, &cli_sources).await?;
    debug!(?exit, "Command finished");
    Ok(exit)
}
