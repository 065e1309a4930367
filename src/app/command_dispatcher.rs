//! CLI command routing.
//!
//! Search commands (`search` and the per-site commands) initialize logging
//! themselves once a query file has been applied; every other command gets
//! logging set up here before its handler runs.

use std::io;

use anyhow::Result;
use jobcli_core::source::{
    SITE_GLASSDOOR, SITE_GOOGLE, SITE_INDEED, SITE_LINKEDIN, SITE_STEPSTONE, SITE_ZIPRECRUITER,
};

use crate::app::config_runtime::CliValueSources;
use crate::app::context::RunSettings;
use crate::app::search_orchestrator::{self, SearchRequest};
use crate::app::terminal;
use crate::cli::{Command, ConfigCommand, ProxiesCommand, SeenCommand};
use crate::{ProcessExit, commands};

pub(crate) async fn dispatch_command(
    command: &Command,
    settings: RunSettings,
    cli_sources: &CliValueSources,
) -> Result<ProcessExit> {
    let provided = &cli_sources.options;
    let site_request = match command {
        Command::Search(args) => {
            let request = SearchRequest {
                query: args.query.as_deref(),
                sites: &args.sites,
                options: &args.options,
                allow_sites_override: true,
            };
            return search_orchestrator::run_search(request, settings, provided).await;
        }
        Command::LinkedIn(args) => Some((SITE_LINKEDIN, args)),
        Command::Indeed(args) => Some((SITE_INDEED, args)),
        Command::Glassdoor(args) => Some((SITE_GLASSDOOR, args)),
        Command::ZipRecruiter(args) => Some((SITE_ZIPRECRUITER, args)),
        Command::Google(args) => Some((SITE_GOOGLE, args)),
        Command::Stepstone(args) => Some((SITE_STEPSTONE, args)),
        _ => None,
    };

    if let Some((site, args)) = site_request {
        let request = SearchRequest {
            query: args.query.as_deref(),
            sites: site,
            options: &args.options,
            allow_sites_override: false,
        };
        return search_orchestrator::run_search(request, settings, provided).await;
    }

    init_logging(&settings);
    let mut stdout = io::stdout().lock();

    match command {
        Command::Seen { command } => match command {
            SeenCommand::Diff(args) => commands::run_seen_diff_command(args, &mut stdout)?,
            SeenCommand::Update(args) => commands::run_seen_update_command(args, &mut stdout)?,
        },
        Command::Proxies { command } => match command {
            ProxiesCommand::Check(args) => {
                commands::run_proxies_check_command(args, settings.global, &mut stdout).await?;
            }
        },
        Command::Config { command } => match command {
            ConfigCommand::Init => commands::run_config_init_command(
                settings.config_dir.as_deref(),
                &settings.config,
                &mut stdout,
            )?,
            ConfigCommand::Path => {
                commands::run_config_path_command(settings.config_dir.as_deref(), &mut stdout)?;
            }
        },
        Command::Version => commands::run_version_command(&mut stdout)?,
        _ => {}
    }

    Ok(ProcessExit::Success)
}

fn init_logging(settings: &RunSettings) {
    terminal::init_tracing(
        terminal::resolve_default_log_level(settings.global.verbose, settings.quiet),
        settings.force_log_level,
        terminal::should_disable_log_color(&settings.global),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use jobcli_core::{Config, GlobalOptions};

    use super::dispatch_command;
    use crate::ProcessExit;
    use crate::app::config_runtime::CliValueSources;
    use crate::app::context::RunSettings;
    use crate::cli::Cli;

    fn settings() -> RunSettings {
        RunSettings {
            global: GlobalOptions::default(),
            quiet: true,
            force_log_level: true,
            config: Config::defaults_with(|_| None),
            config_dir: Some(PathBuf::from("/tmp/jobcli-test-config")),
        }
    }

    #[tokio::test]
    async fn test_dispatch_version_succeeds() {
        let cli = Cli::parse_from(["jobcli", "version"]);
        let exit = dispatch_command(&cli.command, settings(), &CliValueSources::default())
            .await
            .unwrap();
        assert_eq!(exit, ProcessExit::Success);
    }

    #[tokio::test]
    async fn test_dispatch_search_rejects_new_only_without_seen() {
        let cli = Cli::parse_from(["jobcli", "search", "rust", "--new-only"]);
        let err = dispatch_command(&cli.command, settings(), &CliValueSources::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "--new-only requires --seen");
    }

    #[tokio::test]
    async fn test_dispatch_search_requires_a_query() {
        let cli = Cli::parse_from(["jobcli", "google", " , "]);
        let err = dispatch_command(&cli.command, settings(), &CliValueSources::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "at least one non-empty query is required");
    }
}
