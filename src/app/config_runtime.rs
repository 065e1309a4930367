use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use jobcli_core::config::is_truthy;
use jobcli_core::{ColorMode, GlobalOptions, ProvidedOptions, SearchOptions};

use crate::cli::{Cli, GlobalArgs, SearchOptionArgs};

const JSON_ENV: &str = "JOBCLI_JSON";
const VERBOSE_ENV: &str = "JOBCLI_VERBOSE";
const COLOR_ENV: &str = "JOBCLI_COLOR";

/// Which CLI values came from the command line rather than defaults.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) options: ProvidedOptions,
    pub(crate) quiet: bool,
}

impl CliValueSources {
    /// Whether a verbosity flag was given, so `RUST_LOG` should not win.
    pub(crate) fn forces_log_level(&self) -> bool {
        self.options.verbose || self.quiet
    }
}

pub(crate) fn parse_cli_with_sources() -> (Cli, CliValueSources) {
    let command = Cli::command();
    let matches = command.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = collect_sources(&matches);
    (cli, sources)
}

pub(crate) fn collect_sources(matches: &ArgMatches) -> CliValueSources {
    let global = |id: &str| {
        is_commandline_value(matches, id)
            || matches
                .subcommand()
                .is_some_and(|(_, sub)| is_commandline_value(sub, id))
    };

    let mut options = ProvidedOptions {
        json: global("json"),
        plain: global("plain"),
        verbose: global("verbose"),
        color: global("color"),
        ..ProvidedOptions::default()
    };

    if let Some((name, sub)) = matches.subcommand()
        && is_search_command(name)
    {
        let provided = |id: &str| is_commandline_value(sub, id);
        options.sites = name == "search" && provided("sites");
        options.location = provided("location");
        options.country = provided("country");
        options.limit = provided("limit");
        options.offset = provided("offset");
        options.remote = provided("remote");
        options.job_type = provided("job_type");
        options.hours = provided("hours");
        options.format = provided("format");
        options.links = provided("links");
        options.output = provided("output");
        options.proxies = provided("proxies");
        options.seen = provided("seen");
        options.new_only = provided("new_only");
        options.new_out = provided("new_out");
        options.seen_update = provided("seen_update");
    }

    CliValueSources {
        options,
        quiet: global("quiet"),
    }
}

fn is_search_command(name: &str) -> bool {
    matches!(
        name,
        "search" | "linkedin" | "indeed" | "glassdoor" | "ziprecruiter" | "google" | "stepstone"
    )
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Global options from CLI flags, with `JOBCLI_JSON`, `JOBCLI_VERBOSE` and
/// `JOBCLI_COLOR` filling in whatever was not given on the command line.
pub(crate) fn resolve_global_options(
    args: &GlobalArgs,
    sources: &CliValueSources,
    lookup: impl Fn(&str) -> Option<String>,
) -> GlobalOptions {
    let mut global = GlobalOptions {
        json: args.json,
        plain: args.plain,
        verbose: args.verbose,
        color: args.color,
    };
    let provided = &sources.options;

    if !provided.json
        && let Some(value) = lookup(JSON_ENV)
    {
        global.json = is_truthy(&value);
    }
    if !provided.verbose
        && let Some(value) = lookup(VERBOSE_ENV)
    {
        global.verbose = is_truthy(&value);
    }
    if !provided.color
        && let Some(value) = lookup(COLOR_ENV)
    {
        global.color = normalize_color_mode(&value);
    }
    global
}

/// Search options as given on the command line, before any query file.
pub(crate) fn search_options_from_args(sites: &str, args: &SearchOptionArgs) -> SearchOptions {
    SearchOptions {
        sites: sites.to_string(),
        location: args.location.clone().unwrap_or_default(),
        country: args.country.clone().unwrap_or_default(),
        limit: args.limit.unwrap_or(0),
        offset: args.offset,
        remote: args.remote,
        job_type: args.job_type,
        hours: args.hours,
        format: args.format.clone().unwrap_or_default(),
        links: args.links,
        output: non_blank_path(args.output.as_ref()),
        proxies: args.proxies.clone().unwrap_or_default(),
        seen: non_blank_path(args.seen.as_ref()),
        new_only: args.new_only,
        new_out: non_blank_path(args.new_out.as_ref()),
        seen_update: args.seen_update,
    }
}

fn non_blank_path(path: Option<&PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.to_string_lossy().trim().is_empty())
        .cloned()
}

/// Unknown values fall back to `auto`.
pub(crate) fn normalize_color_mode(value: &str) -> ColorMode {
    value.trim().to_lowercase().parse().unwrap_or_default()
}
