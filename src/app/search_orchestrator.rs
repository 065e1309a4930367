//! Search run: query resolution, fan-out, seen tracking and output.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use jobcli_core::dispatch::run_queries_with_progress;
use jobcli_core::output::{color_enabled, format_search_summary};
use jobcli_core::{
    DispatchOutcome, Job, ProvidedOptions, ProxyRotator, QueryFile, RenderOptions, SearchOptions,
    apply_query_file, build_default_registry, config, merge_queries, resolve_format, seen,
    split_queries, write_jobs,
};
use tracing::{debug, info};

use crate::ProcessExit;
use crate::app::context::RunSettings;
use crate::app::progress_manager::{self, QueryProgress};
use crate::app::{config_runtime, exit_handler, terminal};
use crate::cli::SearchOptionArgs;

const ROTATOR_COOLDOWN: Duration = Duration::from_secs(10 * 60);

/// One `search` or per-site invocation.
pub(crate) struct SearchRequest<'a> {
    pub(crate) query: Option<&'a str>,
    pub(crate) sites: &'a str,
    pub(crate) options: &'a SearchOptionArgs,
    /// Whether a query file may replace `sites`. False for per-site commands.
    pub(crate) allow_sites_override: bool,
}

pub(crate) async fn run_search(
    request: SearchRequest<'_>,
    mut settings: RunSettings,
    provided: &ProvidedOptions,
) -> Result<ProcessExit> {
    let query_file = QueryFile::load_if_provided(request.options.query_file.as_deref())?;
    let mut options = config_runtime::search_options_from_args(request.sites, request.options);
    apply_query_file(
        &mut options,
        &mut settings.global,
        &query_file,
        provided,
        request.allow_sites_override,
    )?;

    // A query file may turn on verbose logging.
    terminal::init_tracing(
        terminal::resolve_default_log_level(settings.global.verbose, settings.quiet),
        settings.force_log_level,
        terminal::should_disable_log_color(&settings.global),
    );

    options.validate_seen_flags()?;
    check_distinct_paths(&options)?;
    let queries = merge_queries(
        &split_queries(request.query.unwrap_or_default()),
        &query_file.queries,
    )?;

    let base = options.base_params(
        &settings.config.default_location,
        &settings.config.default_country,
        settings.config.default_limit,
    );
    debug!(queries = queries.len(), sites = %options.sites, limit = base.limit, "Search resolved");

    let rotator = build_rotator(&options.proxies)?;
    let registry = build_default_registry(rotator);
    let sources = registry.select(&options.sites)?;
    info!(queries = queries.len(), sources = sources.len(), "Searching");

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        settings.quiet,
        terminal::is_dumb_terminal(),
    );
    let progress = Arc::new(QueryProgress::default());
    let (progress_handle, progress_stop) =
        progress_manager::spawn_progress_ui(use_spinner, Arc::clone(&progress), queries.len());

    let outcome = run_queries_with_progress(&sources, &base, &queries, |number, query| {
        progress.start_query(number, query);
    })
    .await;

    progress_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    if settings.global.verbose {
        report_failures(&outcome);
    }

    let unseen = match &options.seen {
        Some(seen_path) => {
            let history = seen::read_jobs_allow_missing(seen_path).context("read --seen")?;
            Some(seen::diff(&outcome.jobs, &history).0)
        }
        None => None,
    };

    let output_jobs: &[Job] = match &unseen {
        Some(unseen) if options.new_only => unseen,
        _ => &outcome.jobs,
    };

    if let (Some(new_out), Some(unseen)) = (&options.new_out, &unseen) {
        seen::write_jobs(new_out, unseen).context("write --new-out")?;
        debug!(path = %new_out.display(), jobs = unseen.len(), "Wrote unseen jobs");
    }

    write_output(&options, &settings, output_jobs)?;

    if options.seen_update
        && let (Some(seen_path), Some(unseen)) = (&options.seen, &unseen)
    {
        update_seen_history(seen_path, unseen)?;
    }

    if !settings.quiet {
        let summary_jobs = unseen.as_deref().unwrap_or(&outcome.jobs);
        eprintln!("{}", format_search_summary(summary_jobs));
    }

    let failed_sites: HashSet<&str> = outcome
        .reportable_failures()
        .map(|failure| failure.site.as_str())
        .collect();
    Ok(exit_handler::determine_exit_outcome(
        outcome.jobs.len(),
        failed_sites.len(),
        sources.len(),
    ))
}

fn build_rotator(proxies_flag: &str) -> Result<Option<Arc<ProxyRotator>>> {
    let proxies = config::load_proxies(proxies_flag)?;
    if proxies.is_empty() {
        if !proxies_flag.trim().is_empty() {
            bail!("--proxies does not contain any proxy URL");
        }
        return Ok(None);
    }
    let rotator = ProxyRotator::new(&proxies, ROTATOR_COOLDOWN)?;
    Ok(Some(Arc::new(rotator)))
}

fn report_failures(outcome: &DispatchOutcome) {
    if outcome.failures.is_empty() {
        return;
    }
    eprintln!("\nScraper errors:");
    for failure in &outcome.failures {
        eprintln!("  {}", failure.error);
    }
}

fn check_distinct_paths(options: &SearchOptions) -> Result<()> {
    let output = options.output.as_deref();
    let new_out = options.new_out.as_deref();
    let seen = options.seen.as_deref();

    if paths_equal(output, new_out) {
        bail!("--new-out path must differ from --output");
    }
    if paths_equal(output, seen) {
        bail!("--output path must differ from --seen");
    }
    if paths_equal(new_out, seen) {
        bail!("--new-out path must differ from --seen");
    }
    Ok(())
}

/// Compares two paths after making them absolute. Blank paths never match.
fn paths_equal(a: Option<&Path>, b: Option<&Path>) -> bool {
    let (Some(a), Some(b)) = (non_blank(a), non_blank(b)) else {
        return false;
    };
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn non_blank(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.to_string_lossy().trim().is_empty())
}

fn write_output(options: &SearchOptions, settings: &RunSettings, jobs: &[Job]) -> Result<()> {
    let output_path = non_blank(options.output.as_deref());
    let stdout_is_terminal = io::stdout().is_terminal();
    let global = settings.global;

    let format = resolve_format(
        global.json,
        global.plain,
        &options.format,
        output_path.is_some(),
        stdout_is_terminal,
    )?;
    let color = color_enabled(
        global.color,
        global.json || global.plain,
        terminal::no_color_env_requested(),
        stdout_is_terminal,
    );
    let render = RenderOptions {
        color,
        hyperlinks: color && output_path.is_none() && stdout_is_terminal,
        links: options.links,
    };
    debug!(format = %format, ?render, "Rendering results");

    match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_jobs(&mut writer, jobs, format, render)
                .with_context(|| format!("write {}", path.display()))?;
            writer
                .flush()
                .with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), jobs = jobs.len(), "Results written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            write_jobs(&mut stdout, jobs, format, render)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn update_seen_history(seen_path: &Path, unseen: &[Job]) -> Result<()> {
    let history = seen::read_jobs_allow_missing(seen_path).context("read --seen")?;
    let (merged, stats) = seen::merge(&history, unseen);
    seen::write_jobs(seen_path, &merged).context("write --seen")?;
    debug!(added = stats.added, total = stats.total_out, "Seen history updated");
    Ok(())
}
