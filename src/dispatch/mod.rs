//! Concurrent fan-out of one query to every selected source.
//!
//! Each source runs on its own tokio task and sends its result back over a
//! channel. The dispatcher waits for every task before reading results, so a
//! slow or failing source never cancels its siblings.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::models::{Job, SearchParams};
use crate::seen;
use crate::source::{Source, SourceError};

/// A source that failed for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub site: String,
    pub error: String,
    /// The source is a stub; callers usually hide these outside verbose mode.
    pub not_implemented: bool,
}

impl SourceFailure {
    fn from_error(site: String, error: &SourceError) -> Self {
        Self {
            site,
            error: error.to_string(),
            not_implemented: error.is_not_implemented(),
        }
    }
}

/// Jobs and failures from one or more dispatch waves.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub jobs: Vec<Job>,
    pub failures: Vec<SourceFailure>,
}

impl DispatchOutcome {
    /// Failures worth showing by default.
    pub fn reportable_failures(&self) -> impl Iterator<Item = &SourceFailure> {
        self.failures.iter().filter(|f| !f.not_implemented)
    }
}

/// Runs `params` against every source concurrently and waits for all of them.
///
/// Jobs come back sorted by site name, case-insensitively; failures likewise.
#[instrument(skip(sources, params), fields(query = %params.query, sources = sources.len()))]
pub async fn dispatch(sources: &[Arc<dyn Source>], params: &SearchParams) -> DispatchOutcome {
    let (tx, mut rx) = mpsc::unbounded_channel::<(String, Result<Vec<Job>, SourceError>)>();
    let mut handles = Vec::with_capacity(sources.len());

    for source in sources {
        let source = Arc::clone(source);
        let params = params.clone();
        let tx = tx.clone();
        let site = source.name().to_string();
        handles.push((
            site,
            tokio::spawn(async move {
                let site = source.name().to_string();
                let result = source.search(&params).await;
                // The receiver outlives every task.
                let _ = tx.send((site, result));
            }),
        ));
    }
    drop(tx);

    let mut outcome = DispatchOutcome::default();
    for (site, handle) in handles {
        if let Err(e) = handle.await {
            warn!(site = %site, error = %e, "Source task aborted");
            outcome.failures.push(SourceFailure {
                error: format!("{site}: task failed: {e}"),
                site,
                not_implemented: false,
            });
        }
    }

    while let Some((site, result)) = rx.recv().await {
        match result {
            Ok(jobs) => {
                debug!(site = %site, jobs = jobs.len(), "Source finished");
                outcome.jobs.extend(jobs);
            }
            Err(e) if e.is_not_implemented() => {
                debug!(site = %site, "Source not implemented");
                outcome.failures.push(SourceFailure::from_error(site, &e));
            }
            Err(e) => {
                warn!(site = %site, error = %e, "Source failed");
                outcome.failures.push(SourceFailure::from_error(site, &e));
            }
        }
    }

    sort_jobs_by_site(&mut outcome.jobs);
    sort_failures(&mut outcome.failures);
    outcome
}

/// Runs each query in turn, limiting every wave to `base.limit` before
/// merging it into the running result.
///
/// The merged list can therefore hold more than `base.limit` jobs.
pub async fn run_queries(
    sources: &[Arc<dyn Source>],
    base: &SearchParams,
    queries: &[String],
) -> DispatchOutcome {
    run_queries_with_progress(sources, base, queries, |_, _| {}).await
}

/// [`run_queries`], calling `progress` with the 1-based index and text of
/// each query before it is dispatched.
pub async fn run_queries_with_progress(
    sources: &[Arc<dyn Source>],
    base: &SearchParams,
    queries: &[String],
    mut progress: impl FnMut(usize, &str),
) -> DispatchOutcome {
    let mut total = DispatchOutcome::default();

    for (idx, query) in queries.iter().enumerate() {
        progress(idx + 1, query);
        let params = base.for_query(query);
        let wave = dispatch(sources, &params).await;
        let jobs = limit_jobs(wave.jobs, base.limit);
        debug!(query = %query, jobs = jobs.len(), failures = wave.failures.len(), "Query finished");
        total.jobs = merge_unique_jobs(total.jobs, jobs);
        total.failures.extend(wave.failures);
    }

    sort_jobs_by_site(&mut total.jobs);
    sort_failures(&mut total.failures);
    info!(
        queries = queries.len(),
        jobs = total.jobs.len(),
        failures = total.failures.len(),
        "Search finished"
    );
    total
}

/// Truncates `jobs` to `limit`; zero means unlimited.
#[must_use]
pub fn limit_jobs(mut jobs: Vec<Job>, limit: usize) -> Vec<Job> {
    if limit > 0 {
        jobs.truncate(limit);
    }
    jobs
}

/// Appends `incoming` to `existing`, dropping jobs whose key is already
/// present. Jobs without a valid key are always kept.
#[must_use]
pub fn merge_unique_jobs(mut existing: Vec<Job>, incoming: Vec<Job>) -> Vec<Job> {
    let mut keys: HashSet<String> = existing.iter().filter_map(seen::key).collect();
    existing.reserve(incoming.len());
    for job in incoming {
        match seen::key(&job) {
            None => existing.push(job),
            Some(key) => {
                if keys.insert(key) {
                    existing.push(job);
                }
            }
        }
    }
    existing
}

/// Stable sort by site name, ignoring case.
pub fn sort_jobs_by_site(jobs: &mut [Job]) {
    jobs.sort_by_cached_key(|job| job.site.to_lowercase());
}

pub fn sort_failures(failures: &mut [SourceFailure]) {
    failures.sort_by_cached_key(|failure| failure.site.to_lowercase());
}
