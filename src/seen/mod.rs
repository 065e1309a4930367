//! Job identity keys and set operations against a persisted seen history.
//!
//! - [`key`] derives the identity of a job from its normalized title and company
//! - [`diff`] filters a fresh result list down to postings absent from history
//! - [`merge`] appends new postings to history without ever duplicating a key
//!
//! Both set operations are pure. Persistence lives in [`read_jobs`],
//! [`read_jobs_allow_missing`] and [`write_jobs`]; the caller decides when
//! to read and write.

mod io;

pub use io::{SeenIoError, read_jobs, read_jobs_allow_missing, write_jobs};

use std::collections::HashSet;

use tracing::debug;

use crate::models::Job;

const KEY_SEPARATOR: &str = "::";

/// Counters reported by [`diff`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub total_new: usize,
    pub total_seen: usize,
    /// New jobs without a valid key. They are emitted, never compared.
    pub invalid_new: usize,
    /// History entries without a valid key. They are ignored.
    pub invalid_seen: usize,
    /// Length of the returned unseen list.
    pub unseen: usize,
}

impl DiffStats {
    /// Total records on either side that were left out of key comparison.
    #[must_use]
    pub fn invalid_skipped(&self) -> usize {
        self.invalid_new + self.invalid_seen
    }
}

/// Counters reported by [`merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub total_seen: usize,
    pub total_input: usize,
    pub invalid_seen: usize,
    pub invalid_input: usize,
    pub added: usize,
    pub total_out: usize,
}

impl MergeStats {
    /// Total records on either side that had no valid key.
    #[must_use]
    pub fn invalid_skipped(&self) -> usize {
        self.invalid_seen + self.invalid_input
    }
}

/// Lowercases, trims and collapses internal whitespace runs to one space.
#[must_use]
pub fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the identity key of `job`, or `None` when title or company
/// normalizes to an empty string.
#[must_use]
pub fn key(job: &Job) -> Option<String> {
    let title = normalize(&job.title);
    let company = normalize(&job.company);
    if title.is_empty() || company.is_empty() {
        return None;
    }
    Some(format!("{title}{KEY_SEPARATOR}{company}"))
}

/// Returns the jobs of `new_jobs` whose key is absent from `seen_jobs`.
///
/// Later duplicates inside `new_jobs` are dropped. Jobs without a valid key
/// cannot be matched against anything, so they are always emitted. Output
/// order follows `new_jobs`.
#[must_use]
pub fn diff(new_jobs: &[Job], seen_jobs: &[Job]) -> (Vec<Job>, DiffStats) {
    let mut stats = DiffStats {
        total_new: new_jobs.len(),
        total_seen: seen_jobs.len(),
        ..DiffStats::default()
    };

    let mut seen_keys = HashSet::with_capacity(seen_jobs.len());
    for job in seen_jobs {
        match key(job) {
            Some(k) => {
                seen_keys.insert(k);
            }
            None => stats.invalid_seen += 1,
        }
    }

    let mut emitted = HashSet::with_capacity(new_jobs.len());
    let mut unseen = Vec::with_capacity(new_jobs.len());
    for job in new_jobs {
        let Some(k) = key(job) else {
            stats.invalid_new += 1;
            unseen.push(job.clone());
            continue;
        };
        if !emitted.insert(k.clone()) || seen_keys.contains(&k) {
            continue;
        }
        unseen.push(job.clone());
    }

    stats.unseen = unseen.len();
    debug!(
        total_new = stats.total_new,
        total_seen = stats.total_seen,
        unseen = stats.unseen,
        "Computed seen diff"
    );
    (unseen, stats)
}

/// Appends the valid-keyed jobs of `input_jobs` that `existing` does not
/// already contain.
///
/// Existing entries keep their order and win collisions; existing duplicates
/// collapse to their first occurrence. Existing entries without a key are
/// kept as-is, input jobs without a key are dropped.
#[must_use]
pub fn merge(existing: &[Job], input_jobs: &[Job]) -> (Vec<Job>, MergeStats) {
    let mut stats = MergeStats {
        total_seen: existing.len(),
        total_input: input_jobs.len(),
        ..MergeStats::default()
    };

    let mut keys = HashSet::with_capacity(existing.len() + input_jobs.len());
    let mut out = Vec::with_capacity(existing.len() + input_jobs.len());

    for job in existing {
        match key(job) {
            None => {
                stats.invalid_seen += 1;
                out.push(job.clone());
            }
            Some(k) => {
                if keys.insert(k) {
                    out.push(job.clone());
                }
            }
        }
    }

    for job in input_jobs {
        let Some(k) = key(job) else {
            stats.invalid_input += 1;
            continue;
        };
        if keys.insert(k) {
            out.push(job.clone());
            stats.added += 1;
        }
    }

    stats.total_out = out.len();
    (out, stats)
}
