//! jobcli core library
//!
//! Searches job listing sites concurrently, merges and deduplicates the
//! results, and tracks which postings have already been seen.
//!
//! # Architecture
//!
//! - [`models`] - `Job` and `SearchParams`
//! - [`network`] - proxy rotation and the per-source HTTP client
//! - [`source`] - the `Source` trait, site adapters and the registry
//! - [`query`] - query splitting, query files and option precedence
//! - [`dispatch`] - concurrent fan-out of a query to every selected source
//! - [`seen`] - identity keys, diff/merge against history, history files
//! - [`output`] - format selection and renderers
//! - [`config`] - `config.json` and `proxies.txt`

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dispatch;
pub mod models;
pub mod network;
pub mod output;
pub mod query;
pub mod seen;
pub mod source;
pub mod user_agent;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use dispatch::{DispatchOutcome, SourceFailure, dispatch, run_queries};
pub use models::{Job, JobType, SearchParams};
pub use network::{NetworkError, ProxyRotator, SourceClient};
pub use output::{ColorMode, Format, LinkStyle, RenderOptions, resolve_format, write_jobs};
pub use query::{
    GlobalOptions, MAX_QUERIES, ProvidedOptions, QueryError, QueryFile, SearchOptions,
    apply_query_file, merge_queries, split_queries,
};
pub use seen::{DiffStats, MergeStats, SeenIoError};
pub use source::{Source, SourceError, SourceRegistry, build_default_registry};
