//! Error types for query resolution and query-file loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning CLI input and a query file into search queries.
///
/// Every variant is a configuration error: it is reported before any
/// network activity starts.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Nothing left after splitting, trimming and merging.
    #[error("at least one non-empty query is required")]
    NoQueries,

    /// More distinct queries than a single run accepts.
    #[error("too many queries: max {max}")]
    TooManyQueries {
        /// The configured maximum.
        max: usize,
    },

    /// The query file could not be read.
    #[error("read --query-file \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The query file is not valid JSON.
    #[error("parse --query-file \"{}\": {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The query file is valid JSON but breaks the schema.
    #[error("invalid --query-file \"{}\": {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    /// A seen-dependent flag was set without `--seen`.
    #[error("{flag} requires --seen")]
    MissingSeen {
        /// The flag as typed on the command line.
        flag: &'static str,
    },

    /// Two mutually exclusive output modes ended up enabled.
    #[error("cannot combine --json and --plain")]
    OutputModeConflict,
}

impl QueryError {
    /// Creates an [`QueryError::Invalid`] for `path`.
    #[must_use]
    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
