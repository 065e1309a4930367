//! Error type for the source adapter contract.

use thiserror::Error;

use crate::network::NetworkError;

/// Failure of a single source search.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source is registered but has no working implementation.
    #[error("{site}: scraper not implemented")]
    NotImplemented {
        /// Canonical site name.
        site: String,
    },

    /// Transport-level failure, including proxy exhaustion.
    #[error("{site}: {source}")]
    Network {
        /// Canonical site name.
        site: String,
        /// The underlying network error.
        #[source]
        source: NetworkError,
    },

    /// The site answered with status 400 or above.
    #[error("{site}: http {status}")]
    HttpStatus {
        /// Canonical site name.
        site: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The page could not be understood.
    #[error("{site}: parse error: {reason}")]
    Parse {
        /// Canonical site name.
        site: String,
        /// What went wrong.
        reason: String,
    },
}

impl SourceError {
    /// Creates a not-implemented error.
    pub fn not_implemented(site: impl Into<String>) -> Self {
        Self::NotImplemented { site: site.into() }
    }

    /// Wraps a network error.
    pub fn network(site: impl Into<String>, source: NetworkError) -> Self {
        Self::Network {
            site: site.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(site: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            site: site.into(),
            status,
        }
    }

    /// Creates a parse error.
    pub fn parse(site: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            site: site.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for [`SourceError::NotImplemented`].
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }

    /// Site the error is attributed to.
    #[must_use]
    pub fn site(&self) -> &str {
        match self {
            Self::NotImplemented { site }
            | Self::Network { site, .. }
            | Self::HttpStatus { site, .. }
            | Self::Parse { site, .. } => site,
        }
    }
}
