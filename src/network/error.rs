//! Error types for proxy rotation and outbound HTTP.

use thiserror::Error;

/// Errors raised by [`super::ProxyRotator`] and [`super::SourceClient`].
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Every proxy in the pool is cooling down, or the pool is empty.
    #[error("no proxies available")]
    NoProxies,

    /// A configured proxy string could not be parsed as a URL.
    #[error("invalid proxy '{proxy}': {reason}")]
    InvalidProxy {
        /// The raw proxy string.
        proxy: String,
        /// Parse failure description.
        reason: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Builder failure description.
        reason: String,
    },

    /// Request timed out at the client level.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Connection, TLS, or body read failure.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },
}

impl NetworkError {
    /// Creates an invalid proxy error.
    pub fn invalid_proxy(proxy: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidProxy {
            proxy: proxy.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl std::fmt::Display) -> Self {
        Self::ClientBuild {
            reason: reason.to_string(),
        }
    }

    /// Classifies a reqwest error into a timeout or a generic request failure.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Request { url, source }
        }
    }
}
