//! Outbound networking: proxy rotation and the shared source HTTP client.

mod client;
mod error;
mod rotator;

pub use client::{DEFAULT_TIMEOUT, FetchRequest, FetchResponse, SourceClient};
pub use error::NetworkError;
pub use rotator::{ProxyRotator, parse_proxy, redact};
