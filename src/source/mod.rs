//! Listing-site adapters behind a uniform search contract.
//!
//! # Architecture
//!
//! - [`Source`] - Async trait every listing site implements
//! - [`SourceRegistry`] - Canonical-name lookup and `--sites` selection
//! - [`SourceError`] - Adapter failures, with [`SourceError::NotImplemented`]
//!   kept apart from fetch and parse failures
//!
//! Each adapter owns its own [`crate::network::SourceClient`]; all clients
//! of one registry share a single [`crate::network::ProxyRotator`].

mod common;
mod error;
mod glassdoor;
mod google;
mod indeed;
mod jsonld;
mod linkedin;
mod registry;
mod stepstone;
mod ziprecruiter;

pub use error::SourceError;
pub use glassdoor::GlassdoorSource;
pub use google::GoogleJobsSource;
pub use indeed::IndeedSource;
pub use linkedin::LinkedInSource;
pub use registry::{SourceRegistry, UnknownSiteError, build_default_registry, normalize_sites};
pub use stepstone::StepstoneSource;
pub use ziprecruiter::ZipRecruiterSource;

use async_trait::async_trait;

use crate::models::{Job, SearchParams};

pub const SITE_LINKEDIN: &str = "linkedin";
pub const SITE_INDEED: &str = "indeed";
pub const SITE_GLASSDOOR: &str = "glassdoor";
pub const SITE_ZIPRECRUITER: &str = "ziprecruiter";
pub const SITE_GOOGLE: &str = "google";
pub const SITE_STEPSTONE: &str = "stepstone";

/// Every canonical site name, in registration order.
pub const ALL_SITES: [&str; 6] = [
    SITE_LINKEDIN,
    SITE_INDEED,
    SITE_GLASSDOOR,
    SITE_ZIPRECRUITER,
    SITE_GOOGLE,
    SITE_STEPSTONE,
];

/// Contract every listing source implements.
///
/// Uses `async_trait` so the registry and dispatcher can hold
/// `Arc<dyn Source>`; native async trait methods are not object-safe.
///
/// Dropping the returned future cancels the search.
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable canonical name used for selection, sorting and failure attribution.
    fn name(&self) -> &str;

    /// Runs one search.
    ///
    /// Stubbed sources return [`SourceError::NotImplemented`].
    async fn search(&self, params: &SearchParams) -> Result<Vec<Job>, SourceError>;
}
