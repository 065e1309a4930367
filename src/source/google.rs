//! Google Jobs placeholder.
//!
//! Google renders job results client-side, so a plain fetch sees no
//! postings. The source stays registered so `--sites google` is accepted,
//! and every search reports [`SourceError::NotImplemented`].

use async_trait::async_trait;

use super::{SITE_GOOGLE, Source, SourceError};
use crate::models::{Job, SearchParams};

#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleJobsSource;

impl GoogleJobsSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Source for GoogleJobsSource {
    fn name(&self) -> &str {
        SITE_GOOGLE
    }

    async fn search(&self, _params: &SearchParams) -> Result<Vec<Job>, SourceError> {
        Err(SourceError::not_implemented(SITE_GOOGLE))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_google_reports_not_implemented() {
        let source = GoogleJobsSource::new();
        let err = source.search(&SearchParams::default()).await.unwrap_err();
        assert!(err.is_not_implemented());
        assert_eq!(source.name(), "google");
    }
}
