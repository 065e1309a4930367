//! Normalized job posting returned by every source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized posting.
///
/// Jobs are plain values. Deduplication never compares whole jobs; it goes
/// through [`crate::seen::key`], which only looks at title and company.
///
/// The JSON shape is the persisted seen-history format, so field names are
/// stable and empty optional fields are omitted on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    /// Optional site-specific identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Canonical name of the source that produced this posting.
    pub site: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    #[serde(skip_serializing_if = "is_false")]
    pub remote: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub job_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub salary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snippet: String,
    /// Parsed posting timestamp, when the raw value could be understood.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    /// Posting timestamp exactly as the site published it.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub posted_at_raw: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl Job {
    /// Creates a job with only the fields the seen engine cares about.
    #[must_use]
    pub fn new(
        site: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            title: title.into(),
            company: company.into(),
            ..Self::default()
        }
    }

    /// Sets the listing URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the location text.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}
