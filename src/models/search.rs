//! Search inputs handed to each source.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Employment type filter accepted by the sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Fulltime,
    Parttime,
    Contract,
    Internship,
}

impl JobType {
    /// All accepted values, in display order.
    pub const ALL: [JobType; 4] = [
        JobType::Fulltime,
        JobType::Parttime,
        JobType::Contract,
        JobType::Internship,
    ];

    /// Returns the stable lowercase label used on the wire and in config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fulltime => "fulltime",
            Self::Parttime => "parttime",
            Self::Contract => "contract",
            Self::Internship => "internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|job_type| job_type.as_str() == normalized)
            .ok_or_else(|| format!("unknown job type '{value}'"))
    }
}

/// Normalized search inputs for one query.
///
/// The dispatcher clones one base value per query and fills in `query`;
/// sources only ever receive a shared reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub location: String,
    /// Country code or name, used by sources with regional domains.
    pub country: String,
    /// Maximum results per source per query; `0` means no cap.
    pub limit: usize,
    /// Pagination offset.
    pub offset: usize,
    /// Only return remote roles.
    pub remote: bool,
    pub job_type: Option<JobType>,
    /// Freshness window in hours; `0` disables the filter.
    pub hours: u32,
}

impl SearchParams {
    /// Returns a copy of these parameters bound to `query`.
    #[must_use]
    pub fn for_query(&self, query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..self.clone()
        }
    }

    /// Freshness window rounded up to whole days, or `None` when unset.
    #[must_use]
    pub fn max_age_days(&self) -> Option<u32> {
        if self.hours == 0 {
            None
        } else {
            Some(self.hours.div_ceil(24).max(1))
        }
    }
}
