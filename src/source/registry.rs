//! Canonical-name registry of sources and `--sites` selection.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::{
    GlassdoorSource, GoogleJobsSource, IndeedSource, LinkedInSource, SITE_STEPSTONE,
    SITE_ZIPRECRUITER, Source, StepstoneSource, ZipRecruiterSource,
};
use crate::network::{ProxyRotator, SourceClient};

/// A requested site matched no registered source.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown site: {site}")]
pub struct UnknownSiteError {
    /// The normalized site name.
    pub site: String,
}

/// Sources keyed by canonical name.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    sources: BTreeMap<String, Arc<dyn Source>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.names())
            .finish()
    }
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `source` under its own name, replacing any earlier entry.
    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.insert(source.name().to_string(), source);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Source>> {
        self.sources.get(name).cloned()
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Resolves a comma-separated `--sites` value.
    ///
    /// Empty input or `all` selects every source. Names are normalized and
    /// aliases expanded; repeats are selected once.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSiteError`] for the first name with no source.
    pub fn select(&self, sites: &str) -> Result<Vec<Arc<dyn Source>>, UnknownSiteError> {
        let requested = normalize_sites(sites.split(','));
        if requested.is_empty() || requested == ["all"] {
            return Ok(self.sources.values().cloned().collect());
        }

        let mut selected: Vec<Arc<dyn Source>> = Vec::with_capacity(requested.len());
        for site in requested {
            let canonical = expand_alias(&site);
            let source = self.get(canonical).ok_or_else(|| UnknownSiteError {
                site: canonical.to_string(),
            })?;
            if !selected.iter().any(|s| s.name() == source.name()) {
                selected.push(source);
            }
        }
        debug!(
            sites = ?selected.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            "Selected sources"
        );
        Ok(selected)
    }
}

/// Lowercases, trims and strips a leading `www.`; blank entries are dropped.
pub fn normalize_sites<'a>(sites: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    sites
        .into_iter()
        .map(|site| site.trim().to_lowercase())
        .filter(|site| !site.is_empty())
        .map(|site| site.strip_prefix("www.").map(str::to_string).unwrap_or(site))
        .collect()
}

fn expand_alias(site: &str) -> &str {
    match site {
        "zip" | "zip-recruiter" => SITE_ZIPRECRUITER,
        "stepstone.de" | "stepstone-de" => SITE_STEPSTONE,
        other => other,
    }
}

/// Builds the registry of all six sources.
///
/// Each source gets its own [`SourceClient`]; all share `rotator`.
#[must_use]
pub fn build_default_registry(rotator: Option<Arc<ProxyRotator>>) -> SourceRegistry {
    let client = || SourceClient::new(rotator.clone());

    let mut registry = SourceRegistry::new();
    registry.register(Arc::new(LinkedInSource::new(client())));
    registry.register(Arc::new(IndeedSource::new(client())));
    registry.register(Arc::new(GlassdoorSource::new(client())));
    registry.register(Arc::new(ZipRecruiterSource::new(client())));
    registry.register(Arc::new(GoogleJobsSource::new()));
    registry.register(Arc::new(StepstoneSource::new(client())));
    registry
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::ALL_SITES;

    fn names(selected: &[Arc<dyn Source>]) -> Vec<&str> {
        selected.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_default_registry_has_all_sites() {
        let registry = build_default_registry(None);
        assert_eq!(registry.len(), ALL_SITES.len());
        for site in ALL_SITES {
            assert!(registry.get(site).is_some(), "missing {site}");
        }
    }

    #[test]
    fn test_select_all_and_empty() {
        let registry = build_default_registry(None);
        assert_eq!(registry.select("").unwrap().len(), 6);
        assert_eq!(registry.select(" ALL ").unwrap().len(), 6);
        assert_eq!(
            names(&registry.select("all").unwrap()),
            ["glassdoor", "google", "indeed", "linkedin", "stepstone", "ziprecruiter"]
        );
    }

    #[test]
    fn test_select_normalizes_and_expands_aliases() {
        let registry = build_default_registry(None);
        let selected = registry
            .select("www.LinkedIn, zip ,stepstone.de,,zip-recruiter")
            .unwrap();
        assert_eq!(names(&selected), ["linkedin", "ziprecruiter", "stepstone"]);
    }

    #[test]
    fn test_select_unknown_site() {
        let registry = build_default_registry(None);
        let err = registry.select("linkedin,monster").err().unwrap();
        assert_eq!(err.to_string(), "unknown site: monster");
    }

    #[test]
    fn test_normalize_sites() {
        assert_eq!(
            normalize_sites([" WWW.Indeed ", "", "glassdoor"]),
            ["indeed", "glassdoor"]
        );
    }
}
