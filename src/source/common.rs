//! Helpers shared by the site adapters: page fetch, text cleanup and
//! result post-processing.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::SourceError;
use crate::models::{Job, SearchParams};
use crate::network::{FetchRequest, SourceClient};

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Snippet length cap, in characters, before the ellipsis.
pub(crate) const SNIPPET_MAX_CHARS: usize = 240;

/// Fetches `url` and returns the body.
///
/// `accept` and `accept-language` get browser defaults unless `headers`
/// overrides them.
pub(crate) async fn fetch_document(
    client: &SourceClient,
    site: &str,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<String, SourceError> {
    let mut request = FetchRequest::get(url);
    let overridden = |name: &str| headers.iter().any(|(h, _)| h.eq_ignore_ascii_case(name));
    if !overridden("accept") {
        request = request.header("accept", DEFAULT_ACCEPT);
    }
    if !overridden("accept-language") {
        request = request.header("accept-language", DEFAULT_ACCEPT_LANGUAGE);
    }
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = client
        .fetch(request)
        .await
        .map_err(|e| SourceError::network(site, e))?;
    if response.status >= 400 {
        debug!(site, url, status = response.status, "Source returned error status");
        return Err(SourceError::http_status(site, response.status));
    }
    Ok(response.body)
}

/// Parses a CSS selector. Selectors here are literals, so `None` only
/// happens for a typo and simply matches nothing.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// All elements under `scope` matching `css`.
pub(crate) fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    selector(css).map_or_else(Vec::new, |sel| scope.select(&sel).collect())
}

/// Whitespace-collapsed text of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Cleaned text of the first non-empty match among `selectors`.
pub(crate) fn first_text(scope: ElementRef<'_>, selectors: &[&str]) -> String {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| {
            scope
                .select(&sel)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty())
        })
        .unwrap_or_default()
}

/// Trimmed attribute of the first element matching `css`.
pub(crate) fn first_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> String {
    selector(css)
        .and_then(|sel| {
            scope
                .select(&sel)
                .next()
                .and_then(|el| el.value().attr(attr))
                .map(|value| value.trim().to_string())
        })
        .unwrap_or_default()
}

/// Collapses whitespace runs to single spaces and trims.
pub(crate) fn clean_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decodes entities and drops markup from an HTML description.
///
/// Descriptions are often entity-escaped HTML, so markup that only appears
/// after decoding is stripped in a second pass.
pub(crate) fn html_to_text(value: &str) -> String {
    let mut text = fragment_text(value);
    if text.contains('<') && text.contains('>') {
        text = fragment_text(&text);
    }
    clean_text(&text)
}

fn fragment_text(value: &str) -> String {
    Html::parse_fragment(value)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves `href` against `base`. Absolute and protocol-relative links are
/// returned as absolute URLs; unparsable input is returned unchanged.
pub(crate) fn absolute_url(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map_or_else(|_| href.to_string(), String::from)
}

/// Parses a posting timestamp in one of the formats listing sites publish.
pub(crate) fn parse_posted_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// True when location or snippet mention remote work.
pub(crate) fn is_remote(location: &str, snippet: &str) -> bool {
    location.to_lowercase().contains("remote") || snippet.to_lowercase().contains("remote")
}

/// Trims `value` and cuts it to `max` characters plus `...`.
pub(crate) fn truncate(value: &str, max: usize) -> String {
    let value = value.trim();
    if max == 0 || value.chars().count() <= max {
        return value.to_string();
    }
    let cut: String = value.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

/// Page-level identity: URL when present, else title, company and location.
pub(crate) fn page_key(job: &Job) -> String {
    if job.url.is_empty() {
        format!("{}|{}|{}", job.title, job.company, job.location).to_lowercase()
    } else {
        job.url.clone()
    }
}

/// Drops later jobs that share a [`page_key`] with an earlier one.
pub(crate) fn dedupe_jobs(jobs: Vec<Job>) -> Vec<Job> {
    let mut seen = HashSet::with_capacity(jobs.len());
    jobs.into_iter()
        .filter(|job| seen.insert(page_key(job)))
        .collect()
}

/// Dedupes a page of results, applies the remote filter and the limit.
pub(crate) fn finalize(jobs: Vec<Job>, params: &SearchParams) -> Vec<Job> {
    let mut jobs = dedupe_jobs(jobs);
    if params.remote {
        jobs.retain(|job| job.remote);
    }
    if params.limit > 0 {
        jobs.truncate(params.limit);
    }
    jobs
}
