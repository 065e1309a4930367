//! Query-file loading.
//!
//! A query file is either a flat JSON array of query strings or an object:
//!
//! ```json
//! {
//!   "job_titles": ["Rust Engineer", "Platform Engineer"],
//!   "search_options": { "location": "Berlin", "limit": 15, "links": "short" },
//!   "global_options": { "color": "never" }
//! }
//! ```
//!
//! Unknown fields at any level are rejected. Enumerated option values are
//! checked while loading, so a loaded [`QueryFile`] only carries valid values.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::QueryError;
use crate::models::JobType;
use crate::output::{ColorMode, LinkStyle};

const SHAPE_HINT: &str =
    "expected top-level string array or object with \"job_titles\" string array";
const TOP_LEVEL_FIELDS: [&str; 3] = ["job_titles", "search_options", "global_options"];

/// Search option overrides from `search_options`.
///
/// `None` means the file did not mention the option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOverrides {
    pub location: Option<String>,
    pub country: Option<String>,
    pub sites: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub remote: Option<bool>,
    /// `Some(None)` clears the job-type filter.
    pub job_type: Option<Option<JobType>>,
    pub hours: Option<u32>,
    /// Lowercased; empty clears an explicit format.
    pub format: Option<String>,
    pub links: Option<LinkStyle>,
    pub output: Option<PathBuf>,
    pub proxies: Option<String>,
    pub seen: Option<PathBuf>,
    pub new_only: Option<bool>,
    pub new_out: Option<PathBuf>,
    pub seen_update: Option<bool>,
}

/// Global option overrides from `global_options`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOverrides {
    pub json: Option<bool>,
    pub plain: Option<bool>,
    pub color: Option<ColorMode>,
    pub verbose: Option<bool>,
}

/// A loaded and validated query file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFile {
    /// Trimmed, non-empty query strings in file order.
    pub queries: Vec<String>,
    pub search: SearchOverrides,
    pub global: GlobalOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSearchOptions {
    location: Option<String>,
    country: Option<String>,
    sites: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    remote: Option<bool>,
    job_type: Option<String>,
    hours: Option<u32>,
    format: Option<String>,
    links: Option<String>,
    output: Option<String>,
    proxies: Option<String>,
    seen: Option<String>,
    new_only: Option<bool>,
    new_out: Option<String>,
    seen_update: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGlobalOptions {
    json: Option<bool>,
    plain: Option<bool>,
    color: Option<String>,
    verbose: Option<bool>,
}

impl QueryFile {
    /// Reads and validates the query file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Read`] if the file cannot be read,
    /// [`QueryError::Parse`] for malformed JSON and [`QueryError::Invalid`]
    /// for schema violations.
    pub fn load(path: &Path) -> Result<Self, QueryError> {
        let raw = fs::read_to_string(path).map_err(|e| QueryError::read(path, e))?;
        let file = Self::parse(path, &raw)?;
        debug!(
            path = %path.display(),
            queries = file.queries.len(),
            "Loaded query file"
        );
        Ok(file)
    }

    /// Loads `path` when one was given; otherwise returns an empty file.
    ///
    /// # Errors
    ///
    /// See [`QueryFile::load`].
    pub fn load_if_provided(path: Option<&Path>) -> Result<Self, QueryError> {
        match path {
            Some(path) if !path.as_os_str().is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Parses query-file contents; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// See [`QueryFile::load`].
    pub fn parse(path: &Path, raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        match trimmed.chars().next() {
            Some('[') => {
                let values: Vec<Value> =
                    serde_json::from_str(trimmed).map_err(|e| QueryError::parse(path, e))?;
                Ok(Self {
                    queries: string_array(path, &values, "root array")?,
                    ..Self::default()
                })
            }
            Some('{') => parse_object(path, trimmed),
            _ => Err(QueryError::invalid(path, SHAPE_HINT)),
        }
    }
}

fn parse_object(path: &Path, raw: &str) -> Result<QueryFile, QueryError> {
    let root: serde_json::Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| QueryError::parse(path, e))?;

    if let Some(field) = root.keys().find(|k| !TOP_LEVEL_FIELDS.contains(&k.as_str())) {
        return Err(QueryError::invalid(path, format!("unknown field \"{field}\"")));
    }

    let mut file = QueryFile::default();

    if let Some(titles) = root.get("job_titles") {
        let Value::Array(values) = titles else {
            return Err(QueryError::invalid(
                path,
                "field \"job_titles\" must be an array of strings",
            ));
        };
        file.queries = string_array(path, values, "job_titles")?;
    }

    if let Some(search) = root.get("search_options") {
        let raw: RawSearchOptions = serde_json::from_value(search.clone()).map_err(|e| {
            QueryError::invalid(path, format!("field \"search_options\": {e}"))
        })?;
        file.search = search_overrides(path, raw)?;
    }

    if let Some(global) = root.get("global_options") {
        let raw: RawGlobalOptions = serde_json::from_value(global.clone()).map_err(|e| {
            QueryError::invalid(path, format!("field \"global_options\": {e}"))
        })?;
        file.global = global_overrides(path, raw)?;
    }

    Ok(file)
}

fn string_array(path: &Path, values: &[Value], field: &str) -> Result<Vec<String>, QueryError> {
    let mut queries = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        let Value::String(query) = value else {
            return Err(QueryError::invalid(
                path,
                format!("{field}[{idx}] must be a string"),
            ));
        };
        let query = query.trim();
        if !query.is_empty() {
            queries.push(query.to_string());
        }
    }
    Ok(queries)
}

fn normalized(value: &str) -> String {
    value.trim().to_lowercase()
}

fn search_overrides(path: &Path, raw: RawSearchOptions) -> Result<SearchOverrides, QueryError> {
    let job_type = match raw.job_type.as_deref().map(normalized) {
        None => None,
        Some(value) if value.is_empty() => Some(None),
        Some(value) => Some(Some(JobType::from_str(&value).map_err(|_| {
            QueryError::invalid(
                path,
                "field \"search_options.job_type\" must be one of fulltime, parttime, contract, internship, or empty",
            )
        })?)),
    };

    let format = match raw.format.as_deref().map(normalized) {
        Some(value) if !matches!(value.as_str(), "" | "csv" | "json" | "md") => {
            return Err(QueryError::invalid(
                path,
                "field \"search_options.format\" must be one of csv, json, md, or empty",
            ));
        }
        other => other,
    };

    let links = match raw.links.as_deref() {
        None => None,
        Some(value) => Some(LinkStyle::from_str(&normalized(value)).map_err(|_| {
            QueryError::invalid(
                path,
                "field \"search_options.links\" must be one of short or full",
            )
        })?),
    };

    Ok(SearchOverrides {
        location: raw.location,
        country: raw.country,
        sites: raw.sites.map(|s| s.trim().to_string()),
        limit: raw.limit,
        offset: raw.offset,
        remote: raw.remote,
        job_type,
        hours: raw.hours,
        format,
        links,
        output: non_blank_path(raw.output),
        proxies: raw.proxies,
        seen: non_blank_path(raw.seen),
        new_only: raw.new_only,
        new_out: non_blank_path(raw.new_out),
        seen_update: raw.seen_update,
    })
}

/// Blank path values count as unset.
fn non_blank_path(value: Option<String>) -> Option<PathBuf> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn global_overrides(path: &Path, raw: RawGlobalOptions) -> Result<GlobalOverrides, QueryError> {
    let color = match raw.color.as_deref() {
        None => None,
        Some(value) => Some(ColorMode::from_str(&normalized(value)).map_err(|_| {
            QueryError::invalid(
                path,
                "field \"global_options.color\" must be one of auto, always, or never",
            )
        })?),
    };

    if raw.json == Some(true) && raw.plain == Some(true) {
        return Err(QueryError::invalid(
            path,
            "global_options.json and global_options.plain cannot both be true",
        ));
    }

    Ok(GlobalOverrides {
        json: raw.json,
        plain: raw.plain,
        color,
        verbose: raw.verbose,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<QueryFile, QueryError> {
        QueryFile::parse(Path::new("q.json"), raw)
    }

    fn invalid_reason(raw: &str) -> String {
        match parse(raw).unwrap_err() {
            QueryError::Invalid { reason, .. } => reason,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    // ==================== Shapes ====================

    #[test]
    fn test_parse_flat_array_trims_and_skips_blank() {
        let file = parse(r#"[" Rust Engineer ", "", "SRE"]"#).unwrap();
        assert_eq!(file.queries, ["Rust Engineer", "SRE"]);
        assert_eq!(file.search, SearchOverrides::default());
    }

    #[test]
    fn test_parse_object_with_options() {
        let file = parse(
            r#"{
                "job_titles": ["Data Engineer"],
                "search_options": {
                    "location": "Berlin",
                    "limit": 5,
                    "job_type": " FullTime ",
                    "format": "MD",
                    "links": "short",
                    "seen": "seen.json",
                    "seen_update": true
                },
                "global_options": {"color": "Never", "verbose": true}
            }"#,
        )
        .unwrap();
        assert_eq!(file.queries, ["Data Engineer"]);
        assert_eq!(file.search.location.as_deref(), Some("Berlin"));
        assert_eq!(file.search.limit, Some(5));
        assert_eq!(file.search.job_type, Some(Some(JobType::Fulltime)));
        assert_eq!(file.search.format.as_deref(), Some("md"));
        assert_eq!(file.search.links, Some(LinkStyle::Short));
        assert_eq!(file.search.seen, Some(PathBuf::from("seen.json")));
        assert_eq!(file.search.seen_update, Some(true));
        assert_eq!(file.global.color, Some(ColorMode::Never));
        assert_eq!(file.global.verbose, Some(true));
        assert_eq!(file.global.json, None);
    }

    #[test]
    fn test_empty_job_type_clears_filter() {
        let file = parse(r#"{"search_options": {"job_type": ""}}"#).unwrap();
        assert_eq!(file.search.job_type, Some(None));
        assert!(file.queries.is_empty());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(invalid_reason("   "), SHAPE_HINT);
        assert_eq!(invalid_reason(r#""rust""#), SHAPE_HINT);
        assert!(matches!(parse("[1,"), Err(QueryError::Parse { .. })));
    }

    // ==================== Schema ====================

    #[test]
    fn test_rejects_unknown_top_level_field() {
        assert_eq!(
            invalid_reason(r#"{"job_titles": ["a"], "extra": 1}"#),
            "unknown field \"extra\""
        );
    }

    #[test]
    fn test_rejects_unknown_nested_field() {
        let reason = invalid_reason(r#"{"search_options": {"locaton": "x"}}"#);
        assert!(reason.starts_with("field \"search_options\": unknown field `locaton`"));
        let reason = invalid_reason(r#"{"global_options": {"quiet": true}}"#);
        assert!(reason.starts_with("field \"global_options\""));
    }

    #[test]
    fn test_rejects_non_string_entries() {
        assert_eq!(invalid_reason(r#"["a", 3]"#), "root array[1] must be a string");
        assert_eq!(
            invalid_reason(r#"{"job_titles": ["a", null]}"#),
            "job_titles[1] must be a string"
        );
        assert_eq!(
            invalid_reason(r#"{"job_titles": "a"}"#),
            "field \"job_titles\" must be an array of strings"
        );
    }

    #[test]
    fn test_rejects_out_of_range_enums() {
        assert!(invalid_reason(r#"{"search_options": {"job_type": "gig"}}"#)
            .contains("search_options.job_type"));
        assert!(invalid_reason(r#"{"search_options": {"format": "table"}}"#)
            .contains("search_options.format"));
        assert!(invalid_reason(r#"{"search_options": {"links": ""}}"#)
            .contains("search_options.links"));
        assert!(invalid_reason(r#"{"global_options": {"color": "sometimes"}}"#)
            .contains("global_options.color"));
    }

    #[test]
    fn test_rejects_json_and_plain_together() {
        assert_eq!(
            invalid_reason(r#"{"global_options": {"json": true, "plain": true}}"#),
            "global_options.json and global_options.plain cannot both be true"
        );
        assert!(parse(r#"{"global_options": {"json": true, "plain": false}}"#).is_ok());
    }

    // ==================== Loading ====================

    #[test]
    fn test_load_missing_file_reports_read_error() {
        let err = QueryFile::load(Path::new("/nonexistent/queries.json")).unwrap_err();
        assert!(matches!(err, QueryError::Read { .. }));
        assert!(err.to_string().starts_with("read --query-file \"/nonexistent/queries.json\""));
    }

    #[test]
    fn test_load_if_provided_none_is_empty() {
        assert_eq!(QueryFile::load_if_provided(None).unwrap(), QueryFile::default());
        assert_eq!(
            QueryFile::load_if_provided(Some(Path::new(""))).unwrap(),
            QueryFile::default()
        );
    }
}
