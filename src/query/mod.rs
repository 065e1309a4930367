//! Query resolution: query strings plus option precedence.
//!
//! Options come from three tiers. Flags given on the command line win, then
//! values from a query file, then built-in and environment defaults. The
//! caller records which options came from the command line in
//! [`ProvidedOptions`]; [`apply_query_file`] only fills in the rest.

mod error;
mod file;

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

pub use error::QueryError;
pub use file::{GlobalOverrides, QueryFile, SearchOverrides};

use crate::models::{JobType, SearchParams};
use crate::output::{ColorMode, LinkStyle};

/// Most distinct queries a single run accepts.
pub const MAX_QUERIES: usize = 10;

/// Splits a comma-separated query string, trimming and dropping blanks.
#[must_use]
pub fn split_queries(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

/// Merges two query lists, keeping first-seen casing and dropping
/// case-insensitive repeats.
///
/// # Errors
///
/// Returns [`QueryError::NoQueries`] if nothing remains and
/// [`QueryError::TooManyQueries`] above [`MAX_QUERIES`].
pub fn merge_queries(primary: &[String], secondary: &[String]) -> Result<Vec<String>, QueryError> {
    let mut seen = HashSet::new();
    let queries: Vec<String> = primary
        .iter()
        .chain(secondary)
        .map(|q| q.trim())
        .filter(|q| !q.is_empty() && seen.insert(q.to_lowercase()))
        .map(str::to_string)
        .collect();

    if queries.is_empty() {
        return Err(QueryError::NoQueries);
    }
    if queries.len() > MAX_QUERIES {
        return Err(QueryError::TooManyQueries { max: MAX_QUERIES });
    }
    Ok(queries)
}

/// The search options bundle for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Comma-separated site list; empty or `all` selects every source.
    pub sites: String,
    pub location: String,
    pub country: String,
    /// Results kept per query; 0 falls back to the configured default.
    pub limit: usize,
    pub offset: usize,
    pub remote: bool,
    pub job_type: Option<JobType>,
    pub hours: u32,
    /// Explicit output format name; empty when unset.
    pub format: String,
    pub links: LinkStyle,
    pub output: Option<PathBuf>,
    /// Comma-separated proxy list; empty defers to env and `proxies.txt`.
    pub proxies: String,
    pub seen: Option<PathBuf>,
    pub new_only: bool,
    pub new_out: Option<PathBuf>,
    pub seen_update: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sites: "all".to_string(),
            location: String::new(),
            country: String::new(),
            limit: 0,
            offset: 0,
            remote: false,
            job_type: None,
            hours: 0,
            format: String::new(),
            links: LinkStyle::Full,
            output: None,
            proxies: String::new(),
            seen: None,
            new_only: false,
            new_out: None,
            seen_update: false,
        }
    }
}

impl SearchOptions {
    /// Fails when a seen-dependent flag is set without `--seen`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MissingSeen`] naming the offending flag.
    pub fn validate_seen_flags(&self) -> Result<(), QueryError> {
        if self.seen.is_some() {
            return Ok(());
        }
        let flag = if self.new_only {
            "--new-only"
        } else if self.new_out.is_some() {
            "--new-out"
        } else if self.seen_update {
            "--seen-update"
        } else {
            return Ok(());
        };
        Err(QueryError::MissingSeen { flag })
    }

    /// Base search parameters; empty location/country and a zero limit
    /// fall back to the given defaults.
    #[must_use]
    pub fn base_params(&self, location: &str, country: &str, limit: usize) -> SearchParams {
        let pick = |value: &str, fallback: &str| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        SearchParams {
            query: String::new(),
            location: pick(&self.location, location),
            country: pick(&self.country, country),
            limit: if self.limit == 0 { limit } else { self.limit },
            offset: self.offset,
            remote: self.remote,
            job_type: self.job_type,
            hours: self.hours,
        }
    }
}

/// Global output and logging switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub json: bool,
    pub plain: bool,
    pub verbose: bool,
    pub color: ColorMode,
}

/// Which options were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProvidedOptions {
    pub sites: bool,
    pub location: bool,
    pub country: bool,
    pub limit: bool,
    pub offset: bool,
    pub remote: bool,
    pub job_type: bool,
    pub hours: bool,
    pub format: bool,
    pub links: bool,
    pub output: bool,
    pub proxies: bool,
    pub seen: bool,
    pub new_only: bool,
    pub new_out: bool,
    pub seen_update: bool,
    pub json: bool,
    pub plain: bool,
    pub verbose: bool,
    pub color: bool,
}

/// Applies query-file overrides to every option not given on the command line.
///
/// `sites` is only taken from the file when `allow_sites_override` is set;
/// per-site commands pass `false`.
///
/// # Errors
///
/// Returns [`QueryError::OutputModeConflict`] when `json` and `plain` are both
/// enabled afterwards.
pub fn apply_query_file(
    search: &mut SearchOptions,
    global: &mut GlobalOptions,
    file: &QueryFile,
    provided: &ProvidedOptions,
    allow_sites_override: bool,
) -> Result<(), QueryError> {
    let overrides = &file.search;

    if !provided.location
        && let Some(location) = &overrides.location
    {
        search.location.clone_from(location);
    }
    if !provided.country
        && let Some(country) = &overrides.country
    {
        search.country.clone_from(country);
    }
    if !provided.limit
        && let Some(limit) = overrides.limit
    {
        search.limit = limit;
    }
    if !provided.offset
        && let Some(offset) = overrides.offset
    {
        search.offset = offset;
    }
    if !provided.remote
        && let Some(remote) = overrides.remote
    {
        search.remote = remote;
    }
    if !provided.job_type
        && let Some(job_type) = overrides.job_type
    {
        search.job_type = job_type;
    }
    if !provided.hours
        && let Some(hours) = overrides.hours
    {
        search.hours = hours;
    }
    if !provided.format
        && let Some(format) = &overrides.format
    {
        search.format.clone_from(format);
    }
    if !provided.links
        && let Some(links) = overrides.links
    {
        search.links = links;
    }
    if !provided.proxies
        && let Some(proxies) = &overrides.proxies
    {
        search.proxies.clone_from(proxies);
    }
    if !provided.seen
        && let Some(seen) = &overrides.seen
    {
        search.seen = Some(seen.clone());
    }
    if !provided.new_only
        && let Some(new_only) = overrides.new_only
    {
        search.new_only = new_only;
    }
    if !provided.new_out
        && let Some(new_out) = &overrides.new_out
    {
        search.new_out = Some(new_out.clone());
    }
    if !provided.seen_update
        && let Some(seen_update) = overrides.seen_update
    {
        search.seen_update = seen_update;
    }
    if !provided.output
        && let Some(output) = &overrides.output
    {
        search.output = Some(output.clone());
    }
    if allow_sites_override
        && !provided.sites
        && let Some(sites) = &overrides.sites
    {
        search.sites.clone_from(sites);
    }

    let globals = &file.global;
    if !provided.json
        && let Some(json) = globals.json
    {
        global.json = json;
    }
    if !provided.plain
        && let Some(plain) = globals.plain
    {
        global.plain = plain;
    }
    if !provided.verbose
        && let Some(verbose) = globals.verbose
    {
        global.verbose = verbose;
    }
    if !provided.color
        && let Some(color) = globals.color
    {
        global.color = color;
    }

    if global.json && global.plain {
        return Err(QueryError::OutputModeConflict);
    }

    debug!(
        sites = %search.sites,
        limit = search.limit,
        seen = search.seen.is_some(),
        "Applied query file options"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    fn file(raw: &str) -> QueryFile {
        QueryFile::parse(Path::new("q.json"), raw).unwrap()
    }

    // ==================== Query merging ====================

    #[test]
    fn test_split_queries() {
        assert_eq!(split_queries(" rust , ,go,"), ["rust", "go"]);
        assert!(split_queries("").is_empty());
    }

    #[test]
    fn test_merge_keeps_first_casing() {
        let merged = merge_queries(&split_queries("Backend,backend"), &[]).unwrap();
        assert_eq!(merged, ["Backend"]);
    }

    #[test]
    fn test_merge_cli_before_file() {
        let merged =
            merge_queries(&strings(&["SRE"]), &strings(&["Data Engineer", "sre", " "])).unwrap();
        assert_eq!(merged, ["SRE", "Data Engineer"]);
    }

    #[test]
    fn test_merge_requires_a_query() {
        assert!(matches!(
            merge_queries(&strings(&["  "]), &[]),
            Err(QueryError::NoQueries)
        ));
    }

    #[test]
    fn test_merge_caps_query_count() {
        let ten: Vec<String> = (0..10).map(|i| format!("q{i}")).collect();
        assert_eq!(merge_queries(&ten, &[]).unwrap().len(), 10);
        let err = merge_queries(&ten, &strings(&["q10"])).unwrap_err();
        assert_eq!(err.to_string(), "too many queries: max 10");
        // Repeats do not count toward the cap.
        assert_eq!(merge_queries(&ten, &strings(&["Q0"])).unwrap().len(), 10);
    }

    // ==================== Precedence ====================

    #[test]
    fn test_file_fills_unprovided_options() {
        let qf = file(
            r#"{"search_options": {"location": "Munich", "limit": 3, "remote": true,
                "sites": "linkedin", "output": "out.csv"},
                "global_options": {"verbose": true}}"#,
        );
        let mut search = SearchOptions::default();
        let mut global = GlobalOptions::default();
        apply_query_file(&mut search, &mut global, &qf, &ProvidedOptions::default(), true)
            .unwrap();
        assert_eq!(search.location, "Munich");
        assert_eq!(search.limit, 3);
        assert!(search.remote);
        assert_eq!(search.sites, "linkedin");
        assert_eq!(search.output, Some(PathBuf::from("out.csv")));
        assert!(global.verbose);
    }

    #[test]
    fn test_cli_values_win() {
        let qf = file(r#"{"search_options": {"location": "Munich", "limit": 3}}"#);
        let mut search = SearchOptions {
            location: "Hamburg".to_string(),
            limit: 0,
            ..SearchOptions::default()
        };
        let provided = ProvidedOptions {
            location: true,
            limit: true,
            ..ProvidedOptions::default()
        };
        let mut global = GlobalOptions::default();
        apply_query_file(&mut search, &mut global, &qf, &provided, true).unwrap();
        assert_eq!(search.location, "Hamburg");
        assert_eq!(search.limit, 0);
    }

    #[test]
    fn test_sites_ignored_for_single_site_commands() {
        let qf = file(r#"{"search_options": {"sites": "indeed"}}"#);
        let mut search = SearchOptions {
            sites: "linkedin".to_string(),
            ..SearchOptions::default()
        };
        let mut global = GlobalOptions::default();
        apply_query_file(&mut search, &mut global, &qf, &ProvidedOptions::default(), false)
            .unwrap();
        assert_eq!(search.sites, "linkedin");
    }

    #[test]
    fn test_json_plain_conflict_after_merge() {
        let qf = file(r#"{"global_options": {"json": true}}"#);
        let mut search = SearchOptions::default();
        let mut global = GlobalOptions {
            plain: true,
            ..GlobalOptions::default()
        };
        let provided = ProvidedOptions {
            plain: true,
            ..ProvidedOptions::default()
        };
        let err = apply_query_file(&mut search, &mut global, &qf, &provided, true).unwrap_err();
        assert_eq!(err.to_string(), "cannot combine --json and --plain");
    }

    // ==================== Base params ====================

    #[test]
    fn test_validate_seen_flags() {
        let mut opts = SearchOptions {
            new_only: true,
            ..SearchOptions::default()
        };
        assert!(matches!(
            opts.validate_seen_flags(),
            Err(QueryError::MissingSeen { flag: "--new-only" })
        ));
        opts.new_only = false;
        opts.seen_update = true;
        assert_eq!(
            opts.validate_seen_flags().unwrap_err().to_string(),
            "--seen-update requires --seen"
        );
        opts.seen = Some(PathBuf::from("seen.json"));
        assert!(opts.validate_seen_flags().is_ok());
    }

    #[test]
    fn test_base_params_fall_back_to_defaults() {
        let opts = SearchOptions {
            country: "de".to_string(),
            remote: true,
            ..SearchOptions::default()
        };
        let params = opts.base_params("Berlin", "usa", 20);
        assert_eq!(params.location, "Berlin");
        assert_eq!(params.country, "de");
        assert_eq!(params.limit, 20);
        assert!(params.remote);
        assert!(params.query.is_empty());
    }
}
