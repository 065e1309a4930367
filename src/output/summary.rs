use std::collections::BTreeMap;

use crate::models::Job;

/// Jobs per site, keyed by lowercased site name. Blank sites count as `unknown`.
#[must_use]
pub fn site_counts(jobs: &[Job]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for job in jobs {
        let site = job.site.trim().to_lowercase();
        let site = if site.is_empty() {
            "unknown".to_string()
        } else {
            site
        };
        *counts.entry(site).or_insert(0) += 1;
    }
    counts
}

/// One-line run summary, e.g. `summary: new_jobs=3 by_site=indeed:1, linkedin:2`.
#[must_use]
pub fn format_search_summary(jobs: &[Job]) -> String {
    let counts = site_counts(jobs);
    let by_site = if counts.is_empty() {
        "none".to_string()
    } else {
        counts
            .iter()
            .map(|(site, count)| format!("{site}:{count}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("summary: new_jobs={} by_site={by_site}", jobs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_groups_sites() {
        let jobs = vec![
            Job::new("LinkedIn", "a", "x"),
            Job::new("indeed", "b", "x"),
            Job::new(" linkedin ", "c", "x"),
            Job::new("", "d", "x"),
        ];
        assert_eq!(
            format_search_summary(&jobs),
            "summary: new_jobs=4 by_site=indeed:1, linkedin:2, unknown:1"
        );
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(format_search_summary(&[]), "summary: new_jobs=0 by_site=none");
    }
}
