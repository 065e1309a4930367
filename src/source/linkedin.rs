//! LinkedIn guest search, paging through HTML job cards.

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

use super::common::{
    clean_text, fetch_document, first_attr, first_text, is_remote, parse_posted_at, select_all,
};
use super::{SITE_LINKEDIN, Source, SourceError};
use crate::models::{Job, SearchParams};
use crate::network::SourceClient;

const SEARCH_ENDPOINT: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
const DETAIL_ENDPOINT: &str = "https://www.linkedin.com/jobs-guest/jobs/api/jobPosting";
const PAGE_SIZE: usize = 10;
/// Upper bound on pages per search when no limit stops paging earlier.
const MAX_PAGES: usize = 25;
const MIN_JOB_ID_DIGITS: usize = 6;

const DESCRIPTION_SELECTORS: &[&str] = &[
    "div.show-more-less-html__markup",
    "section.show-more-less-html",
    "div.description__text",
    "div.jobs-description__content",
    "div.jobs-description-content__text",
];

/// LinkedIn's guest endpoint returns HTML job cards ten at a time.
#[derive(Debug, Clone)]
pub struct LinkedInSource {
    client: SourceClient,
}

impl LinkedInSource {
    #[must_use]
    pub fn new(client: SourceClient) -> Self {
        Self { client }
    }

    /// Best-effort description from the posting detail endpoint.
    async fn fetch_description(&self, job_url: &str) -> String {
        let Some(detail_url) = detail_url(job_url) else {
            return String::new();
        };
        match fetch_document(&self.client, SITE_LINKEDIN, &detail_url, &[]).await {
            Ok(body) => parse_description(&body),
            Err(error) => {
                debug!(error = %error, url = %detail_url, "LinkedIn description unavailable");
                String::new()
            }
        }
    }
}

#[async_trait]
impl Source for LinkedInSource {
    fn name(&self) -> &str {
        SITE_LINKEDIN
    }

    #[instrument(level = "debug", skip(self, params), fields(query = %params.query))]
    async fn search(&self, params: &SearchParams) -> Result<Vec<Job>, SourceError> {
        let mut jobs = Vec::new();
        let mut start = params.offset;

        for _ in 0..MAX_PAGES {
            if params.limit > 0 && jobs.len() >= params.limit {
                break;
            }
            let body =
                fetch_document(&self.client, SITE_LINKEDIN, &search_url(params, start), &[])
                    .await?;
            let page = parse_cards(&body);
            if page.is_empty() {
                break;
            }

            for mut job in page {
                if params.remote && !job.remote {
                    continue;
                }
                if job.description.is_empty() {
                    job.description = self.fetch_description(&job.url).await;
                }
                if job.description.is_empty() {
                    job.description.clone_from(&job.snippet);
                }
                jobs.push(job);
                if params.limit > 0 && jobs.len() >= params.limit {
                    break;
                }
            }
            start += PAGE_SIZE;
        }

        Ok(jobs)
    }
}

fn search_url(params: &SearchParams, start: usize) -> String {
    let mut url = format!(
        "{SEARCH_ENDPOINT}?keywords={}",
        urlencoding::encode(&params.query)
    );
    if !params.location.is_empty() {
        url.push_str(&format!("&location={}", urlencoding::encode(&params.location)));
    }
    url.push_str(&format!("&start={start}"));
    if params.hours > 0 {
        url.push_str(&format!("&f_TPR=r{}", u64::from(params.hours) * 3600));
    }
    url
}

fn parse_cards(body: &str) -> Vec<Job> {
    let document = Html::parse_document(body);
    let mut seen = std::collections::HashSet::new();
    let mut jobs = Vec::new();

    for card in select_all(document.root_element(), "li") {
        let link = first_attr(card, "a.base-card__full-link", "href");
        if link.is_empty() || !seen.insert(link.clone()) {
            continue;
        }
        let location = first_text(card, &["span.job-search-card__location"]);
        let snippet = first_text(
            card,
            &["div.job-search-card__snippet", "p.job-search-card__snippet"],
        );
        let mut posted_at_raw = clean_text(&first_attr(card, "time", "datetime"));
        if posted_at_raw.is_empty() {
            posted_at_raw = first_text(card, &["time"]);
        }

        jobs.push(Job {
            site: SITE_LINKEDIN.to_string(),
            title: first_text(card, &["h3.base-search-card__title"]),
            company: first_text(card, &["h4.base-search-card__subtitle"]),
            remote: is_remote(&location, &snippet),
            location,
            url: link,
            snippet,
            posted_at: parse_posted_at(&posted_at_raw),
            posted_at_raw,
            ..Job::default()
        });
    }
    jobs
}

fn parse_description(body: &str) -> String {
    let document = Html::parse_document(body);
    first_text(document.root_element(), DESCRIPTION_SELECTORS)
}

fn detail_url(job_url: &str) -> Option<String> {
    job_id(job_url).map(|id| format!("{DETAIL_ENDPOINT}/{id}"))
}

/// Numeric posting id from a job URL, preferring the segment after `view`.
fn job_id(job_url: &str) -> Option<String> {
    let parsed = Url::parse(job_url.trim()).ok()?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    let after_view = segments
        .windows(2)
        .filter(|pair| pair[0] == "view")
        .find_map(|pair| last_digit_run(pair[1]));
    after_view.or_else(|| segments.iter().find_map(|segment| last_digit_run(segment)))
}

/// Last run of at least six ASCII digits in `value`.
fn last_digit_run(value: &str) -> Option<String> {
    value
        .split(|c: char| !c.is_ascii_digit())
        .rfind(|run| run.len() >= MIN_JOB_ID_DIGITS)
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CARDS: &str = r#"
        <ul>
          <li>
            <div class="base-card">
              <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/rust-engineer-at-acme-3812345678?trk=x"></a>
              <h3 class="base-search-card__title"> Rust Engineer </h3>
              <h4 class="base-search-card__subtitle"><a>Acme</a></h4>
              <span class="job-search-card__location">Remote, EU</span>
              <time datetime="2024-05-02">1 day ago</time>
            </div>
          </li>
          <li>
            <div class="base-card">
              <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/sre-at-beta-3899999999"></a>
              <h3 class="base-search-card__title">SRE</h3>
              <h4 class="base-search-card__subtitle">Beta</h4>
              <span class="job-search-card__location">Berlin</span>
            </div>
          </li>
          <li><span>no link</span></li>
        </ul>"#;

    #[test]
    fn test_search_url_includes_filters() {
        let params = SearchParams {
            query: "rust developer".to_string(),
            location: "Berlin, DE".to_string(),
            hours: 24,
            ..SearchParams::default()
        };
        let url = search_url(&params, 20);
        assert!(url.starts_with(SEARCH_ENDPOINT));
        assert!(url.contains("keywords=rust%20developer"));
        assert!(url.contains("location=Berlin%2C%20DE"));
        assert!(url.contains("start=20"));
        assert!(url.contains("f_TPR=r86400"));
    }

    #[test]
    fn test_search_url_omits_empty_location_and_hours() {
        let url = search_url(&SearchParams::default(), 0);
        assert!(!url.contains("location="));
        assert!(!url.contains("f_TPR"));
    }

    #[test]
    fn test_parse_cards() {
        let jobs = parse_cards(CARDS);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Rust Engineer");
        assert_eq!(jobs[0].company, "Acme");
        assert!(jobs[0].remote);
        assert_eq!(jobs[0].posted_at_raw, "2024-05-02");
        assert!(jobs[0].posted_at.is_some());
        assert_eq!(jobs[1].location, "Berlin");
        assert!(!jobs[1].remote);
    }

    #[test]
    fn test_job_id_prefers_view_segment() {
        assert_eq!(
            job_id("https://www.linkedin.com/jobs/view/rust-engineer-at-acme-3812345678?trk=x")
                .as_deref(),
            Some("3812345678")
        );
        assert_eq!(
            job_id("https://de.linkedin.com/jobs/view/4000000001/").as_deref(),
            Some("4000000001")
        );
        assert_eq!(job_id("https://www.linkedin.com/jobs/view/short-123"), None);
        assert_eq!(job_id("not a url"), None);
    }

    #[test]
    fn test_detail_url() {
        assert_eq!(
            detail_url("https://www.linkedin.com/jobs/view/x-3812345678").as_deref(),
            Some("https://www.linkedin.com/jobs-guest/jobs/api/jobPosting/3812345678")
        );
    }

    #[test]
    fn test_parse_description_uses_first_matching_block() {
        let body = r#"<div class="description__text"> Build   things </div>"#;
        assert_eq!(parse_description(body), "Build things");
    }
}
