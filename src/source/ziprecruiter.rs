//! ZipRecruiter search.

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::instrument;

use super::common::{
    absolute_url, fetch_document, finalize, first_attr, first_text, is_remote, select_all,
};
use super::jsonld::parse_jsonld_jobs;
use super::{SITE_ZIPRECRUITER, Source, SourceError};
use crate::models::{Job, SearchParams};
use crate::network::SourceClient;

const BASE_URL: &str = "https://www.ziprecruiter.com";
const PAGE_SIZE: usize = 25;

/// Card layouts seen across ZipRecruiter page versions; the first that
/// yields jobs wins.
const CARD_SELECTORS: &[&str] = &[
    "article.job_result",
    "article.job-result",
    "div.job_result",
    "div.job-result",
    "li.job_result",
];

#[derive(Debug, Clone)]
pub struct ZipRecruiterSource {
    client: SourceClient,
}

impl ZipRecruiterSource {
    #[must_use]
    pub fn new(client: SourceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Source for ZipRecruiterSource {
    fn name(&self) -> &str {
        SITE_ZIPRECRUITER
    }

    #[instrument(level = "debug", skip(self, params), fields(query = %params.query))]
    async fn search(&self, params: &SearchParams) -> Result<Vec<Job>, SourceError> {
        let body =
            fetch_document(&self.client, SITE_ZIPRECRUITER, &search_url(params), &[]).await?;
        let mut jobs = parse_jsonld_jobs(&body, SITE_ZIPRECRUITER);
        jobs.extend(parse_cards(&body));
        Ok(finalize(jobs, params))
    }
}

fn search_url(params: &SearchParams) -> String {
    let mut url = format!(
        "{BASE_URL}/jobs-search?search={}",
        urlencoding::encode(&params.query)
    );
    if !params.location.is_empty() {
        url.push_str(&format!("&location={}", urlencoding::encode(&params.location)));
    }
    if params.offset > 0 {
        url.push_str(&format!("&page={}", params.offset / PAGE_SIZE + 1));
    }
    url
}

fn parse_cards(body: &str) -> Vec<Job> {
    let document = Html::parse_document(body);
    let root = document.root_element();
    for css in CARD_SELECTORS {
        let jobs: Vec<Job> = select_all(root, css)
            .into_iter()
            .map(job_from_card)
            .filter(|job| !job.title.is_empty() && !job.url.is_empty())
            .collect();
        if !jobs.is_empty() {
            return jobs;
        }
    }
    Vec::new()
}

fn job_from_card(card: ElementRef<'_>) -> Job {
    let mut title = first_text(card, &["a.job_link", "a.job_title", "a.jobLink", "a.t_job_link"]);
    if title.is_empty() {
        title = first_text(card, &["h2", "h3"]);
    }
    let mut href = first_attr(card, "a.job_link", "href");
    if href.is_empty() {
        href = first_attr(card, "a.job_title", "href");
    }
    let location = first_text(
        card,
        &["div.location", "span.location", "span.job_location", "div.job_location"],
    );
    let snippet = first_text(card, &["div.job_snippet", "p.job_snippet", "div.snippet", "p"]);

    Job {
        site: SITE_ZIPRECRUITER.to_string(),
        title,
        company: first_text(
            card,
            &["a.t_org_link", "a.company_name", "span.company_name", "span.name"],
        ),
        remote: is_remote(&location, &snippet),
        location,
        url: absolute_url(BASE_URL, &href),
        snippet,
        ..Job::default()
    }
}
