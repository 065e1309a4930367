//! Indeed search with country subdomains.

use async_trait::async_trait;
use scraper::Html;
use tracing::instrument;

use super::common::{
    absolute_url, element_text, fetch_document, finalize, first_text, is_remote, select_all,
};
use super::jsonld::parse_jsonld_jobs;
use super::{SITE_INDEED, Source, SourceError};
use crate::models::{Job, SearchParams};
use crate::network::SourceClient;

#[derive(Debug, Clone)]
pub struct IndeedSource {
    client: SourceClient,
}

impl IndeedSource {
    #[must_use]
    pub fn new(client: SourceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Source for IndeedSource {
    fn name(&self) -> &str {
        SITE_INDEED
    }

    #[instrument(level = "debug", skip(self, params), fields(query = %params.query))]
    async fn search(&self, params: &SearchParams) -> Result<Vec<Job>, SourceError> {
        let body = fetch_document(&self.client, SITE_INDEED, &search_url(params), &[]).await?;
        let mut jobs = parse_cards(&body, params);
        jobs.extend(parse_jsonld_jobs(&body, SITE_INDEED));
        Ok(finalize(jobs, params))
    }
}

/// `https://www.indeed.com` for the US, `https://<country>.indeed.com` otherwise.
fn base_url(country: &str) -> String {
    let country = country.trim().to_lowercase();
    if country.is_empty() || country == "usa" || country == "us" {
        "https://www.indeed.com".to_string()
    } else {
        format!("https://{country}.indeed.com")
    }
}

fn search_url(params: &SearchParams) -> String {
    let mut url = format!(
        "{}/jobs?q={}",
        base_url(&params.country),
        urlencoding::encode(&params.query)
    );
    if !params.location.is_empty() {
        url.push_str(&format!("&l={}", urlencoding::encode(&params.location)));
    }
    if params.offset > 0 {
        url.push_str(&format!("&start={}", params.offset));
    }
    if let Some(job_type) = params.job_type {
        url.push_str(&format!("&jt={job_type}"));
    }
    if let Some(days) = params.max_age_days() {
        url.push_str(&format!("&fromage={days}"));
    }
    url
}

fn parse_cards(body: &str, params: &SearchParams) -> Vec<Job> {
    let document = Html::parse_document(body);
    let base = base_url(&params.country);
    let job_type = params.job_type.map(|t| t.to_string()).unwrap_or_default();

    select_all(document.root_element(), "a.tapItem")
        .into_iter()
        .filter_map(|card| {
            let href = card.value().attr("href").unwrap_or_default();
            let url = absolute_url(&base, href);
            let title = first_text(card, &["h2.jobTitle span", "h2.jobTitle"]);
            if title.is_empty() || url.is_empty() {
                return None;
            }
            let location = first_text(card, &["div.companyLocation"]);
            let snippet = select_all(card, "div.job-snippet")
                .into_iter()
                .map(element_text)
                .collect::<Vec<_>>()
                .join(" ");
            Some(Job {
                site: SITE_INDEED.to_string(),
                title,
                company: first_text(card, &["span.companyName"]),
                remote: is_remote(&location, &snippet),
                location,
                url,
                snippet,
                posted_at_raw: first_text(card, &["span.date"]),
                job_type: job_type.clone(),
                ..Job::default()
            })
        })
        .collect()
}
