//! Glassdoor job search.

use async_trait::async_trait;
use scraper::Html;
use tracing::instrument;

use super::common::{
    absolute_url, fetch_document, finalize, first_attr, first_text, is_remote, select_all,
};
use super::jsonld::parse_jsonld_jobs;
use super::{SITE_GLASSDOOR, Source, SourceError};
use crate::models::{Job, SearchParams};
use crate::network::SourceClient;

const BASE_URL: &str = "https://www.glassdoor.com";

#[derive(Debug, Clone)]
pub struct GlassdoorSource {
    client: SourceClient,
}

impl GlassdoorSource {
    #[must_use]
    pub fn new(client: SourceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Source for GlassdoorSource {
    fn name(&self) -> &str {
        SITE_GLASSDOOR
    }

    #[instrument(level = "debug", skip(self, params), fields(query = %params.query))]
    async fn search(&self, params: &SearchParams) -> Result<Vec<Job>, SourceError> {
        let body = fetch_document(&self.client, SITE_GLASSDOOR, &search_url(params), &[]).await?;
        let mut jobs = parse_jsonld_jobs(&body, SITE_GLASSDOOR);
        jobs.extend(parse_cards(&body));
        Ok(finalize(jobs, params))
    }
}

fn search_url(params: &SearchParams) -> String {
    let mut url = format!(
        "{BASE_URL}/Job/jobs.htm?sc.keyword={}",
        urlencoding::encode(&params.query)
    );
    if !params.location.is_empty() {
        url.push_str(&format!("&locKeyword={}", urlencoding::encode(&params.location)));
    }
    if let Some(days) = params.max_age_days() {
        url.push_str(&format!("&fromAge={days}"));
    }
    url
}

fn parse_cards(body: &str) -> Vec<Job> {
    let document = Html::parse_document(body);
    select_all(document.root_element(), ".react-job-listing")
        .into_iter()
        .filter_map(|card| {
            let title = first_text(card, &[".jobLink", "[data-test='job-title']"]);
            let url = absolute_url(BASE_URL, &first_attr(card, "a.jobLink", "href"));
            if title.is_empty() || url.is_empty() {
                return None;
            }
            let location = first_text(card, &[".jobLocation", "[data-test='emp-location']"]);
            Some(Job {
                site: SITE_GLASSDOOR.to_string(),
                title,
                company: first_text(
                    card,
                    &[".jobEmployerName", ".jobEmpolyerName", "[data-test='job-link']"],
                ),
                remote: is_remote(&location, ""),
                location,
                url,
                salary: first_text(card, &[".salarySnippet"]),
                ..Job::default()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let params = SearchParams {
            query: "qa".to_string(),
            location: "NYC".to_string(),
            hours: 72,
            ..SearchParams::default()
        };
        assert_eq!(
            search_url(&params),
            "https://www.glassdoor.com/Job/jobs.htm?sc.keyword=qa&locKeyword=NYC&fromAge=3"
        );
    }

    #[test]
    fn test_parse_cards_with_fallback_selectors() {
        let body = r#"
            <li class="react-job-listing">
              <a class="jobLink" href="/partner/jobListing.htm?id=1">Data Scientist</a>
              <div class="jobEmpolyerName">Gamma</div>
              <span data-test="emp-location">Remote</span>
              <span class="salarySnippet">$120K - $150K</span>
            </li>
            <li class="react-job-listing"><span>broken</span></li>"#;
        let jobs = parse_cards(body);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "Gamma");
        assert_eq!(jobs[0].url, "https://www.glassdoor.com/partner/jobListing.htm?id=1");
        assert_eq!(jobs[0].salary, "$120K - $150K");
        assert!(jobs[0].remote);
    }
}
