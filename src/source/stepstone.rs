//! Stepstone Germany, paging through slug-style search URLs.

use std::collections::HashSet;

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use tracing::instrument;

use super::common::{
    absolute_url, clean_text, dedupe_jobs, element_text, fetch_document, is_remote, select_all,
};
use super::jsonld::parse_jsonld_jobs;
use super::{SITE_STEPSTONE, Source, SourceError};
use crate::models::{Job, SearchParams};
use crate::network::SourceClient;

const BASE_URL: &str = "https://www.stepstone.de";
const PAGE_SIZE: usize = 25;
/// Upper bound on pages per search when no limit stops paging earlier.
const MAX_PAGES: usize = 20;
const ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7";
const LISTING_LINK: &str = "a[href*='stellenangebote--']";
/// Card lines at least this long are preferred as the snippet.
const SNIPPET_MIN_CHARS: usize = 30;

#[derive(Debug, Clone)]
pub struct StepstoneSource {
    client: SourceClient,
}

impl StepstoneSource {
    #[must_use]
    pub fn new(client: SourceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Source for StepstoneSource {
    fn name(&self) -> &str {
        SITE_STEPSTONE
    }

    #[instrument(level = "debug", skip(self, params), fields(query = %params.query))]
    async fn search(&self, params: &SearchParams) -> Result<Vec<Job>, SourceError> {
        let mut jobs = Vec::new();
        let mut seen = HashSet::new();
        let mut page = page_from_offset(params.offset);
        let mut skip = params.offset % PAGE_SIZE;

        for _ in 0..MAX_PAGES {
            if params.limit > 0 && jobs.len() >= params.limit {
                break;
            }
            let body = fetch_document(
                &self.client,
                SITE_STEPSTONE,
                &search_url(params, page),
                &[("accept-language", ACCEPT_LANGUAGE)],
            )
            .await?;
            let page_jobs = parse_page(&body);
            if page_jobs.is_empty() {
                break;
            }

            let mut added = 0;
            for job in page_jobs {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                if (params.remote && !job.remote)
                    || job.url.is_empty()
                    || !seen.insert(job.url.clone())
                {
                    continue;
                }
                jobs.push(job);
                added += 1;
                if params.limit > 0 && jobs.len() >= params.limit {
                    break;
                }
            }
            if added == 0 {
                break;
            }
            page += 1;
        }

        Ok(jobs)
    }
}

fn page_from_offset(offset: usize) -> usize {
    offset / PAGE_SIZE + 1
}

/// Lowercase letters and digits, with one dash between runs of anything else.
fn slug(value: &str) -> String {
    let mut out = String::new();
    let mut last_dash = false;
    for c in value.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

fn search_url(params: &SearchParams, page: usize) -> String {
    let mut query = slug(&params.query);
    if query.is_empty() {
        query = params.query.trim().to_lowercase();
    }
    let mut url = format!("{BASE_URL}/jobs/{}", urlencoding::encode(&query));
    let location = slug(&params.location);
    if !location.is_empty() {
        url.push_str(&format!("/in-{}", urlencoding::encode(&location)));
    }
    if page > 1 {
        url.push_str(&format!("?page={page}"));
    }
    url
}

fn parse_page(body: &str) -> Vec<Job> {
    let mut jobs = parse_jsonld_jobs(body, SITE_STEPSTONE);
    jobs.extend(parse_cards(body));
    dedupe_jobs(jobs)
}

fn parse_cards(body: &str) -> Vec<Job> {
    let document = Html::parse_document(body);
    let mut seen = HashSet::new();
    let mut jobs = Vec::new();

    for anchor in select_all(document.root_element(), LISTING_LINK) {
        let href = anchor.value().attr("href").unwrap_or_default();
        let url = absolute_url(BASE_URL, href);
        let title = element_text(anchor);
        if url.is_empty() || title.is_empty() || seen.contains(&url) {
            continue;
        }
        let card = card_for(anchor);
        let fields = parse_card(card, &title);
        seen.insert(url.clone());
        jobs.push(Job {
            site: SITE_STEPSTONE.to_string(),
            remote: fields.remote || is_remote(&fields.location, &fields.snippet),
            title,
            company: fields.company,
            location: fields.location,
            url,
            snippet: fields.snippet,
            posted_at_raw: fields.posted,
            ..Job::default()
        });
    }
    jobs
}

/// Nearest enclosing card element for a listing link.
fn card_for(anchor: ElementRef<'_>) -> ElementRef<'_> {
    let ancestors: Vec<ElementRef<'_>> = anchor.ancestors().filter_map(ElementRef::wrap).collect();
    ["article", "li", "section", "div"]
        .iter()
        .find_map(|tag| {
            ancestors
                .iter()
                .find(|el| el.value().name() == *tag)
                .copied()
        })
        .or_else(|| ancestors.first().copied())
        .unwrap_or(anchor)
}

#[derive(Debug, Default)]
struct CardFields {
    company: String,
    location: String,
    snippet: String,
    posted: String,
    remote: bool,
}

/// Reads company, location and snippet from a card's text lines by position,
/// skipping badges, remote markers and relative dates.
fn parse_card(card: ElementRef<'_>, title: &str) -> CardFields {
    let lines = card_lines(card, title);
    let remote = lines.iter().any(|line| is_remote_line(line));

    let candidates: Vec<&String> = lines
        .iter()
        .filter(|line| !is_noise_line(line) && !is_remote_line(line) && !is_posted_line(line))
        .collect();

    let company = candidates.first().map(|s| (*s).clone()).unwrap_or_default();
    let location = candidates.get(1).map(|s| (*s).clone()).unwrap_or_default();
    let snippet = candidates
        .iter()
        .skip(2)
        .find(|line| line.chars().count() >= SNIPPET_MIN_CHARS)
        .or_else(|| candidates.get(2))
        .map(|s| (*s).clone())
        .unwrap_or_default();

    let mut posted = select_all(card, "time")
        .first()
        .map(|time| {
            let datetime = clean_text(time.value().attr("datetime").unwrap_or_default());
            if datetime.is_empty() { element_text(*time) } else { datetime }
        })
        .unwrap_or_default();
    if posted.is_empty() {
        posted = lines
            .iter()
            .find(|line| is_posted_line(line))
            .cloned()
            .unwrap_or_default();
    }

    CardFields {
        company,
        location,
        snippet,
        posted,
        remote,
    }
}

fn card_lines(card: ElementRef<'_>, title: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    card.text()
        .flat_map(|text| text.split('\n'))
        .map(clean_text)
        .filter(|line| !line.is_empty() && line != title && seen.insert(line.clone()))
        .collect()
}

fn is_remote_line(line: &str) -> bool {
    let value = line.to_lowercase();
    value.contains("home-office") || value.contains("homeoffice") || value.contains("remote")
}

fn is_posted_line(line: &str) -> bool {
    let value = line.to_lowercase();
    value.starts_with("vor ") || value == "heute" || value == "gestern"
}

fn is_noise_line(line: &str) -> bool {
    let value = line.to_lowercase();
    matches!(value.as_str(), "gehalt" | "mehr" | "neu" | "top-job")
        || value.contains("gehalt anzeigen")
        || value.contains("schnelle bewerbung")
        || value.contains("anschreiben nicht erforderlich")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("  Senior Rust / C++ Developer "), "senior-rust-c-developer");
        assert_eq!(slug("Köln"), "köln");
        assert_eq!(slug("---"), "");
    }

    #[test]
    fn test_search_url() {
        let params = SearchParams {
            query: "Data Engineer".to_string(),
            location: "Frankfurt am Main".to_string(),
            ..SearchParams::default()
        };
        assert_eq!(
            search_url(&params, 1),
            "https://www.stepstone.de/jobs/data-engineer/in-frankfurt-am-main"
        );
        assert_eq!(
            search_url(&params, 3),
            "https://www.stepstone.de/jobs/data-engineer/in-frankfurt-am-main?page=3"
        );
    }

    #[test]
    fn test_search_url_encodes_non_ascii_slug() {
        let params = SearchParams {
            query: "Entwickler".to_string(),
            location: "Köln".to_string(),
            ..SearchParams::default()
        };
        assert_eq!(
            search_url(&params, 1),
            "https://www.stepstone.de/jobs/entwickler/in-k%C3%B6ln"
        );
    }

    #[test]
    fn test_page_from_offset() {
        assert_eq!(page_from_offset(0), 1);
        assert_eq!(page_from_offset(24), 1);
        assert_eq!(page_from_offset(25), 2);
    }

    #[test]
    fn test_parse_cards_reads_lines_by_position() {
        let body = r#"
            <article>
              <a href="/stellenangebote--Backend-Entwickler-Berlin-Acme--123-inline.html">Backend Entwickler (m/w/d)</a>
              <span>Top-Job</span>
              <span>Acme GmbH</span>
              <span>Berlin</span>
              <span>Teilweise Home-Office</span>
              <span>kurz</span>
              <span>Wir suchen Verstärkung für unser Plattform-Team in Berlin.</span>
              <span>vor 2 Tagen</span>
              <span>Gehalt anzeigen</span>
            </article>"#;
        let jobs = parse_cards(body);
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.title, "Backend Entwickler (m/w/d)");
        assert_eq!(job.company, "Acme GmbH");
        assert_eq!(job.location, "Berlin");
        assert_eq!(job.snippet, "Wir suchen Verstärkung für unser Plattform-Team in Berlin.");
        assert_eq!(job.posted_at_raw, "vor 2 Tagen");
        assert!(job.remote);
        assert_eq!(
            job.url,
            "https://www.stepstone.de/stellenangebote--Backend-Entwickler-Berlin-Acme--123-inline.html"
        );
    }

    #[test]
    fn test_parse_cards_prefers_time_element() {
        let body = r#"
            <li>
              <a href="https://www.stepstone.de/stellenangebote--QA--9.html">QA Engineer</a>
              <div>Beta AG</div>
              <time datetime="2024-06-01T08:00:00Z">heute</time>
            </li>"#;
        let jobs = parse_cards(body);
        assert_eq!(jobs[0].posted_at_raw, "2024-06-01T08:00:00Z");
        assert_eq!(jobs[0].company, "Beta AG");
        assert!(!jobs[0].remote);
    }
}
