//! schema.org `JobPosting` extraction from embedded JSON-LD scripts.
//!
//! Postings may sit at the top level, inside arrays, under `@graph`,
//! `mainEntity`, or an `ItemList`'s `itemListElement`.

use std::collections::HashSet;

use scraper::Html;
use serde_json::Value;

use super::common::{
    SNIPPET_MAX_CHARS, clean_text, html_to_text, page_key, parse_posted_at, selector, truncate,
};
use crate::models::Job;

const JSONLD_SCRIPT: &str = r#"script[type="application/ld+json"]"#;

/// Extracts every `JobPosting` from the JSON-LD scripts of `html`.
///
/// Scripts that fail to parse are skipped. Results are deduped by URL,
/// falling back to title, company and location.
pub(crate) fn parse_jsonld_jobs(html: &str, site: &str) -> Vec<Job> {
    let document = Html::parse_document(html);
    let Some(sel) = selector(JSONLD_SCRIPT) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut jobs = Vec::new();
    for script in document.select(&sel) {
        let raw: String = script.text().collect();
        let Some(value) = decode_jsonld(&raw) else {
            continue;
        };
        let mut found = Vec::new();
        collect_jobs(&value, site, &mut found);
        for job in found {
            if seen.insert(page_key(&job)) {
                jobs.push(job);
            }
        }
    }
    jobs
}

fn decode_jsonld(raw: &str) -> Option<Value> {
    let mut raw = raw.trim();
    raw = raw.strip_prefix("<!--").unwrap_or(raw);
    raw = raw.strip_suffix("-->").unwrap_or(raw);
    let cleaned = raw.trim().replace(['\u{2028}', '\u{2029}'], "");
    if cleaned.is_empty() {
        return None;
    }
    serde_json::from_str(&cleaned).ok()
}

fn collect_jobs(value: &Value, site: &str, out: &mut Vec<Job>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_jobs(item, site, out);
            }
        }
        Value::Object(map) => {
            if has_type(value, "jobposting") {
                out.push(job_from_posting(value, site));
                return;
            }
            if has_type(value, "itemlist")
                && let Some(items) = map.get("itemListElement")
            {
                collect_jobs(items, site, out);
            }
            if has_type(value, "listitem")
                && let Some(item) = map.get("item")
            {
                collect_jobs(item, site, out);
            }
            if let Some(graph) = map.get("@graph") {
                collect_jobs(graph, site, out);
            }
            if let Some(main) = map.get("mainEntity") {
                collect_jobs(main, site, out);
            }
        }
        _ => {}
    }
}

/// Case-insensitive `@type` (or `type`) check; array types match any entry.
fn has_type(value: &Value, wanted: &str) -> bool {
    let is_wanted = |v: &Value| v.as_str().is_some_and(|t| t.trim().eq_ignore_ascii_case(wanted));
    [value.get("@type"), value.get("type")]
        .into_iter()
        .flatten()
        .any(|typ| match typ {
            Value::Array(types) => types.iter().any(is_wanted),
            other => is_wanted(other),
        })
}

fn job_from_posting(value: &Value, site: &str) -> Job {
    let title = string_value(&[value.get("title"), value.get("name")]);
    let company = string_value(&[value.get("hiringOrganization")]);
    let location = location_text(value.get("jobLocation"));
    let posted_at_raw = string_value(&[value.get("datePosted")]);
    let telecommute = value
        .get("jobLocationType")
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case("telecommute"));

    Job {
        site: site.to_string(),
        url: string_value(&[value.get("url"), value.get("@id")]),
        job_type: employment_type(value.get("employmentType")),
        salary: salary_text(value.get("baseSalary")),
        snippet: truncate(
            &html_to_text(&string_value(&[value.get("description")])),
            SNIPPET_MAX_CHARS,
        ),
        posted_at: parse_posted_at(&posted_at_raw),
        posted_at_raw,
        remote: telecommute || location.to_lowercase().contains("remote"),
        title,
        company,
        location,
        ..Job::default()
    }
}

/// First usable scalar among `values`. Objects contribute their `name`.
fn string_value(values: &[Option<&Value>]) -> String {
    for value in values.iter().flatten() {
        let text = match value {
            Value::String(s) => clean_text(s),
            Value::Number(n) => format_number(n),
            Value::Object(map) => map
                .get("name")
                .map(|name| string_value(&[Some(name)]))
                .unwrap_or_default(),
            _ => String::new(),
        };
        if !text.is_empty() {
            return text;
        }
    }
    String::new()
}

/// Integers print as-is; floats keep at most two decimals without trailing zeros.
fn format_number(number: &serde_json::Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    number.as_f64().map_or_else(String::new, |f| {
        let fixed = format!("{f:.2}");
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    })
}

fn employment_type(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| string_value(&[Some(item)]))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => string_value(&[other]),
    }
}

fn salary_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => clean_text(s),
        Some(Value::Object(map)) => {
            let amount = map.get("value");
            let field = |key: &str| amount.and_then(|a| a.get(key));
            if let Some(exact) = field("value") {
                return string_value(&[Some(exact)]);
            }
            let Some(min) = field("minValue") else {
                return String::new();
            };
            let min = string_value(&[Some(min)]);
            let max = string_value(&[field("maxValue")]);
            let currency = string_value(&[map.get("currency")]);
            let text = if max.is_empty() {
                format!("{min} {currency}")
            } else {
                format!("{min} - {max} {currency}")
            };
            text.trim().to_string()
        }
        _ => String::new(),
    }
}

fn location_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| location_text(Some(item)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Some(Value::Object(map)) => match map.get("address") {
            Some(address @ Value::Object(_)) => join_address(address),
            Some(Value::String(address)) => clean_text(address),
            _ => join_address(value.unwrap_or(&Value::Null)),
        },
        Some(Value::String(s)) => clean_text(s),
        _ => String::new(),
    }
}

fn join_address(address: &Value) -> String {
    [
        "streetAddress",
        "addressLocality",
        "addressRegion",
        "postalCode",
        "addressCountry",
    ]
    .iter()
    .map(|key| string_value(&[address.get(*key)]))
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}
