//! Integration tests for seen-history files and the diff/merge engine.

use std::fs;

use jobcli_core::Job;
use jobcli_core::seen::{self, diff, merge, read_jobs, read_jobs_allow_missing, write_jobs};
use tempfile::TempDir;

fn job(site: &str, title: &str, company: &str) -> Job {
    Job::new(site, title, company)
}

#[test]
fn test_history_round_trip_preserves_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seen.json");
    let jobs = vec![
        job("indeed", "Zeta Engineer", "Zed"),
        job("linkedin", "Alpha Engineer", "Acme"),
    ];

    write_jobs(&path, &jobs).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("[\n"), "history is written pretty-printed");

    let read = read_jobs(&path).unwrap();
    assert_eq!(read, jobs);
}

#[test]
fn test_missing_and_blank_history_read_as_empty() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(read_jobs_allow_missing(&missing).unwrap().is_empty());
    assert!(read_jobs(&missing).unwrap_err().is_not_found());

    let blank = dir.path().join("blank.json");
    fs::write(&blank, "  \n\t").unwrap();
    assert!(read_jobs(&blank).unwrap().is_empty());
}

#[test]
fn test_malformed_history_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{\"title\": \"not an array\"}").unwrap();

    let err = read_jobs_allow_missing(&path).unwrap_err();
    assert!(err.to_string().contains("invalid jobs JSON"));
}

#[test]
fn test_diff_against_case_variant_history() {
    let history = vec![job("indeed", "Senior Engineer", "Acme")];
    let found = vec![
        job("linkedin", "senior engineer", "ACME"),
        job("linkedin", "Platform Engineer", "Beta"),
    ];

    let (unseen, stats) = diff(&found, &history);

    assert_eq!(unseen.len(), 1);
    assert_eq!(unseen[0].company, "Beta");
    assert_eq!(stats.unseen, 1);
}

#[test]
fn test_diff_of_history_with_itself_is_empty() {
    let history = vec![
        job("indeed", "QA", "Acme"),
        job("indeed", "SRE", "Beta"),
        job("indeed", "SRE", "Beta"),
    ];
    let (unseen, _) = diff(&history, &history);
    assert!(unseen.is_empty());
}

#[test]
fn test_merge_is_idempotent_through_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seen.json");
    write_jobs(&path, &[job("indeed", "QA", "Acme")]).unwrap();
    let input = vec![job("indeed", "qa ", "acme"), job("stepstone", "Entwickler", "GmbH")];

    let existing = read_jobs_allow_missing(&path).unwrap();
    let (first, first_stats) = merge(&existing, &input);
    write_jobs(&path, &first).unwrap();
    assert_eq!(first_stats.added, 1);

    let existing = read_jobs_allow_missing(&path).unwrap();
    let (second, second_stats) = merge(&existing, &input);
    assert_eq!(second_stats.added, 0);
    assert_eq!(second, first);
}

#[test]
fn test_keyless_jobs_are_always_unseen_and_never_merged() {
    let keyless = job("indeed", "   ", "Acme");
    assert!(seen::key(&keyless).is_none());

    let (unseen, stats) = diff(&[keyless.clone()], &[keyless.clone()]);
    assert_eq!(unseen.len(), 1);
    assert_eq!(stats.invalid_skipped(), 2);

    let (merged, stats) = merge(&[], &[keyless]);
    assert!(merged.is_empty());
    assert_eq!(stats.invalid_input, 1);
}
