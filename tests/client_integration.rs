//! Integration tests for the source HTTP client against mock servers.

use std::sync::Arc;
use std::time::Duration;

use jobcli_core::network::{FetchRequest, NetworkError, ProxyRotator, SourceClient};
use jobcli_core::user_agent::BROWSER_USER_AGENTS;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_sends_browser_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let client = SourceClient::new(None);
    let response = client
        .fetch(FetchRequest::get(format!("{}/jobs", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "<html></html>");
    assert!(response.proxy.is_none());

    let requests = mock_server.received_requests().await.unwrap();
    let ua = requests[0]
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(BROWSER_USER_AGENTS.contains(&ua), "unexpected user agent {ua}");
}

#[tokio::test]
async fn test_fetch_keeps_explicit_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "jobcli-test"))
        .and(header("accept-language", "de-DE"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = SourceClient::new(None);
    let response = client
        .fetch(
            FetchRequest::get(mock_server.uri())
                .header("User-Agent", "jobcli-test")
                .header("Accept-Language", "de-DE"),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_error_statuses_are_returned_not_raised() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&mock_server)
        .await;

    let client = SourceClient::new(None);
    let response = client
        .fetch(FetchRequest::get(mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_timeout_surfaces_as_network_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let client = SourceClient::with_timeout(None, Duration::from_millis(200));
    let err = client
        .fetch(FetchRequest::get(mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NetworkError::Timeout { .. } | NetworkError::Request { .. }
    ));
}

#[tokio::test]
async fn test_rate_limited_proxy_is_skipped_until_cooldown() {
    // The mock server plays the proxy; every request through it is throttled.
    let proxy_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&proxy_server)
        .await;

    let rotator = Arc::new(ProxyRotator::new(&[proxy_server.uri()], Duration::from_secs(600)).unwrap());
    let client = SourceClient::new(Some(Arc::clone(&rotator)));

    let response = client
        .fetch(FetchRequest::get("http://jobs.invalid/search"))
        .await
        .unwrap();
    assert_eq!(response.status, 429);
    assert!(response.proxy.is_some());

    let err = client
        .fetch(FetchRequest::get("http://jobs.invalid/search"))
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkError::NoProxies));
    assert_eq!(err.to_string(), "no proxies available");
}
