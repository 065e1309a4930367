//! HTTP client shared by the source adapters.
//!
//! [`SourceClient`] layers two behaviors over `reqwest`:
//!
//! - proxy selection through an optional [`ProxyRotator`], with the response
//!   status reported back so 403/429 put the proxy into cooldown
//! - a random browser `User-Agent` on every request that does not set one
//!
//! `reqwest` fixes the proxy when a client is built, so one client is built
//! lazily per proxy and cached. All cached clients share one cookie jar.

use std::panic::{AssertUnwindSafe, catch_unwind, set_hook, take_hook};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::cookie::Jar;
use reqwest::header::USER_AGENT;
use reqwest::{Client, ClientBuilder, Proxy};
use tracing::{debug, warn};
use url::Url;

use super::rotator::redact;
use super::{NetworkError, ProxyRotator};
use crate::user_agent;

/// Per-request deadline applied by every client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Cache key for the proxy-less client.
const DIRECT_KEY: &str = "";

/// A GET request issued through [`SourceClient::fetch`].
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    pub url: String,
    /// Extra headers, applied in order.
    pub headers: Vec<(String, String)>,
    /// Bypasses the rotator. Statuses are not reported for explicit proxies.
    pub proxy: Option<Url>,
}

impl FetchRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn via_proxy(mut self, proxy: Url) -> Self {
        self.proxy = Some(proxy);
        self
    }

    fn has_user_agent(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(USER_AGENT.as_str()))
    }
}

/// Outcome of a request that produced any HTTP response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    /// Proxy the request went through, if any.
    pub proxy: Option<Url>,
}

impl FetchResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client bound to an optional proxy rotator.
#[derive(Debug, Clone)]
pub struct SourceClient {
    rotator: Option<Arc<ProxyRotator>>,
    clients: Arc<DashMap<String, Client>>,
    cookie_jar: Arc<Jar>,
    timeout: Duration,
}

impl SourceClient {
    /// Creates a client with the default timeout.
    #[must_use]
    pub fn new(rotator: Option<Arc<ProxyRotator>>) -> Self {
        Self::with_timeout(rotator, DEFAULT_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(rotator: Option<Arc<ProxyRotator>>, timeout: Duration) -> Self {
        Self {
            rotator,
            clients: Arc::new(DashMap::new()),
            cookie_jar: Arc::new(Jar::default()),
            timeout,
        }
    }

    /// Rotator this client reports to, if any.
    #[must_use]
    pub fn rotator(&self) -> Option<&Arc<ProxyRotator>> {
        self.rotator.as_ref()
    }

    /// Sends `request` and reads the whole body.
    ///
    /// Any HTTP status, including 4xx and 5xx, is returned as a response;
    /// interpreting it is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NoProxies`] when a rotator is configured and
    /// every proxy is cooling down, or a transport error.
    pub async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, NetworkError> {
        let (proxy, rotated) = match request.proxy.clone() {
            Some(explicit) => (Some(explicit), false),
            None => match &self.rotator {
                Some(rotator) => (Some(rotator.next()?), true),
                None => (None, false),
            },
        };

        let client = self.client_for(proxy.as_ref())?;
        let mut builder = client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.has_user_agent() {
            builder = builder.header(USER_AGENT, user_agent::random_browser_user_agent());
        }

        let proxy_label = proxy.as_ref().map_or_else(|| "none".to_string(), redact);
        debug!(url = %request.url, proxy = %proxy_label, "Fetching");
        let response = builder
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(&request.url, e))?;
        let status = response.status().as_u16();

        if rotated
            && let (Some(rotator), Some(used)) = (&self.rotator, &proxy)
        {
            rotator.report(used, status);
        }

        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::from_reqwest(&request.url, e))?;
        Ok(FetchResponse {
            status,
            body,
            proxy,
        })
    }

    fn client_for(&self, proxy: Option<&Url>) -> Result<Client, NetworkError> {
        let key = proxy.map_or(DIRECT_KEY, Url::as_str);
        if let Some(client) = self.clients.get(key) {
            return Ok(client.clone());
        }
        let client = build_client(proxy, Arc::clone(&self.cookie_jar), self.timeout)?;
        self.clients.insert(key.to_string(), client.clone());
        Ok(client)
    }
}

fn base_builder(cookie_jar: Arc<Jar>, timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .gzip(true)
        .cookie_provider(cookie_jar)
}

fn build_client(
    proxy: Option<&Url>,
    cookie_jar: Arc<Jar>,
    timeout: Duration,
) -> Result<Client, NetworkError> {
    if let Some(proxy) = proxy {
        let resolved = Proxy::all(proxy.as_str())
            .map_err(|e| NetworkError::invalid_proxy(redact(proxy), e))?;
        // An explicit proxy disables system proxy lookup.
        return base_builder(cookie_jar, timeout)
            .proxy(resolved)
            .build()
            .map_err(NetworkError::client_build);
    }

    let jar = Arc::clone(&cookie_jar);
    match catch_unwind_silent(AssertUnwindSafe(move || {
        base_builder(jar, timeout).build()
    })) {
        Ok(result) => result.map_err(NetworkError::client_build),
        Err(_) => {
            // Some sandboxed environments panic while reading system proxy settings.
            warn!("HTTP client builder panicked loading system proxy settings; building without");
            base_builder(cookie_jar, timeout)
                .no_proxy()
                .build()
                .map_err(NetworkError::client_build)
        }
    }
}

static CLIENT_BUILD_PANIC_HOOK_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn catch_unwind_silent<F, T>(operation: F) -> std::thread::Result<T>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    let _guard = CLIENT_BUILD_PANIC_HOOK_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let previous_hook = take_hook();
    set_hook(Box::new(|_| {}));
    let outcome = catch_unwind(operation);
    set_hook(previous_hook);
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_request_detects_user_agent_case_insensitively() {
        assert!(!FetchRequest::get("https://example.com").has_user_agent());
        assert!(
            FetchRequest::get("https://example.com")
                .header("user-agent", "custom")
                .has_user_agent()
        );
    }

    #[test]
    fn test_fetch_response_success_range() {
        let response = |status| FetchResponse {
            status,
            body: String::new(),
            proxy: None,
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(301).is_success());
        assert!(!response(429).is_success());
    }

    #[tokio::test]
    async fn test_fetch_with_exhausted_rotator_fails_before_network() {
        let rotator = Arc::new(ProxyRotator::new::<&str>(&[], DEFAULT_TIMEOUT).unwrap());
        let client = SourceClient::new(Some(rotator));
        let result = client.fetch(FetchRequest::get("http://127.0.0.1:9/")).await;
        assert!(matches!(result, Err(NetworkError::NoProxies)));
    }
}
