//! Round-robin proxy pool with per-endpoint cooldown.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

use super::NetworkError;

/// Status codes that put a proxy into cooldown.
const BAN_STATUSES: [u16; 2] = [403, 429];

#[derive(Debug)]
struct Endpoint {
    url: Url,
    banned_until: Option<Instant>,
}

impl Endpoint {
    /// Returns true while the cooldown is active; clears an expired one.
    fn is_banned(&mut self, now: Instant) -> bool {
        match self.banned_until {
            Some(until) if now < until => true,
            Some(_) => {
                self.banned_until = None;
                false
            }
            None => false,
        }
    }
}

#[derive(Debug)]
struct RotatorState {
    endpoints: Vec<Endpoint>,
    index: usize,
}

/// Hands out proxies in round-robin order, skipping those cooling down.
///
/// All state sits behind one lock, so `next` and `report` may be called
/// from any number of concurrent source tasks.
#[derive(Debug)]
pub struct ProxyRotator {
    state: Mutex<RotatorState>,
    cooldown: Duration,
}

impl ProxyRotator {
    /// Builds a rotator from raw proxy strings.
    ///
    /// Strings without a scheme are treated as `http://`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidProxy`] for a string that is not a URL.
    #[instrument(level = "debug", skip(raw), fields(count = raw.len()))]
    pub fn new<S: AsRef<str>>(raw: &[S], cooldown: Duration) -> Result<Self, NetworkError> {
        let endpoints = raw
            .iter()
            .map(|proxy| {
                parse_proxy(proxy.as_ref()).map(|url| Endpoint {
                    url,
                    banned_until: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(proxies = endpoints.len(), ?cooldown, "Proxy rotator ready");
        Ok(Self {
            state: Mutex::new(RotatorState {
                endpoints,
                index: 0,
            }),
            cooldown,
        })
    }

    /// Number of endpoints in the pool, banned or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the next endpoint that is not cooling down.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NoProxies`] when the pool is empty or after a
    /// full cycle finds every endpoint banned.
    pub fn next(&self) -> Result<Url, NetworkError> {
        let mut state = self.lock();
        let len = state.endpoints.len();
        if len == 0 {
            return Err(NetworkError::NoProxies);
        }

        let now = Instant::now();
        let start = state.index;
        loop {
            let current = state.index;
            state.index = (current + 1) % len;
            let endpoint = &mut state.endpoints[current];
            if !endpoint.is_banned(now) {
                return Ok(endpoint.url.clone());
            }
            if state.index == start {
                return Err(NetworkError::NoProxies);
            }
        }
    }

    /// Records a response status for `proxy`.
    ///
    /// Only 403 and 429 have an effect: the endpoint cools down for the
    /// configured duration starting now. Unknown proxies are ignored.
    pub fn report(&self, proxy: &Url, status: u16) {
        if !BAN_STATUSES.contains(&status) {
            return;
        }
        let until = Instant::now() + self.cooldown;
        let mut state = self.lock();
        if let Some(endpoint) = state.endpoints.iter_mut().find(|e| e.url == *proxy) {
            endpoint.banned_until = Some(until);
            warn!(proxy = %redact(proxy), status, cooldown = ?self.cooldown, "Proxy cooling down");
        }
    }

    fn lock(&self) -> MutexGuard<'_, RotatorState> {
        // A panic while holding the lock cannot leave the state torn.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Parses a proxy string, defaulting to `http://` when no scheme is given.
///
/// # Errors
///
/// Returns [`NetworkError::InvalidProxy`] when the string is not a URL with a host.
pub fn parse_proxy(raw: &str) -> Result<Url, NetworkError> {
    let trimmed = raw.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let url = Url::parse(&candidate).map_err(|e| NetworkError::invalid_proxy(raw, e))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(NetworkError::invalid_proxy(raw, "missing host"));
    }
    Ok(url)
}

/// Proxy URL with credentials removed, for logs and reports.
#[must_use]
pub fn redact(proxy: &Url) -> String {
    let mut display = proxy.clone();
    if !display.username().is_empty() || display.password().is_some() {
        let _ = display.set_username("");
        let _ = display.set_password(None);
    }
    display.to_string()
}
