//! HTTP access for collectors, with a retry-on-rate-limit decorator.
//!
//! # Architecture
//!
//! - [`FetchAsync`]: core trait, "GET this URL and give me the body"
//! - [`HttpFetcher`]: the `reqwest` implementation
//! - [`RetryFetch`]: decorator that retries rate-limited requests
//!
//! Collectors are generic over [`FetchAsync`], so tests substitute a
//! fetcher that serves canned JSON.
//!
//! # Retry Strategy
//!
//! Only rate limiting (HTTP 429) and HTTP 403 are retried; every other
//! failure is returned immediately so the caller can skip that query.
//! The delay follows:
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use crate::error::{Error, Result};
use rand::{Rng, rng};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

pub const USER_AGENT: &str = "AbsurdityIndexResearch/1.0 (Academic Research Project)";

/// Per-request timeout; a stuck request is abandoned after this.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for fetching a URL's body.
pub trait FetchAsync {
    /// Send a GET request and return the response body on HTTP success.
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(host = url.host_str().unwrap_or("")))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        let t0 = Instant::now();
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Api {
                url: redact(url),
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(body)
    }
}

/// URL without its query string, so API keys never reach the logs.
pub fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

/// Whether an error is worth retrying after a pause.
pub fn is_rate_limited(e: &Error) -> bool {
    match e {
        Error::Api { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status == StatusCode::FORBIDDEN.as_u16()
        }
        _ => false,
    }
}

/// Wrapper that adds back-off retries for rate-limited requests to any
/// [`FetchAsync`] implementation.
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T: FetchAsync> RetryFetch<T> {
    /// # Example
    ///
    /// ```ignore
    /// let fetcher = RetryFetch::new(HttpFetcher::new()?, 1, Duration::from_secs(10));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: FetchAsync> FetchAsync for RetryFetch<T> {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if is_rate_limited(&e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(attempt, max = self.max_retries, error = %e, "Still rate limited after retry");
                        return Err(e);
                    }

                    let delay = self
                        .base_delay
                        .saturating_mul(1 << (attempt - 1))
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(attempt, max = self.max_retries, ?delay, error = %e, "Rate limited; backing off");
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Standard fetcher used by the CLI: one retry after 10 seconds.
pub fn default_fetcher() -> Result<RetryFetch<HttpFetcher>> {
    Ok(RetryFetch::new(HttpFetcher::new()?, 1, Duration::from_secs(10)))
}
