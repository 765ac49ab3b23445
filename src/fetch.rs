//! Page retrieval with a linear retry schedule.
//!
//! # Architecture
//!
//! - [`FetchHtml`]: core trait, "give me the markup at this URL"
//! - [`HttpFetcher`]: the reqwest-backed implementation
//! - [`RetryFetch`]: decorator adding bounded retries to any [`FetchHtml`]
//!
//! # Retry Strategy
//!
//! `retries + 1` attempts in total. After failed attempt `k` the caller
//! sleeps `backoff * k` before trying again; there is no sleep after the
//! final attempt. Nothing is shared between calls.

use crate::config::RetryPolicy;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, instrument, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("empty body from {0}")]
    EmptyBody(String),
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

/// Something that can turn a URL into page markup.
pub trait FetchHtml {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET with a fixed user agent and per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the underlying reqwest client.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Sent as the `User-Agent` header on every request
    /// * `timeout` - Whole-request timeout, connect through body
    ///
    /// # Returns
    ///
    /// The fetcher, or [`FetchError::Transport`] when the client cannot be built.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchHtml for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }
        Ok(body)
    }
}

/// Wraps a [`FetchHtml`] with the linear retry schedule of a [`RetryPolicy`].
pub struct RetryFetch<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryFetch<T>
where
    T: FetchHtml,
{
    /// # Arguments
    ///
    /// * `inner` - The fetcher each attempt goes through
    /// * `policy` - Retry count and linear backoff step
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> FetchHtml for RetryFetch<T>
where
    T: FetchHtml,
{
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let max = self.policy.max_attempts();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt >= max => {
                    error!(
                        attempt,
                        max,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        error = %e,
                        "fetch exhausted retries"
                    );
                    return Err(FetchError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(attempt, max, ?delay, error = %e, "fetch attempt failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}
