//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building one HTTP client carrying the fixed browser identity headers
//! - Per-attempt timeouts
//! - Retrying transient failures through the shared [`RetryPolicy`]
//! - Reporting the last observed error once the budget is spent

use crate::config::FetchConfig;
use crate::crawler::retry::{RetryExhausted, RetryPolicy};
use crate::HarvestError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Why a single HTTP attempt failed
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Terminal fetch failure: every attempt failed
#[derive(Debug, Error)]
#[error("Failed to fetch {url} after {attempts} attempts: {last_error}")]
pub struct FetchFailure {
    pub url: String,
    pub attempts: u32,
    pub last_error: AttemptError,
}

/// Builds an HTTP client with the configured identity headers
///
/// Every request sent through the client declares the same user agent,
/// accept and accept-language values; some sites vary markup by them.
///
/// # Example
///
/// ```no_run
/// use listing_harvest::config::FetchConfig;
/// use listing_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, USER_AGENT, "user-agent", &config.user_agent)?;
    insert_header(&mut headers, ACCEPT, "accept", &config.accept)?;
    insert_header(
        &mut headers,
        ACCEPT_LANGUAGE,
        "accept-language",
        &config.accept_language,
    )?;

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn insert_header(
    headers: &mut HeaderMap,
    header: HeaderName,
    name: &'static str,
    value: &str,
) -> Result<(), HarvestError> {
    let value = HeaderValue::from_str(value).map_err(|e| HarvestError::InvalidHeader {
        name,
        message: e.to_string(),
    })?;
    headers.insert(header, value);
    Ok(())
}

/// Fetches HTML documents with bounded retries
///
/// Constructed once per run; the underlying client keeps connections alive
/// across calls.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher from the fetch section of the configuration
    pub fn new(config: &FetchConfig) -> Result<Self, HarvestError> {
        let client = build_http_client(config)?;
        let retry = RetryPolicy::new(config.max_attempts, config.backoff);
        Ok(Self::with_client(client, retry))
    }

    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetches a URL and returns its body as text
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return body |
    /// | Any other status | Failed attempt |
    /// | Timeout / transport / body read error | Failed attempt |
    ///
    /// Failed attempts are retried after a randomized backoff until the
    /// policy's attempt budget is spent.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The response body
    /// * `Err(FetchFailure)` - Every attempt failed; carries the last error
    pub async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        self.retry
            .run(move |attempt| {
                tracing::debug!("GET {} (attempt {})", url, attempt);
                self.attempt(url)
            })
            .await
            .map_err(|RetryExhausted { attempts, last_error }| {
                tracing::warn!("Giving up on {} after {} attempts", url, attempts);
                FetchFailure {
                    url: url.to_string(),
                    attempts,
                    last_error,
                }
            })
    }

    /// Performs a single GET
    async fn attempt(&self, url: &str) -> Result<String, AttemptError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }

        Ok(response.text().await?)
    }
}
