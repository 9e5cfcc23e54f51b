//! Single upstream GET with bounded retries and exponential backoff.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::redact;
use crate::http_client::{HttpClient, HttpRequest};
use crate::rate_limit;
use crate::retry::RetryConfig;
use crate::FetchError;

/// Outcome of one attempt, before retry policy is applied.
enum Attempt {
    Payload(Value),
    Limited,
    Failed(String),
}

/// Fetches and decodes one JSON document, retrying throttled and failed attempts.
///
/// The backoff sleep only suspends the calling task.
#[derive(Clone)]
pub struct BackoffFetcher {
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    timeout_ms: u64,
}

impl BackoffFetcher {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryConfig) -> Self {
        Self {
            http_client,
            retry,
            timeout_ms: 10_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn retry(&self) -> RetryConfig {
        self.retry
    }

    pub async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.fetch_with(url, self.retry).await
    }

    /// Issues up to `retry.max_attempts` requests (at least one), sleeping
    /// `delay_for_attempt(i)` after failed attempt `i`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RateLimited`] when the final attempt was throttled
    /// - [`FetchError::NetworkFailure`] when the final attempt failed in transport or decoding
    pub async fn fetch_with(&self, url: &str, retry: RetryConfig) -> Result<Value, FetchError> {
        let max_attempts = retry.max_attempts.max(1);
        let redacted = redact(url);

        for attempt in 0..max_attempts {
            let is_last = attempt + 1 == max_attempts;
            debug!(url = %redacted, attempt = attempt + 1, max_attempts, "fetching");

            match self.attempt(url).await {
                Attempt::Payload(payload) => return Ok(payload),
                Attempt::Limited if is_last => {
                    warn!(url = %redacted, attempts = max_attempts, "rate limit persisted through all attempts");
                    return Err(FetchError::RateLimited {
                        attempts: max_attempts,
                    });
                }
                Attempt::Failed(message) if is_last => {
                    warn!(url = %redacted, attempts = max_attempts, %message, "fetch failed on final attempt");
                    return Err(FetchError::NetworkFailure {
                        attempts: max_attempts,
                        message,
                    });
                }
                Attempt::Limited => {
                    debug!(url = %redacted, attempt = attempt + 1, "rate limited, backing off");
                }
                Attempt::Failed(message) => {
                    debug!(url = %redacted, attempt = attempt + 1, %message, "attempt failed, backing off");
                }
            }

            tokio::time::sleep(retry.delay_for_attempt(attempt)).await;
        }

        Err(FetchError::NetworkFailure {
            attempts: max_attempts,
            message: String::from("failed to fetch data after retries"),
        })
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(error) => return Attempt::Failed(error.message().to_owned()),
        };

        if !response.is_success() {
            return Attempt::Failed(format!("upstream returned status {}", response.status));
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(payload) if rate_limit::is_limited(&payload) => {
                debug!(notice = rate_limit::diagnostic(&payload).unwrap_or_default(), "upstream throttled the request");
                Attempt::Limited
            }
            Ok(payload) => Attempt::Payload(payload),
            Err(error) => Attempt::Failed(format!("failed to decode response: {error}")),
        }
    }
}
