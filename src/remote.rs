//! Chunk-level HTTP caller with retry and backoff.
//!
//! Every remote backend (translation, language detection, narrative
//! generation) sends its requests through [`RemoteCaller::call`].
//!
//! # Retry Strategy
//!
//! Evaluated per attempt, up to `max_retries` attempts:
//! - HTTP 429 → wait `Retry-After × (attempt + 1)` seconds, using the
//!   configured default when the header is missing or unparseable, and
//!   never longer than `max_retry_after_secs`
//! - HTTP 502 / 503 / 504 → wait `2^attempt` seconds
//! - Network error (connect, timeout) → wait `2^attempt` seconds
//! - Any other response, 2xx included → returned immediately
//!
//! When every attempt is used up the call yields
//! [`RemoteCallOutcome::Exhausted`]. It never returns an error and never
//! panics; callers fall back to their local default instead.
//!
//! Each call keeps its own backoff timer. Nothing is shared between
//! concurrent calls, so there is no client-side global quota.

use anyhow::Result;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RemoteConfig;

/// A response that ended the retry loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Result of one remote call after retries.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCallOutcome {
    /// The server gave a response the retry policy does not retry.
    Completed(RemoteResponse),
    /// Every attempt hit a retryable failure.
    Exhausted { reason: String },
}

impl RemoteCallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RemoteCallOutcome::Completed(r) if r.is_success())
    }

    /// The JSON payload of a successful response. `None` for non-2xx
    /// responses, non-JSON bodies and exhausted calls alike.
    pub fn success_json(&self) -> Option<Value> {
        match self {
            RemoteCallOutcome::Completed(r) if r.is_success() => r.json(),
            _ => None,
        }
    }

    /// Like [`success_json`](Self::success_json), but only for a plain
    /// `200 OK`.
    pub fn ok_json(&self) -> Option<Value> {
        match self {
            RemoteCallOutcome::Completed(r) if r.status == 200 => r.json(),
            _ => None,
        }
    }
}

/// How long to wait before the next attempt, or `None` when the outcome
/// is final.
///
/// `status` is `None` for a network-level failure. Rate-limit waits are
/// clamped to `max_retry_after_secs`.
pub fn retry_delay(
    status: Option<u16>,
    retry_after: Option<&str>,
    attempt: u32,
    default_retry_after_secs: u64,
    max_retry_after_secs: u64,
) -> Option<Duration> {
    let exponential = || Duration::from_secs(1u64 << attempt.min(16));
    match status {
        Some(429) => {
            let hint = retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default_retry_after_secs);
            let secs = hint
                .saturating_mul(u64::from(attempt) + 1)
                .min(max_retry_after_secs);
            Some(Duration::from_secs(secs))
        }
        Some(502..=504) => Some(exponential()),
        None => Some(exponential()),
        Some(_) => None,
    }
}

/// HTTP caller applying the retry policy above.
#[derive(Debug, Clone)]
pub struct RemoteCaller {
    client: reqwest::Client,
    max_retries: u32,
    default_retry_after_secs: u64,
    max_retry_after_secs: u64,
}

impl RemoteCaller {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
            default_retry_after_secs: config.default_retry_after_secs,
            max_retry_after_secs: config.max_retry_after_secs,
        })
    }

    /// POST `body` as JSON to `url` with the given headers.
    pub async fn call(&self, url: &str, headers: &[(&str, &str)], body: &Value) -> RemoteCallOutcome {
        let mut last_failure = String::from("no attempts made");

        for attempt in 0..self.max_retries {
            let mut request = self.client.post(url).json(body);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }

            let delay = match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let retry_after = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    match retry_delay(
                        Some(status),
                        retry_after.as_deref(),
                        attempt,
                        self.default_retry_after_secs,
                        self.max_retry_after_secs,
                    ) {
                        Some(delay) => {
                            last_failure = format!("HTTP {}", status);
                            delay
                        }
                        None => {
                            let body = response.text().await.unwrap_or_default();
                            debug!(url, status, attempt, "remote call completed");
                            return RemoteCallOutcome::Completed(RemoteResponse { status, body });
                        }
                    }
                }
                Err(e) => {
                    last_failure = e.to_string();
                    retry_delay(
                        None,
                        None,
                        attempt,
                        self.default_retry_after_secs,
                        self.max_retry_after_secs,
                    )
                    .unwrap_or_default()
                }
            };

            if attempt + 1 < self.max_retries {
                warn!(
                    url,
                    attempt,
                    reason = %last_failure,
                    delay_secs = delay.as_secs(),
                    "remote call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        warn!(url, retries = self.max_retries, reason = %last_failure, "remote call exhausted retries");
        RemoteCallOutcome::Exhausted {
            reason: last_failure,
        }
    }
}
