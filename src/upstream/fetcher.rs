//! Upstream feed fetcher.
//!
//! # Responsibilities
//! - Build the single-day date-range query against the feed
//! - Bound every attempt with a timeout
//! - Retry transient failures with jittered exponential backoff
//! - Classify failures into stable wire codes
//!
//! # Design Decisions
//! - 429 and other 4xx surface immediately, never retried
//! - 5xx, timeouts, transport and body-parse errors are retryable
//! - The surfaced code reflects the *last* failed attempt

use std::time::Duration;
use url::Url;

use super::normalize::{normalize, FeedResponse};
use super::types::FeedData;
use crate::config::UpstreamConfig;
use crate::resilience::backoff::calculate_backoff;

/// Base delay for the retry backoff schedule.
const BACKOFF_BASE_MS: u64 = 300;

/// Fallback when a 429 carries no usable `retry-after` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Upper bound on the body excerpt attached to a 4xx failure.
const BODY_EXCERPT_CHARS: usize = 500;

/// Classified upstream failure.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("upstream rejected the request with status {status}: {body}")]
    BadRequest { status: u16, body: String },

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Failed(String),
}

impl UpstreamError {
    /// Stable wire code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            UpstreamError::RateLimited { .. } => "UPSTREAM_RATE_LIMIT",
            UpstreamError::BadRequest { .. } => "BAD_UPSTREAM_REQUEST",
            UpstreamError::Timeout => "UPSTREAM_TIMEOUT",
            UpstreamError::Failed(_) => "UPSTREAM_ERROR",
        }
    }
}

/// Client for the upstream NEO feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
    max_retries: u32,
}

impl FeedClient {
    /// Build a client from the upstream configuration section.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: config.api_key.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
        })
    }

    /// Fetch and normalize the feed for a single UTC date (`YYYY-MM-DD`).
    pub async fn fetch_feed(&self, date: &str) -> Result<FeedData, UpstreamError> {
        let url = self.feed_url(date);

        let mut attempt: u32 = 0;
        let mut timed_out = false;
        let mut last_error = String::new();

        loop {
            match tokio::time::timeout(self.timeout, self.http.get(url.clone()).send()).await {
                Err(_) => {
                    timed_out = true;
                    last_error = format!("attempt timed out after {}ms", self.timeout.as_millis());
                    tracing::warn!(date, attempt, "upstream attempt timed out");
                }
                Ok(Err(e)) => {
                    timed_out = false;
                    last_error = e.to_string();
                    tracing::warn!(date, attempt, error = %e, "upstream transport error");
                }
                Ok(Ok(response)) => {
                    let status = response.status();

                    if status.as_u16() == 429 {
                        let retry_after_secs = retry_after_secs(&response);
                        tracing::warn!(date, retry_after_secs, "upstream rate limited");
                        return Err(UpstreamError::RateLimited { retry_after_secs });
                    }

                    if status.is_client_error() {
                        let body = response.text().await.unwrap_or_default();
                        tracing::warn!(date, status = status.as_u16(), "upstream rejected request");
                        return Err(UpstreamError::BadRequest {
                            status: status.as_u16(),
                            body: truncate_chars(&body, BODY_EXCERPT_CHARS),
                        });
                    }

                    if status.is_server_error() {
                        timed_out = false;
                        last_error = format!("upstream returned status {}", status.as_u16());
                        tracing::warn!(date, status = status.as_u16(), attempt, "upstream server error");
                    } else {
                        match response.json::<FeedResponse>().await {
                            Ok(feed) => {
                                let items = normalize(date, feed);
                                tracing::debug!(date, items = items.len(), "upstream fetch succeeded");
                                return Ok(FeedData {
                                    date: date.to_string(),
                                    items,
                                });
                            }
                            Err(e) => {
                                timed_out = false;
                                last_error = format!("invalid upstream body: {e}");
                                tracing::warn!(date, attempt, error = %e, "upstream body unreadable");
                            }
                        }
                    }
                }
            }

            if attempt >= self.max_retries {
                return Err(if timed_out {
                    UpstreamError::Timeout
                } else {
                    UpstreamError::Failed(last_error)
                });
            }

            let delay = calculate_backoff(attempt, BACKOFF_BASE_MS);
            tracing::debug!(date, attempt, delay_ms = delay.as_millis() as u64, "retrying after backoff");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Single-day query URL: `start_date` and `end_date` both set to `date`.
    fn feed_url(&self, date: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("start_date", date)
            .append_pair("end_date", date)
            .append_pair("api_key", &self.api_key);
        url
    }
}

fn retry_after_secs(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_url_sets_single_day_range() {
        let config = UpstreamConfig {
            api_key: "DEMO_KEY".into(),
            ..UpstreamConfig::default()
        };
        let client = FeedClient::from_config(&config).unwrap();
        let url = client.feed_url("2024-06-01");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("start_date".into(), "2024-06-01".into())));
        assert!(pairs.contains(&("end_date".into(), "2024-06-01".into())));
        assert!(pairs.contains(&("api_key".into(), "DEMO_KEY".into())));
    }

    #[test]
    fn truncation_is_char_boundary_safe() {
        let s = "é".repeat(600);
        assert_eq!(truncate_chars(&s, 500).chars().count(), 500);
    }
}
