//! Cache-backed, circuit-breaking request orchestrator for the feed
//! endpoint.
//!
//! # Responsibilities
//! - Gate calls behind the circuit breaker
//! - Serve fresh cache entries and revalidate them in the background
//! - Guard against out-of-order completions with a generation counter
//! - Validate responses and map failures to stable codes
//! - Degrade to stale cached data when the network path fails
//!
//! # Design Decisions
//! - Each call gets its own generation; the previous in-flight request is
//!   cancelled best-effort and its completion discarded
//! - Supersession and explicit cancellation are non-fatal: they never
//!   count toward the breaker and never touch the cache

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::cache::FeedCache;
use super::cancel::CancelHandle;
use super::ClientConfig;
use crate::observability::metrics;
use crate::resilience::CircuitBreaker;
use crate::upstream::{CacheStatus, FeedResult};

/// Upper bound on the body sample attached to a content-type failure.
const SAMPLE_CHARS: usize = 120;

const REVALIDATION_CHANNEL_CAPACITY: usize = 16;

/// Published after a successful background revalidation so the
/// presentation layer can refresh without a user-initiated reload.
#[derive(Debug, Clone)]
pub struct RevalidationEvent {
    pub date: String,
    pub fresh: FeedResult,
}

/// Client-side failure.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("circuit open; retry in {retry_in_secs}s")]
    CircuitOpen { retry_in_secs: u64 },

    /// Usually means the backend route is misconfigured and something
    /// else (an HTML error page, a dev server) answered instead.
    #[error("expected JSON but received something else (status {status})")]
    BadContentType { status: u16, sample: String },

    /// Non-2xx response with a structured error body.
    #[error("{message}")]
    Http {
        code: String,
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("request timed out")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    /// A newer call for the same orchestrator superseded this one.
    #[error("response superseded by a newer request")]
    Superseded,

    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Stable code for failures that carry one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::CircuitOpen { .. } => Some("CIRCUIT_OPEN"),
            ClientError::BadContentType { .. } => Some("BAD_CONTENT_TYPE"),
            ClientError::Http { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether this failure counts toward the circuit breaker.
    fn counts_as_failure(&self) -> bool {
        !matches!(self, ClientError::Superseded | ClientError::Cancelled)
    }
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    config: ClientConfig,
    cache: FeedCache,
    breaker: CircuitBreaker,
    generations: AtomicU64,
    inflight: Mutex<Option<CancelHandle>>,
    revalidations: broadcast::Sender<RevalidationEvent>,
}

/// Orchestrator sitting between a consumer and the feed endpoint.
///
/// Cheap to clone; clones share the cache, breaker and generation state.
#[derive(Debug, Clone)]
pub struct NeoClient {
    inner: Arc<ClientInner>,
}

impl NeoClient {
    /// Create an orchestrator for `base_url` (e.g. `http://host:port/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, ClientConfig::default())
    }

    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> Self {
        let (revalidations, _) = broadcast::channel(REVALIDATION_CHANNEL_CAPACITY);
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                base_url,
                cache: FeedCache::new(config.cache_ttl),
                breaker: CircuitBreaker::new(config.breaker_threshold, config.breaker_cooldown),
                config,
                generations: AtomicU64::new(0),
                inflight: Mutex::new(None),
                revalidations,
            }),
        }
    }

    /// Subscribe to background-revalidation results.
    pub fn subscribe_revalidations(&self) -> broadcast::Receiver<RevalidationEvent> {
        self.inner.revalidations.subscribe()
    }

    /// Fetch records for a date: from cache, or over the network.
    pub async fn get_records(&self, date: &str) -> Result<FeedResult, ClientError> {
        self.get_records_inner(date, None).await
    }

    /// Like [`get_records`](Self::get_records), aborting early if `cancel`
    /// fires. Cancellation composes with the internal request timeout.
    pub async fn get_records_with_cancel(
        &self,
        date: &str,
        cancel: &CancelHandle,
    ) -> Result<FeedResult, ClientError> {
        self.get_records_inner(date, Some(cancel)).await
    }

    async fn get_records_inner(
        &self,
        date: &str,
        cancel: Option<&CancelHandle>,
    ) -> Result<FeedResult, ClientError> {
        if let Some(remaining) = self.inner.breaker.open_remaining() {
            let retry_in_secs = remaining.as_secs_f64().ceil() as u64;
            tracing::debug!(date, retry_in_secs, "circuit open, failing fast");
            return Err(ClientError::CircuitOpen { retry_in_secs });
        }

        if let Some(mut hit) = self.inner.cache.get_fresh(date) {
            hit.cache = Some(CacheStatus::Hit);
            metrics::record_cache_event("hit");
            self.spawn_revalidation(date);
            return Ok(hit);
        }

        self.refresh(date, cancel).await
    }

    /// Revalidate a served cache hit without blocking the caller.
    fn spawn_revalidation(&self, date: &str) {
        let client = self.clone();
        let date = date.to_string();
        tokio::spawn(async move {
            match client.refresh(&date, None).await {
                Ok(fresh) => {
                    let _ = client
                        .inner
                        .revalidations
                        .send(RevalidationEvent { date, fresh });
                }
                Err(err) => {
                    tracing::debug!(date = %date, error = %err, "background revalidation failed");
                }
            }
        });
    }

    /// Network path: supersede any in-flight request, fetch, validate,
    /// account failures, update the cache.
    async fn refresh(
        &self,
        date: &str,
        cancel: Option<&CancelHandle>,
    ) -> Result<FeedResult, ClientError> {
        let generation = self.inner.generations.fetch_add(1, Ordering::SeqCst) + 1;

        let own = CancelHandle::new();
        {
            let mut inflight = self.inner.inflight.lock().expect("in-flight mutex poisoned");
            if let Some(previous) = inflight.replace(own.clone()) {
                previous.cancel();
            }
        }

        let outcome = self.execute(date, generation, &own, cancel).await;

        {
            let mut inflight = self.inner.inflight.lock().expect("in-flight mutex poisoned");
            if self.is_latest(generation) {
                *inflight = None;
            }
        }

        match outcome {
            Ok(result) => {
                self.inner.breaker.record_success();
                Ok(result)
            }
            Err(err) if !err.counts_as_failure() => Err(err),
            Err(err) => {
                if self.inner.breaker.record_failure() {
                    tracing::warn!(date, error = %err, "circuit breaker opened");
                }
                if let Some(mut stale) = self.inner.cache.get_any(date) {
                    tracing::debug!(date, error = %err, "degrading to stale cached data");
                    metrics::record_cache_event("stale");
                    stale.stale = Some(true);
                    stale.error = Some(err.to_string());
                    stale.cache = Some(CacheStatus::Stale);
                    return Ok(stale);
                }
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        date: &str,
        generation: u64,
        own: &CancelHandle,
        external: Option<&CancelHandle>,
    ) -> Result<FeedResult, ClientError> {
        let request = self
            .inner
            .http
            .get(format!("{}/neos", self.inner.base_url))
            .query(&[("date", date)])
            .send();

        let response = tokio::select! {
            _ = own.cancelled() => return Err(ClientError::Superseded),
            _ = wait_external(external) => return Err(ClientError::Cancelled),
            outcome = tokio::time::timeout(self.inner.config.request_timeout, request) => {
                match outcome {
                    Err(_) => return Err(ClientError::Timeout),
                    Ok(Err(e)) => return Err(ClientError::Transport(e.to_string())),
                    Ok(Ok(response)) => response,
                }
            }
        };

        if !self.is_latest(generation) {
            return Err(ClientError::Superseded);
        }

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !content_type.contains("json") {
            let sample = response.text().await.unwrap_or_default();
            return Err(ClientError::BadContentType {
                status: status.as_u16(),
                sample: truncate_chars(&sample, SAMPLE_CHARS),
            });
        }

        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
            let code = body
                .get("code")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));
            let message = body
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            let retry_after_secs = body.get("retryAfterSec").and_then(|v| v.as_u64());
            return Err(ClientError::Http {
                code,
                message,
                retry_after_secs,
            });
        }

        let result: FeedResult = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        // Only the latest generation may touch the cache.
        if !self.is_latest(generation) {
            return Err(ClientError::Superseded);
        }

        self.inner.cache.insert(date, result.clone());
        metrics::record_cache_event("miss");
        Ok(result)
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.inner.generations.load(Ordering::SeqCst) == generation
    }

    /// Current consecutive-failure count, for diagnostics.
    pub fn consecutive_failures(&self) -> u32 {
        self.inner.breaker.consecutive_failures()
    }

    /// Number of cached dates.
    pub fn cached_dates(&self) -> usize {
        self.inner.cache.len()
    }
}

async fn wait_external(handle: Option<&CancelHandle>) {
    match handle {
        Some(handle) => handle.cancelled().await,
        None => std::future::pending().await,
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
