//! Per-client rate limiting middleware.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// Identifier for clients with no peer address and no forwarded header.
const UNKNOWN_CLIENT: &str = "unknown";

/// State for the sliding-window rate limiter.
#[derive(Debug)]
pub struct RateLimiterState {
    windows: Mutex<HashMap<String, Vec<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
        }
    }

    /// Record a request for `key` and decide admission. The timestamp is
    /// recorded even when the request is rejected, so a sustained flood
    /// stays rejected until it actually backs off.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let window = self.window;

        let timestamps = windows.entry(key.to_string()).or_default();
        timestamps.retain(|ts| now.duration_since(*ts) < window);
        timestamps.push(now);

        timestamps.len() <= self.max_requests
    }
}

/// Resolve the client identifier: peer address, then the first
/// `x-forwarded-for` entry, then a shared "unknown" bucket.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(addr) = peer {
        return addr.ip().to_string();
    }
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware gating the feed endpoint.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    if state.check(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        metrics::record_rate_limited();
        ApiError::RateLimit.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limiter(max: usize) -> RateLimiterState {
        RateLimiterState::new(&RateLimitConfig {
            max_requests: max,
            window_secs: 60,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn admits_up_to_the_limit_then_rejects() {
        let state = limiter(120);
        for i in 1..=120 {
            assert!(state.check("10.0.0.1"), "request {} should be admitted", i);
        }
        assert!(!state.check("10.0.0.1"), "request 121 should be rejected");
        // A different identifier has its own window.
        assert!(state.check("10.0.0.2"));
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides() {
        let state = limiter(2);
        assert!(state.check("c"));
        assert!(state.check("c"));
        assert!(!state.check("c"));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(state.check("c"), "pruned window should admit again");
    }

    #[test]
    fn client_key_prefers_peer_address() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.7:4242".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer)), "192.0.2.7");
    }

    #[test]
    fn client_key_falls_back_to_forwarded_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_key(&headers, None), "203.0.113.9");

        assert_eq!(client_key(&HeaderMap::new(), None), UNKNOWN_CLIENT);
    }
}
