//! HTTP server setup and the feed endpoint.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (rate limit, timeout, request ID, tracing, CORS,
//!   compression, panic recovery)
//! - Validate the date parameter and the API key at the boundary
//! - Fetch, normalize and serve the feed with cache-control headers
//! - Feed every serving-path failure into the failure-rate monitor

use std::any::Any;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::alerting::{AlertChannel, FailureMonitor};
use crate::config::ProxyConfig;
use crate::http::response::{ApiError, SUCCESS_CACHE_CONTROL};
use crate::observability::metrics;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};
use crate::upstream::{CacheStatus, FeedClient, FeedResult};

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex"));

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedClient,
    pub monitor: Arc<FailureMonitor>,
    pub api_key_present: bool,
}

/// HTTP server for the feed proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, url::ParseError> {
        let channel = AlertChannel::new(Some(config.alerting.webhook_url.clone()));
        let monitor = Arc::new(FailureMonitor::new(channel, &config.alerting));
        let limiter = Arc::new(RateLimiterState::new(&config.rate_limit));
        let feed = FeedClient::from_config(&config.upstream)?;

        let state = AppState {
            feed,
            monitor: monitor.clone(),
            api_key_present: !config.upstream.api_key.is_empty(),
        };

        let router = Self::build_router(&config, state, limiter, monitor);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &ProxyConfig,
        state: AppState,
        limiter: Arc<RateLimiterState>,
        monitor: Arc<FailureMonitor>,
    ) -> Router {
        Router::new()
            .route("/api/neos", get(get_neos))
            .with_state(state)
            .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeUuidRequestId))
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.server.allowed_origins))
            .layer(CompressionLayer::new())
            .layer(CatchPanicLayer::custom(PanicHandler { monitor }))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// UUID v4 request ids for the `x-request-id` header.
#[derive(Clone, Copy)]
struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Maps panics in the serving path to PROXY_INTERNAL_ERROR and counts
/// them toward the failure-rate alert, so a bug never kills the process
/// silently.
#[derive(Clone)]
struct PanicHandler {
    monitor: Arc<FailureMonitor>,
}

impl tower_http::catch_panic::ResponseForPanic for PanicHandler {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response {
        let detail = if let Some(s) = err.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        tracing::error!(error = %detail, "panic in serving path");
        self.monitor.record_failure();
        ApiError::Internal(detail).into_response()
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        // Development posture: no ALLOWED_ORIGINS means any origin.
        CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    }
}

#[derive(Debug, Deserialize)]
struct NeosQuery {
    date: Option<String>,
}

/// `GET /api/neos?date=YYYY-MM-DD`
async fn get_neos(State(state): State<AppState>, Query(query): Query<NeosQuery>) -> Response {
    let start = Instant::now();

    let date = query.date.unwrap_or_default();
    if !DATE_RE.is_match(&date) {
        metrics::record_request(400, start);
        return ApiError::BadRequest.into_response();
    }

    if !state.api_key_present {
        metrics::record_request(500, start);
        return ApiError::MissingApiKey.into_response();
    }

    match state.feed.fetch_feed(&date).await {
        Ok(data) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            tracing::info!(
                event = "neos_fetch",
                date = %data.date,
                duration_ms,
                items = data.items.len(),
                "feed served"
            );
            metrics::record_request(200, start);

            let payload = FeedResult {
                date: data.date,
                items: data.items,
                fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                cache: Some(CacheStatus::Miss),
                stale: None,
                error: None,
            };
            (
                [(header::CACHE_CONTROL, SUCCESS_CACHE_CONTROL)],
                Json(payload),
            )
                .into_response()
        }
        Err(err) => {
            tracing::warn!(date = %date, code = err.code(), error = %err, "upstream fetch failed");
            metrics::record_upstream_failure(err.code());
            state.monitor.record_failure();

            let api_err = ApiError::Upstream(err);
            metrics::record_request(api_err.status().as_u16(), start);
            api_err.into_response()
        }
    }
}
