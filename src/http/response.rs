//! Error envelope for the serving boundary.
//!
//! Every failure path returns a structured `{code, message, ...}` JSON body
//! with a stable code, never a raw error string, and is marked
//! non-cacheable. Nothing here terminates the process.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::upstream::UpstreamError;

/// `Cache-Control` for error responses.
pub const NO_STORE: &str = "no-store";

/// `Cache-Control` for successful feed responses.
pub const SUCCESS_CACHE_CONTROL: &str = "public, s-maxage=900, stale-while-revalidate=600";

/// Serving-boundary failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("date must be YYYY-MM-DD")]
    BadRequest,

    #[error("NASA_API_KEY not configured")]
    MissingApiKey,

    #[error("Too many requests")]
    RateLimit,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest => "BAD_REQUEST",
            ApiError::MissingApiKey => "MISSING_API_KEY",
            ApiError::RateLimit => "RATE_LIMIT",
            ApiError::Upstream(e) => e.code(),
            ApiError::Internal(_) => "PROXY_INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(UpstreamError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(UpstreamError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_sec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Upstream(UpstreamError::RateLimited { retry_after_secs }) => ErrorBody {
                code: self.code(),
                message: self.to_string(),
                retry_after_sec: Some(*retry_after_secs),
                status: None,
            },
            // For rejected upstream requests the message is the body
            // excerpt, as the dashboard displays it verbatim.
            ApiError::Upstream(UpstreamError::BadRequest { status, body }) => ErrorBody {
                code: self.code(),
                message: body.clone(),
                retry_after_sec: None,
                status: Some(*status),
            },
            _ => ErrorBody {
                code: self.code(),
                message: self.to_string(),
                retry_after_sec: None,
                status: None,
            },
        };

        (
            self.status(),
            [(header::CACHE_CONTROL, NO_STORE)],
            Json(body),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_map() {
        let cases: [(ApiError, &str, StatusCode); 6] = [
            (ApiError::BadRequest, "BAD_REQUEST", StatusCode::BAD_REQUEST),
            (
                ApiError::MissingApiKey,
                "MISSING_API_KEY",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::RateLimit,
                "RATE_LIMIT",
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ApiError::Upstream(UpstreamError::Timeout),
                "UPSTREAM_TIMEOUT",
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ApiError::Upstream(UpstreamError::Failed("boom".into())),
                "UPSTREAM_ERROR",
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Upstream(UpstreamError::RateLimited {
                    retry_after_secs: 30,
                }),
                "UPSTREAM_RATE_LIMIT",
                StatusCode::TOO_MANY_REQUESTS,
            ),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status(), status);
        }
    }
}
