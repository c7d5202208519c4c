//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the NEO feed proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// HTTP server settings (bind address, CORS).
    pub server: ServerConfig,

    /// Upstream feed settings.
    pub upstream: UpstreamConfig,

    /// Per-client admission control.
    pub rate_limit: RateLimitConfig,

    /// Failure-rate alerting.
    pub alerting: AlertingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8787").
    pub bind_address: String,

    /// Origins allowed by CORS. Empty means permissive (development).
    pub allowed_origins: Vec<String>,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8787".to_string(),
            allowed_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

/// Upstream feed configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// API key for the feed. Empty surfaces as MISSING_API_KEY per request.
    pub api_key: String,

    /// Feed endpoint.
    pub base_url: String,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Additional attempts after the first.
    pub max_retries: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.nasa.gov/neo/rest/v1/feed".to_string(),
            timeout_ms: 10_000,
            max_retries: 2,
        }
    }
}

/// Per-client rate limiting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per client within the window.
    pub max_requests: usize,

    /// Sliding window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 120,
            window_secs: 60,
        }
    }
}

/// Failure-rate alerting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Webhook URL for alerts. Empty disables dispatch.
    pub webhook_url: String,

    /// Failures within the window that trigger an alert.
    pub failure_threshold: usize,

    /// Sliding window length in seconds.
    pub window_secs: u64,

    /// Minimum seconds between alerts.
    pub cooldown_secs: u64,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            failure_threshold: 10,
            window_secs: 300,
            cooldown_secs: 600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
