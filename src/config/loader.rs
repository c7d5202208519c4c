//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides,
/// then semantic validation.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Environment variables override file values. Secrets only live here.
fn apply_env_overrides(config: &mut ProxyConfig) {
    if let Ok(key) = env::var("NASA_API_KEY") {
        config.upstream.api_key = key;
    }
    if let Ok(url) = env::var("SLACK_WEBHOOK_URL") {
        config.alerting.webhook_url = url;
    }
    if let Ok(origins) = env::var("ALLOWED_ORIGINS") {
        config.server.allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Ok(port) = env::var("PORT") {
        if let Ok(port) = port.trim().parse::<u16>() {
            config.server.bind_address = format!("0.0.0.0:{port}");
        } else {
            tracing::warn!(port = %port, "ignoring unparseable PORT override");
        }
    }
    if let Ok(url) = env::var("NEO_FEED_URL") {
        config.upstream.base_url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        // No file, no env: the defaults must load (missing API key included).
        let config = ProxyConfig::default();
        assert!(validate_config(&config).is_ok());
        assert!(config.upstream.api_key.is_empty());
    }

    #[test]
    fn toml_sections_deserialize() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [server]
            bind_address = "127.0.0.1:9000"
            allowed_origins = ["https://dash.example.com"]

            [upstream]
            timeout_ms = 5000
            max_retries = 1

            [rate_limit]
            max_requests = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.upstream.timeout_ms, 5000);
        assert_eq!(config.upstream.max_retries, 1);
        assert_eq!(config.rate_limit.max_requests, 60);
        // Untouched sections keep defaults.
        assert_eq!(config.alerting.failure_threshold, 10);
    }
}
