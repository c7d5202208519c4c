//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address/URL shapes
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - A missing API key is deliberately NOT an error (see module docs)

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::ProxyConfig;

/// One semantic problem with a loaded configuration.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "server.bind_address".into(),
            message: format!("not a valid socket address: {}", config.server.bind_address),
        });
    }

    if Url::parse(&config.upstream.base_url).is_err() {
        errors.push(ValidationError {
            field: "upstream.base_url".into(),
            message: format!("not a valid URL: {}", config.upstream.base_url),
        });
    }

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError {
            field: "upstream.timeout_ms".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError {
            field: "rate_limit.max_requests".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError {
            field: "rate_limit.window_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    if !config.alerting.webhook_url.is_empty() && Url::parse(&config.alerting.webhook_url).is_err()
    {
        errors.push(ValidationError {
            field: "alerting.webhook_url".into(),
            message: "not a valid URL".into(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address".into(),
            message: format!(
                "not a valid socket address: {}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.server.bind_address = "nonsense".into();
        config.upstream.base_url = "also nonsense".into();
        config.rate_limit.max_requests = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn empty_webhook_is_allowed() {
        let config = ProxyConfig::default();
        assert!(validate_config(&config).is_ok());
    }
}
