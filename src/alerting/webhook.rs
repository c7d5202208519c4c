//! Outbound webhook alert channel.

use serde_json::json;

/// Channel posting `{text}` alerts to a configured webhook URL.
///
/// A missing URL makes every post a no-op, so callers never need to check
/// whether alerting is configured.
#[derive(Debug, Clone)]
pub struct AlertChannel {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl AlertChannel {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: webhook_url.filter(|u| !u.is_empty()),
        }
    }

    /// True when a webhook URL is configured.
    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Post an alert. Failures are logged and swallowed.
    pub async fn post(&self, text: &str) {
        let Some(url) = &self.webhook_url else {
            return;
        };

        match self.http.post(url).json(&json!({ "text": text })).send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::error!(status = response.status().as_u16(), "alert webhook rejected post");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "alert webhook post failed");
            }
        }
    }
}
