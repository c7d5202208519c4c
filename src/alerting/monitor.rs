//! Failure-rate monitoring.
//!
//! # Responsibilities
//! - Track serving-path failures in a sliding window
//! - Dispatch one alert when failures cluster, then hold a cooldown
//!
//! # Design Decisions
//! - The window is pruned on every observation, never on a timer
//! - Dispatch is spawned so the serving path never waits on the webhook
//! - Uses the tokio clock so tests can pause and advance time

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use super::webhook::AlertChannel;
use crate::config::AlertingConfig;

#[derive(Debug)]
struct MonitorState {
    failures: Vec<Instant>,
    last_alert: Option<Instant>,
}

/// Sliding-window failure counter with rate-limited alerting.
#[derive(Debug)]
pub struct FailureMonitor {
    channel: AlertChannel,
    threshold: usize,
    window: Duration,
    cooldown: Duration,
    state: Mutex<MonitorState>,
}

impl FailureMonitor {
    pub fn new(channel: AlertChannel, config: &AlertingConfig) -> Self {
        Self {
            channel,
            threshold: config.failure_threshold,
            window: Duration::from_secs(config.window_secs),
            cooldown: Duration::from_secs(config.cooldown_secs),
            state: Mutex::new(MonitorState {
                failures: Vec::new(),
                last_alert: None,
            }),
        }
    }

    /// Record one serving-path failure. Returns true if this observation
    /// dispatched an alert.
    pub fn record_failure(&self) -> bool {
        let count = {
            let now = Instant::now();
            let mut state = self.state.lock().expect("failure monitor mutex poisoned");

            state.failures.push(now);
            let horizon = self.window;
            state.failures.retain(|ts| now.duration_since(*ts) < horizon);

            let in_cooldown = state
                .last_alert
                .is_some_and(|at| now.duration_since(at) <= self.cooldown);
            if state.failures.len() < self.threshold || in_cooldown {
                return false;
            }

            state.last_alert = Some(now);
            state.failures.len()
        };

        tracing::warn!(count, "failure rate threshold crossed, alerting");
        let channel = self.channel.clone();
        tokio::spawn(async move {
            channel
                .post(&format!(
                    "NEO API proxy: High failure rate: {count} errors in last 5 min."
                ))
                .await;
        });
        true
    }

    /// Number of failures currently inside the window.
    pub fn window_len(&self) -> usize {
        let now = Instant::now();
        let state = self.state.lock().expect("failure monitor mutex poisoned");
        state
            .failures
            .iter()
            .filter(|ts| now.duration_since(**ts) < self.window)
            .count()
    }
}
