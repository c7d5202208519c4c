//! Alerting subsystem.
//!
//! # Data Flow
//! ```text
//! Serving-path failure:
//!     → monitor.rs (append to sliding window, prune, threshold check)
//!     → webhook.rs (rate-limited alert POST, fire-and-forget)
//! ```
//!
//! # Design Decisions
//! - Alert dispatch never affects request serving: it runs detached and
//!   swallows its own errors
//! - One alert per cooldown period, however large the burst

pub mod monitor;
pub mod webhook;

pub use monitor::FailureMonitor;
pub use webhook::AlertChannel;
