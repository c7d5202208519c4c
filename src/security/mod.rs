//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client sliding-window admission control)
//!     → Pass to the handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: over-limit requests are rejected before any upstream work
//! - Clients with no identifiable address share one "unknown" bucket
//!   (documented approximation, not a bug)

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiterState};
