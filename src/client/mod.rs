//! Client-side request orchestration.
//!
//! # Data Flow
//! ```text
//! get_records(date):
//!     → circuit breaker gate (fail fast while open)
//!     → cache.rs (fresh entry → HIT + background revalidation)
//!     → orchestrator.rs network path (generation guard, cancellation,
//!       content-type validation, failure accounting)
//!     → cache update (wholesale replace, latest generation only)
//! ```
//!
//! # Design Decisions
//! - No request coalescing: a new call supersedes and cancels the
//!   previous in-flight request; superseded completions are discarded
//! - Failures degrade to serving the cached entry marked stale when one
//!   exists for the date
//! - Revalidation results are published on a broadcast channel the
//!   caller subscribes to, not a global event bus

pub mod cache;
pub mod cancel;
pub mod orchestrator;

pub use cache::FeedCache;
pub use cancel::CancelHandle;
pub use orchestrator::{ClientError, NeoClient, RevalidationEvent};

use std::time::Duration;

/// Tuning for [`NeoClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long a cache entry counts as fresh.
    pub cache_ttl: Duration,
    /// Whole-request timeout for one backend call.
    pub request_timeout: Duration,
    /// Consecutive failures that open the circuit.
    pub breaker_threshold: u32,
    /// How long the circuit stays open.
    pub breaker_cooldown: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(15 * 60),
            request_timeout: Duration::from_secs(15),
            breaker_threshold: 3,
            breaker_cooldown: Duration::from_secs(2 * 60),
        }
    }
}
