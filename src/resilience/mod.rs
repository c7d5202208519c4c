//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream fetch attempt fails:
//!     → backoff.rs (jittered exponential delay before the next attempt)
//!
//! Client request fails:
//!     → circuit_breaker.rs (track consecutive failures, open on threshold)
//! ```
//!
//! # Design Decisions
//! - Backoff jitter is a multiplier in [1, 2): the unjittered delay is a
//!   hard lower bound, so tests assert elapsed-time floors only
//! - The breaker counts consecutive failures; only a success closes it

pub mod backoff;
pub mod circuit_breaker;

pub use backoff::calculate_backoff;
pub use circuit_breaker::CircuitBreaker;
