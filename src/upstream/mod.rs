//! Upstream feed subsystem.
//!
//! # Data Flow
//! ```text
//! fetch_feed(date):
//!     → fetcher.rs (single-day query, per-attempt timeout, bounded
//!       retries with jittered backoff, failure classification)
//!     → normalize.rs (raw feed objects → NeoRecord, risk-scored)
//!     → FeedData returned to the serving handler
//! ```
//!
//! # Design Decisions
//! - 4xx responses never retry; 5xx, timeouts and transport errors
//!   exhaust the retry budget before surfacing
//! - Classification produces stable wire codes, never raw errors

pub mod fetcher;
pub mod normalize;
pub mod types;

pub use fetcher::{FeedClient, UpstreamError};
pub use types::{CacheStatus, FeedData, FeedResult, NeoRecord};
