//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/neos?date=YYYY-MM-DD
//!     → security::rate_limit (admission control)
//!     → server.rs (validate date, check API key, fetch upstream)
//!     → response.rs (typed error envelope, cache-control headers)
//! ```

pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::HttpServer;
