//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (dotenvy, optional)
//!     → loader.rs (optional TOML file, then environment overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Secrets come from the environment, never the config file
//! - A missing upstream API key is NOT a load error: it surfaces
//!   per-request as MISSING_API_KEY, so the server still boots

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AlertingConfig, ObservabilityConfig, ProxyConfig, RateLimitConfig, ServerConfig,
    UpstreamConfig,
};
