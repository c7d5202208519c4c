//! NEO Feed Proxy Library
//!
//! A resilient proxy and client for a third-party near-Earth-object feed:
//! a server that normalizes, risk-scores and serves the feed behind
//! admission control and failure-rate alerting, and a client-side
//! orchestrator with caching, request supersession and a circuit breaker.

pub mod alerting;
pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod scoring;
pub mod security;
pub mod upstream;

pub use client::NeoClient;
pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
