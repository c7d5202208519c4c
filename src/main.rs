//! NEO Feed Proxy
//!
//! A resilient proxy for a near-Earth-object feed, built with Tokio and
//! Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────┐
//!                        │                NEO FEED PROXY               │
//!                        │                                             │
//!   GET /api/neos        │  ┌──────────┐   ┌─────────┐   ┌──────────┐ │
//!   ─────────────────────┼─▶│ security │──▶│  http   │──▶│ upstream │─┼──▶ NEO feed
//!                        │  │rate limit│   │ server  │   │ fetcher  │ │    (external)
//!                        │  └──────────┘   └────┬────┘   └────┬─────┘ │
//!                        │                      │             │       │
//!                        │                      ▼             ▼       │
//!                        │                ┌──────────┐  ┌──────────┐  │
//!                        │                │ alerting │  │ scoring  │  │
//!                        │                │ monitor  │  │          │  │
//!                        │                └──────────┘  └──────────┘  │
//!                        │                                             │
//!                        │  Cross-cutting: config, observability,      │
//!                        │  resilience (backoff/breaker), lifecycle    │
//!                        └────────────────────────────────────────────┘
//!
//!   Consumers embed client::NeoClient in front of this endpoint for
//!   caching, supersession and circuit breaking.
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neo_proxy::config::load_config;
use neo_proxy::http::HttpServer;
use neo_proxy::lifecycle::Shutdown;

/// Resilient proxy for a near-Earth-object feed.
#[derive(Debug, Parser)]
#[command(name = "neo-proxy", version)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env first, so it can feed both the EnvFilter and the overrides.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neo_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("neo-proxy v0.1.0 starting");

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    tracing::info!(
        bind_address = %config.server.bind_address,
        upstream = %config.upstream.base_url,
        api_key_present = !config.upstream.api_key.is_empty(),
        alerting_configured = !config.alerting.webhook_url.is_empty(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            neo_proxy::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
