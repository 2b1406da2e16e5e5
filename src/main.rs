// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Kinetic Gateway Service
//!
//! Accepts signed motion-event webhooks and issues attestation nonces.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and `.env` if present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8000)
//! - `WEBHOOK_SECRET`: Shared HMAC secret; empty disables verification
//! - `RATE_LIMIT_REQUESTS`: Max requests per client per window (default: 100)
//! - `RATE_LIMIT_WINDOW_SECONDS`: Window length (default: 60)
//! - `ARC_RPC_URL`, `ARC_CHAIN_ID`: Settlement chain endpoint
//! - `CORS_ORIGINS`: Comma-separated allowed origins
//! - `VERBOSE`: `true` lowers the default log level to DEBUG

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kinetic_gateway::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading anything else
    dotenvy::dotenv().ok();

    let verbose = std::env::var("VERBOSE")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        environment = %config.environment,
        chain_id = config.chain.chain_id,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        attestation_lifetime_secs = config.attestation.lifetime_secs,
        "api_gateway_starting"
    );
    if !config.secret_configured() {
        warn!("WEBHOOK_SECRET is empty; webhook signatures will NOT be verified");
    }

    let state = Arc::new(AppState::new(config.clone())?);

    // Spawn idle-client eviction task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_state.config.rate_limit.eviction_interval());
        loop {
            interval.tick().await;
            let evicted = cleanup_state.limiter.evict_idle(cleanup_state.clock.now());
            if evicted > 0 {
                debug!(evicted, "Evicted idle rate-limit windows");
            }
        }
    });

    let app = build_router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("api_gateway_shutting_down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
