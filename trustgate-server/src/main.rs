//! trustgate — a paid trust-scoring service for a knowledge graph of
//! software agents, gated by x402 micropayments.
//!
//! # Environment Variables
//!
//! - `TRUSTGATE_BIND_ADDR` — listen address (default: `0.0.0.0:8787`)
//! - `TRUSTGATE_GRAPH_URL` — URL of the external graph-snapshot store
//! - `TRUSTGATE_GRAPH_KEY` — key under which the snapshot is stored (default: `agent-graph:v1`)
//! - `TRUSTGATE_FACILITATOR_URL` — base URL of the x402 payment facilitator
//! - `TRUSTGATE_PAY_TO_EVM` / `TRUSTGATE_PAY_TO_SOLANA` — pay-to addresses
//! - `TRUSTGATE_ASSET_EVM` / `TRUSTGATE_ASSET_SOLANA` — asset addresses
//! - `TRUSTGATE_FEE_PAYER_SOLANA` — Solana fee-payer address
//! - `TRUSTGATE_RATE_LIMIT_BYPASS` — comma-separated IPs exempt from rate limiting
//! - `RUST_LOG` — log level filter (default: `info`)

use tracing_subscriber::EnvFilter;

use trustgate_server::config::Config;
use trustgate_server::router;
use trustgate_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!("trustgate failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    tracing::info!(bind_addr = %config.bind_addr, graph_key = %config.graph_key, "Loaded configuration");

    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config)?;
    let app = router::build(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("trustgate listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("trustgate shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
