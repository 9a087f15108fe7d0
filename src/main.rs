// =============================================================================
// OI Pulse — Main Entry Point
// =============================================================================
//
// Options open-interest signal engine: fetches NSE option chains per
// configured symbol, derives BUY/SELL signals with an optional weighted
// strength score, and serves the aggregate to the dashboard over HTTP.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod aggregator;
mod api;
mod app_state;
mod bse;
mod nse;
mod runtime_config;
mod signals;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::rest::CONFIG_PATH;
use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

/// Read a comma-separated symbol list from `var`, if set and non-empty.
fn symbols_from_env(var: &str) -> Option<Vec<String>> {
    let raw = std::env::var(var).ok()?;
    let symbols: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    (!symbols.is_empty()).then_some(symbols)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("OI Pulse signal engine starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Override symbol lists from env if available.
    if let Some(symbols) = symbols_from_env("OIPULSE_INDEX_SYMBOLS") {
        config.index_symbols = symbols;
    }
    if let Some(symbols) = symbols_from_env("OIPULSE_STOCK_SYMBOLS") {
        config.stock_symbols = symbols;
    }

    info!(
        index_symbols = ?config.index_symbols,
        stock_symbols = ?config.stock_symbols,
        scoring = %config.scoring,
        top_n = config.top_n,
        "Configured signal universe"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 3. Start the API server ──────────────────────────────────────────
    let bind_addr =
        std::env::var("OIPULSE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind API server on {bind_addr}: {e}"))?;

    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // ── 4. Graceful shutdown ─────────────────────────────────────────────
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("OI Pulse shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
