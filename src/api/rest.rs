// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// `/api/live_data` is the dashboard's poll target and carries the aggregate
// signal array.  The `/api/v1/` endpoints are operational: health, the
// bullish/bearish summary, the rolling timeline, runtime config, and the
// error ring.
//
// No authentication — the API is consumed by a same-host dashboard.  CORS is
// open to all origins so a dashboard served from anywhere can poll it.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::signals::MarketSummary;
use crate::types::ScoringStrategy;

/// Runtime config file path shared with startup/shutdown persistence.
pub const CONFIG_PATH: &str = "runtime_config.json";

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Dashboard feed ──────────────────────────────────────────
        .route("/api/live_data", get(live_data))
        // ── Operational ─────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/summary", get(summary))
        .route("/api/v1/timeline", get(timeline))
        .route("/api/v1/config", get(get_config))
        .route("/api/v1/config/scoring", post(set_scoring))
        .route("/api/v1/errors", get(errors))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Live data
// =============================================================================

/// Run one full aggregation cycle and return the ordered signal array.
///
/// This call never fails: per-symbol upstream errors contribute zero entries
/// and a failed SENSEX fetch contributes the null-price placeholder, so the
/// response is always a 200 with a JSON array.
async fn live_data(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let results = state.aggregator.live_data(&state).await;
    state.record_aggregation(&results);

    info!(entries = results.len(), "live data served");
    Json(results)
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "state_version": state.current_state_version(),
        "uptime_secs": state.uptime_secs(),
        "server_time": chrono::Utc::now().timestamp_millis(),
    }))
}

// =============================================================================
// Summary & timeline
// =============================================================================

/// Bullish/bearish breakdown of the most recent aggregation.
async fn summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.last_snapshot.read();
    match snapshot.as_ref() {
        Some(snap) => {
            let summary = MarketSummary::from_results(&snap.results);
            Json(serde_json::json!({
                "at": snap.at,
                "summary": summary,
            }))
            .into_response()
        }
        None => Json(serde_json::json!({
            "summary": null,
            "message": "No aggregation has run yet",
        }))
        .into_response(),
    }
}

async fn timeline(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let points = state.timeline.read().points();
    Json(points)
}

// =============================================================================
// Config
// =============================================================================

async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.runtime_config.read().clone();
    Json(config)
}

#[derive(Deserialize)]
struct ScoringUpdate {
    scoring: ScoringStrategy,
}

/// Switch the scoring strategy at runtime; persisted best-effort.
async fn set_scoring(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ScoringUpdate>,
) -> impl IntoResponse {
    let config_clone = {
        let mut config = state.runtime_config.write();
        config.scoring = update.scoring;
        config.clone()
    };

    if let Err(e) = config_clone.save(CONFIG_PATH) {
        warn!(error = %e, "failed to persist scoring change to disk");
    }

    state.increment_version();
    info!(scoring = %config_clone.scoring, "scoring strategy updated via API");

    Json(serde_json::json!({
        "scoring": config_clone.scoring,
    }))
}

// =============================================================================
// Errors
// =============================================================================

async fn errors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let errors = state.recent_errors.read().clone();
    Json(errors)
}
