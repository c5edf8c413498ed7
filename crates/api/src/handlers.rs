use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use stockflow_core::error::FlowError;
use stockflow_core::models::{SimParams, SimSnapshot};

use crate::state::AppState;

// ── Query Parameters ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub symbol: Option<String>,
}

// ── Error Mapping ───────────────────────────────────────────────────

fn error_status(err: &FlowError) -> StatusCode {
    match err {
        FlowError::MissingSymbol | FlowError::InvalidParams(_) => StatusCode::BAD_REQUEST,
        FlowError::AlreadyRunning => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &FlowError) -> (StatusCode, Json<Value>) {
    (error_status(err), Json(json!({ "error": err.to_string() })))
}

// ── Health ──────────────────────────────────────────────────────────

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": "0.1.0" }))
}

// ── Estimator ───────────────────────────────────────────────────────

/// GET /api/stockstats?symbol=AAPL
pub async fn stock_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> (StatusCode, Json<Value>) {
    let symbol = match query.symbol.as_deref() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return error_response(&FlowError::MissingSymbol),
    };

    match state.yahoo.estimate_statistics(&symbol).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(json!({
                "drift": stats.drift,
                "volatility": stats.volatility,
                "price": stats.price,
            })),
        ),
        Err(err) => {
            warn!(symbol, error = %err, "stats estimate failed");
            error_response(&err)
        }
    }
}

// ── Tickers ─────────────────────────────────────────────────────────

/// GET /api/tickers — the configured suggestion table.
pub async fn tickers(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "tickers": state.config.tickers.popular,
        "aliases": state.config.tickers.aliases,
    }))
}

// ── Simulation ──────────────────────────────────────────────────────

/// POST /api/sim/start — body is `SimParams`, omitted fields take
/// their defaults. 409 if a run is already in progress.
pub async fn sim_start(
    State(state): State<AppState>,
    Json(params): Json<SimParams>,
) -> (StatusCode, Json<Value>) {
    let mut engine = state.engine.lock().await;
    match engine.start(params) {
        Ok(()) => (StatusCode::OK, Json(json!({ "running": true }))),
        Err(err) => error_response(&err),
    }
}

/// POST /api/sim/stop — idempotent; the path is retained for display.
pub async fn sim_stop(State(state): State<AppState>) -> Json<Value> {
    let mut engine = state.engine.lock().await;
    engine.stop();
    Json(json!({ "running": false }))
}

/// GET /api/sim/state — current run snapshot.
pub async fn sim_state(State(state): State<AppState>) -> Json<SimSnapshot> {
    let engine = state.engine.lock().await;
    Json(engine.snapshot())
}
