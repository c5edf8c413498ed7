use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::state::AppState;

fn sim_routes() -> Router<AppState> {
    Router::new()
        .route("/start", post(handlers::sim_start))
        .route("/stop", post(handlers::sim_stop))
        .route("/state", get(handlers::sim_state))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/stockstats", get(handlers::stock_stats))
        .route("/api/tickers", get(handlers::tickers))
        .nest("/api/sim", sim_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
}
