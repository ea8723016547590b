//! API route definitions

use crate::handlers::{extract, health};
use crate::middleware::metrics_middleware;
use crate::state::AppState;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;

/// Service routes, with per-route metrics
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        // Extraction endpoint (GET kept for body-carrying legacy clients)
        .route(
            "/extract",
            get(extract::extract_get_handler).post(extract::extract_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, metrics_middleware))
}
