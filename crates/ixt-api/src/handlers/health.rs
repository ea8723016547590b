//! Health check handlers

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub version: String,
    pub name: String,
}

/// Liveness probe - basic health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
    })
}

/// Readiness response
#[derive(Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessChecks {
    /// Loaded classifier implementation
    pub classifier: String,
    /// Loaded entity recognizer implementation
    pub recognizer: String,
    /// Number of compiled pattern rules
    pub rules: usize,
    /// Categories with category-specific rules
    pub rule_categories: Vec<String>,
}

/// Readiness probe - reports the loaded adapters
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Service not ready", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let extractor = state.pipeline.extractor();

    let response = ReadinessResponse {
        ready: is_ready,
        checks: ReadinessChecks {
            classifier: state.pipeline.classifier_name().to_string(),
            recognizer: extractor.recognizer_name().to_string(),
            rules: extractor.rules().len(),
            rule_categories: extractor.rules().categories().to_vec(),
        },
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Request statistics for one endpoint
#[derive(Serialize)]
pub struct EndpointSummary {
    pub requests: u64,
    pub status_counts: BTreeMap<u16, u64>,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
}

/// JSON metrics response
#[derive(Serialize)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub requests_per_second: f64,
    pub extractions_by_category: BTreeMap<String, u64>,
    pub endpoints: BTreeMap<String, EndpointSummary>,
}

/// Service metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.uptime_secs();
    let total_requests = state.get_request_count();
    let rps = if uptime > 0 {
        total_requests as f64 / uptime as f64
    } else {
        0.0
    };

    let by_category: HashMap<String, u64> = state.category_counts.read().await.clone();
    let endpoints = state
        .metrics
        .read()
        .await
        .iter()
        .map(|(endpoint, m)| {
            let summary = EndpointSummary {
                requests: m.latency_count,
                status_counts: m.status_counts.iter().map(|(s, c)| (*s, *c)).collect(),
                avg_latency_ms: m.avg_latency_ms(),
                max_latency_ms: m.max_latency_us as f64 / 1000.0,
            };
            (endpoint.clone(), summary)
        })
        .collect();

    Json(MetricsResponse {
        uptime_seconds: uptime,
        total_requests,
        requests_per_second: rps,
        extractions_by_category: by_category.into_iter().collect(),
        endpoints,
    })
}
