//! Classification and entity extraction handlers

use crate::error::{ApiError, AppError};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use ixt_core::{EntityMapping, Extraction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Extraction request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractRequest {
    /// Free-text customer request
    #[schema(example = "Please update my address to 123 Main Street effective next month")]
    pub text: String,
}

/// Extraction response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractResponse {
    /// Category predicted by the classifier
    #[schema(example = "address_change")]
    pub predicted_class: String,

    /// Recognizer labels map to arrays of spans, rule fields to a single string
    #[schema(value_type = Object, example = json!({
        "DATE": ["next month"],
        "effective_date": "effective next month",
        "new_address": "123 Main Street"
    }))]
    pub entities: EntityMapping,
}

impl From<Extraction> for ExtractResponse {
    fn from(extraction: Extraction) -> Self {
        Self {
            predicted_class: extraction.category,
            entities: extraction.entities,
        }
    }
}

/// Classify a request and extract its entities
#[utoipa::path(
    post,
    path = "/extract",
    tag = "extract",
    request_body = ExtractRequest,
    responses(
        (status = 200, description = "Extraction successful", body = ExtractResponse),
        (status = 400, description = "Missing or empty text", body = ApiError),
        (status = 413, description = "Body exceeds the configured limit", body = ApiError),
        (status = 500, description = "Classifier or recognizer failure", body = ApiError),
        (status = 504, description = "Inference timed out", body = ApiError)
    )
)]
pub async fn extract_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, AppError> {
    handle_extract(&state, payload).await
}

/// Same as `POST /extract`; kept for clients that send the body with GET
#[utoipa::path(
    get,
    path = "/extract",
    tag = "extract",
    request_body = ExtractRequest,
    responses(
        (status = 200, description = "Extraction successful", body = ExtractResponse),
        (status = 400, description = "Missing or empty text", body = ApiError),
        (status = 413, description = "Body exceeds the configured limit", body = ApiError),
        (status = 500, description = "Classifier or recognizer failure", body = ApiError),
        (status = 504, description = "Inference timed out", body = ApiError)
    )
)]
pub async fn extract_get_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, AppError> {
    handle_extract(&state, payload).await
}

async fn handle_extract(
    state: &Arc<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, AppError> {
    state.increment_requests();

    let Json(req) = payload.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
        _ => AppError::BadRequest(rejection.body_text()),
    })?;

    // Validate request
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty".to_string()));
    }

    let extraction = run_pipeline(state, req.text).await?;
    state.record_category(&extraction.category).await;

    tracing::info!(
        predicted_class = %extraction.category,
        entities = extraction.entities.len(),
        "extraction completed"
    );

    Ok(Json(ExtractResponse::from(extraction)))
}

/// Run classify + extract on the blocking pool, bounded by the inference timeout
async fn run_pipeline(state: &Arc<AppState>, text: String) -> Result<Extraction, AppError> {
    let pipeline = state.pipeline.clone();
    let timeout = state.inference_timeout();
    let task = tokio::task::spawn_blocking(move || pipeline.run(&text));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result.map_err(AppError::from),
        Ok(Err(join_error)) => Err(AppError::Internal(format!(
            "inference task failed: {join_error}"
        ))),
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "inference timed out");
            Err(AppError::Timeout(timeout.as_millis() as u64))
        }
    }
}
