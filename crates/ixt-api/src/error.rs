//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    #[schema(example = "BAD_REQUEST")]
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new("PAYLOAD_TOO_LARGE", message)
    }

    pub fn inference_timeout(timeout_ms: u64) -> Self {
        Self::new(
            "INFERENCE_TIMEOUT",
            format!("Inference did not finish within {timeout_ms} ms"),
        )
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    PayloadTooLarge(String),
    Timeout(u64),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiError::payload_too_large(msg),
            ),
            AppError::Timeout(ms) => (
                StatusCode::GATEWAY_TIMEOUT,
                ApiError::inference_timeout(ms),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::internal_error().with_details(msg),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ixt_core::IxtError> for AppError {
    fn from(err: ixt_core::IxtError) -> Self {
        use ixt_core::IxtError;

        match err {
            IxtError::Validation(msg) => AppError::BadRequest(msg),
            IxtError::Classifier(msg) => AppError::Internal(format!("Classifier error: {msg}")),
            IxtError::Recognizer(msg) => AppError::Internal(format!("Recognizer error: {msg}")),
            err @ IxtError::InvalidRule { .. } => AppError::Internal(err.to_string()),
            IxtError::Model(msg) => AppError::Internal(format!("Model error: {msg}")),
            IxtError::Config(msg) => AppError::Internal(format!("Configuration error: {msg}")),
            IxtError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
