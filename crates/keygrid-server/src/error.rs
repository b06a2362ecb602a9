//! API error mapping for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keygrid_query::BatchError;
use serde_json::json;
use thiserror::Error;

/// Request-level failures. Per-query failures never surface here; they are
/// values inside the batch response.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no queries found in request")]
    EmptyBatch,

    #[error("unknown instance: {0}")]
    UnknownInstance(String),

    #[error("invalid instance settings: {0}")]
    InvalidSettings(String),
}

impl From<BatchError> for ApiError {
    fn from(error: BatchError) -> Self {
        match error {
            BatchError::EmptyBatch => ApiError::EmptyBatch,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::EmptyBatch | ApiError::InvalidSettings(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownInstance(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
