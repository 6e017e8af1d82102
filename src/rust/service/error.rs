use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced to HTTP callers. Classifier failures never appear here:
/// they are absorbed into the fallback emotion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("No text provided")]
    NoText,
    #[error("Empty text after cleaning")]
    EmptyText,
    /// The cause is logged server-side and never sent to the caller
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoText | ApiError::EmptyText => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(cause) => log::error!("Error processing request: {}", cause),
            other => log::debug!("Rejected request: {}", other),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
