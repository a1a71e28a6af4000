//! API error type and HTTP mapping
//!
//! Every failure is returned as a JSON body with a single human-readable
//! `detail` string; the HTTP status code is the only machine-visible
//! discriminator. Internally the variants stay fully tagged so callers can
//! distinguish validation from upstream from extraction failures without
//! matching on message text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid field value or out-of-range input (400)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Duplicate resource, e.g. an already-registered email (400)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing user/collection/content (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Text-model or image-provider call failed (500)
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Model output contained no usable structure (500)
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<libras_common::Error> for ApiError {
    fn from(err: libras_common::Error) -> Self {
        use libras_common::Error;
        match err {
            Error::Database(e) => ApiError::Database(e),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::Validation(msg),
            Error::Upstream(msg) => ApiError::Upstream(msg),
            Error::ExtractionFailed(msg) => ApiError::ExtractionFailed(msg),
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(msg) | ApiError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::ExtractionFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Database(ref err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
