use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::ingest::IngestError;
use crate::inference::ModelError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Archive(String),

    #[error("Could not extract text from any resume files")]
    NoExtractableText,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedFormat { filename } => AppError::UnsupportedFormat(filename),
            IngestError::InvalidFilename(name) => {
                AppError::Validation(format!("Invalid upload filename: {name:?}"))
            }
            IngestError::Archive(e) => AppError::Archive(e.to_string()),
            e @ IngestError::Io { .. } => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::UnsupportedFormat(_) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                self.to_string(),
            ),
            AppError::Archive(msg) => (StatusCode::BAD_REQUEST, "ARCHIVE_ERROR", msg.clone()),
            AppError::NoExtractableText => (
                StatusCode::BAD_REQUEST,
                "NO_EXTRACTABLE_TEXT",
                self.to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            AppError::Model(e) => {
                tracing::error!("Model error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MODEL_ERROR",
                    "A model inference error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
