use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::applications::repository::RepositoryError;
use crate::applications::transitions::IllegalTransition;
use crate::applications::uploader::UploadError;
use crate::applications::validation::ValidationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Duplicate application: {0}")]
    Duplicate(String),

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate { .. } => AppError::Duplicate(err.to_string()),
            RepositoryError::NotFound(_) => AppError::NotFound(err.to_string()),
            RepositoryError::AlreadyDecided { .. } => AppError::IllegalTransition(err.to_string()),
            RepositoryError::Database(e) => AppError::Database(e.to_string()),
            RepositoryError::Corrupt(e) => AppError::Internal(anyhow::anyhow!(e)),
        }
    }
}

impl From<IllegalTransition> for AppError {
    fn from(err: IllegalTransition) -> Self {
        AppError::IllegalTransition(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::Upload(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(e) => {
                field = Some(e.field());
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Duplicate(msg) => {
                (StatusCode::CONFLICT, "DUPLICATE_APPLICATION", msg.clone())
            }
            AppError::IllegalTransition(msg) => {
                (StatusCode::CONFLICT, "ILLEGAL_TRANSITION", msg.clone())
            }
            AppError::Upload(msg) => {
                tracing::error!("Upload error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPLOAD_ERROR",
                    "The resume could not be stored".to_string(),
                )
            }
            AppError::Notification(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "NOTIFICATION_ERROR",
                msg.clone(),
            ),
            AppError::Database(msg) => {
                tracing::error!("Database error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
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

        let body = match field {
            Some(field) => json!({
                "error": { "code": code, "message": message, "field": field }
            }),
            None => json!({
                "error": { "code": code, "message": message }
            }),
        };

        (status, Json(body)).into_response()
    }
}
