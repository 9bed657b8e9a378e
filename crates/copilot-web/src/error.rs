//! Error types for the web interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling a request.
///
/// Upstream failures (model service, GitHub) are normally shown as a flash
/// message by the handler; these variants cover what cannot be.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A stored document could not be read.
    #[error("Invalid document: {0}")]
    Document(#[from] serde_json::Error),

    /// Missing path or module.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed form input.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(DatabaseError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::Document(err) => {
                tracing::error!("Invalid stored document: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
