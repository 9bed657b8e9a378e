//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A stored JSON column could not be encoded or decoded.
    #[error("json column error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored value is outside its allowed set.
    #[error("invalid {field} value: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
