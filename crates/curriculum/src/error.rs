//! Curriculum error types.

use completion::CompletionError;
use thiserror::Error;

/// Errors that can occur during curriculum operations.
#[derive(Debug, Error)]
pub enum CurriculumError {
    /// The completion service call failed.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// A module id was not found in the curriculum.
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Stored curriculum JSON does not have the expected shape.
    #[error("Invalid curriculum document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

/// Result type for curriculum operations.
pub type Result<T> = std::result::Result<T, CurriculumError>;
