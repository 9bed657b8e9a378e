//! Error types for ingestion.

use thiserror::Error;

/// Errors that can occur while reading uploads or fetching repositories.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The upload's extension has no reader.
    #[error("Unsupported file format: {extension} (supported: {})", supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<&'static str>,
    },

    /// A supported file could not be decoded.
    #[error("Error processing file: {0}")]
    Read(String),

    /// Not a recognizable GitHub repository URL.
    #[error("Invalid GitHub URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
