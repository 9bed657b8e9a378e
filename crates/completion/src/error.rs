//! Completion error types.

use thiserror::Error;

/// Errors that can occur while talking to the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Missing or placeholder credential, bad client setup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A request was built with no messages.
    #[error("completion request has no messages")]
    EmptyConversation,

    /// The request never reached the service.
    #[error("network error: {0}")]
    Network(String),

    /// The service rejected the request or failed to process it.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The service answered with a body we could not use.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    /// Whether the error is the service complaining that the legacy token
    /// field should have been the output-ceiling field.
    pub fn is_token_field_mismatch(&self) -> bool {
        let message = self.to_string();
        message.contains(crate::profile::LEGACY_TOKEN_FIELD)
            && message.contains(crate::profile::OUTPUT_CEILING_FIELD)
    }
}

/// Result type for completion operations.
pub type Result<T> = std::result::Result<T, CompletionError>;
