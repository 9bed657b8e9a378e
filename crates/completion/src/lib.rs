//! Chat completion adapter for Learning Copilot.
//!
//! Model families disagree about which request fields they accept. This
//! crate classifies the configured model into a [`ModelProfile`], builds a
//! request body with exactly the fields that profile supports, and retries
//! once when the service asks for `max_completion_tokens` instead of
//! `max_tokens`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use completion::{ChatMessage, CompletionClient, CompletionOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CompletionClient::from_env()?;
//!     let reply = client
//!         .complete(
//!             vec![ChatMessage::user("Explain backpropagation in one line.")],
//!             CompletionOptions::new().max_tokens(200),
//!         )
//!         .await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```
//!
//! Structured calls return a [`StructuredOutcome`]; a reply that is not a
//! JSON object is reported there instead of as an error.

mod api_types;
mod client;
mod config;
mod error;
mod profile;
mod structured;

pub use api_types::{
    ChatCompletionRequest, ChatMessage, ReasoningEffort, ResponseFormat, Role, Verbosity,
};
pub use client::{CompletionClient, CompletionOptions, CompletionTransport, HttpTransport};
pub use config::{CompletionConfig, CompletionConfigBuilder, DEFAULT_MODEL, PLACEHOLDER_API_KEY};
pub use error::{CompletionError, Result};
pub use profile::{
    ModelProfile, ParameterContract, ResolvedParams, TokenLimitField, LEGACY_TOKEN_FIELD,
    OUTPUT_CEILING_FIELD,
};
pub use structured::{parse_structured, StructuredOutcome};

// Re-exported so transport implementors don't need their own dependency.
pub use async_trait::async_trait;
