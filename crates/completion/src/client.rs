//! Completion client and HTTP transport.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ReasoningEffort,
    Verbosity,
};
use crate::config::CompletionConfig;
use crate::error::{CompletionError, Result};
use crate::profile::{ModelProfile, ResolvedParams};
use crate::structured::{parse_structured, StructuredOutcome};

/// Sends one request body to the completion service and returns the
/// assistant's text.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(&self, request: &ChatCompletionRequest) -> Result<String>;
}

/// Transport backed by an OpenAI-compatible HTTP endpoint.
pub struct HttpTransport {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                CompletionError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(&self, request: &ChatCompletionRequest) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.api_url);

        debug!("Sending completion request for model {}", request.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(CompletionError::Upstream(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(CompletionError::Upstream(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            CompletionError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        if let Some(usage) = &completion.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::InvalidResponse("No content in response".to_string()))
    }
}

/// Per-call overrides of the configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub structured: bool,
    pub verbosity: Option<Verbosity>,
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl CompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a JSON object response.
    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = Some(verbosity);
        self
    }

    pub fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    fn resolve(&self, config: &CompletionConfig) -> ResolvedParams {
        ResolvedParams {
            temperature: self.temperature.unwrap_or(config.temperature),
            max_tokens: self.max_tokens.unwrap_or(config.max_tokens),
            structured: self.structured,
            verbosity: self.verbosity.unwrap_or(config.verbosity),
            reasoning_effort: self.reasoning_effort.unwrap_or(config.reasoning_effort),
        }
    }
}

/// Chat completion client that adapts each request to the model family.
///
/// Stateless apart from its configuration; safe to share behind an `Arc`.
pub struct CompletionClient {
    config: CompletionConfig,
    transport: Box<dyn CompletionTransport>,
}

impl CompletionClient {
    /// Create a client that talks HTTP to the configured endpoint.
    pub fn new(config: CompletionConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;

        info!(
            "Completion client initialized with model: {} ({:?})",
            config.model,
            ModelProfile::classify(&config.model)
        );

        Ok(Self {
            config,
            transport: Box::new(transport),
        })
    }

    /// Create a client from environment variables.
    ///
    /// See [`CompletionConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self> {
        Self::new(CompletionConfig::from_env()?)
    }

    /// Create a client over a custom transport.
    pub fn with_transport(config: CompletionConfig, transport: Box<dyn CompletionTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Profile of the configured model.
    pub fn profile(&self) -> ModelProfile {
        ModelProfile::classify(&self.config.model)
    }

    /// Build the request body `complete` would send first.
    pub fn build_request(
        &self,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> ChatCompletionRequest {
        let params = options.resolve(&self.config);
        self.profile()
            .build_request(&self.config.model, messages, &params)
    }

    /// Run one completion and return the assistant's text.
    ///
    /// If the service rejects the legacy `max_tokens` field, the request is
    /// resent once with the limit moved to `max_completion_tokens`.
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<String> {
        if messages.is_empty() {
            return Err(CompletionError::EmptyConversation);
        }

        let mut request = self.build_request(messages, &options);

        match self.transport.send(&request).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_token_field_mismatch() && request.rename_legacy_token_field() => {
                warn!(
                    "Model {} rejected max_tokens, retrying with max_completion_tokens",
                    request.model
                );
                self.transport.send(&request).await
            }
            Err(e) => {
                warn!("Completion request failed: {}", e);
                Err(e)
            }
        }
    }

    /// Run a completion that asks for a JSON object and decode it.
    ///
    /// Transport errors propagate; unparsable text is reported in the
    /// returned outcome.
    pub async fn complete_structured(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
        kind: &str,
    ) -> Result<StructuredOutcome> {
        let text = self.complete(messages, options.structured()).await?;
        Ok(parse_structured(&text, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: &str) -> CompletionConfig {
        CompletionConfig::builder()
            .api_key("test-key")
            .model(model)
            .temperature(0.5)
            .max_tokens(1000)
            .build()
    }

    #[test]
    fn test_options_resolve_defaults() {
        let params = CompletionOptions::new().resolve(&config("gpt-4"));
        assert_eq!(params.temperature, 0.5);
        assert_eq!(params.max_tokens, 1000);
        assert!(!params.structured);
        assert_eq!(params.verbosity, Verbosity::Medium);
        assert_eq!(params.reasoning_effort, ReasoningEffort::Medium);
    }

    #[test]
    fn test_options_resolve_overrides() {
        let params = CompletionOptions::new()
            .temperature(0.1)
            .max_tokens(200)
            .structured()
            .verbosity(Verbosity::High)
            .reasoning_effort(ReasoningEffort::High)
            .resolve(&config("gpt-4"));
        assert_eq!(params.temperature, 0.1);
        assert_eq!(params.max_tokens, 200);
        assert!(params.structured);
        assert_eq!(params.verbosity, Verbosity::High);
        assert_eq!(params.reasoning_effort, ReasoningEffort::High);
    }

    #[test]
    fn test_new_rejects_placeholder_key() {
        let config = CompletionConfig::builder()
            .api_key(crate::config::PLACEHOLDER_API_KEY)
            .build();
        assert!(matches!(
            CompletionClient::new(config),
            Err(CompletionError::Configuration(_))
        ));
    }

    #[test]
    fn test_http_transport_trims_trailing_slash() {
        let config = CompletionConfig::builder()
            .api_key("k")
            .api_url("https://api.example.com/")
            .build();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.api_url, "https://api.example.com");
    }
}
