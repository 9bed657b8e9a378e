//! Configuration for the completion client.

use std::env;
use std::time::Duration;

use crate::api_types::{ReasoningEffort, Verbosity};
use crate::error::CompletionError;

/// Placeholder key shipped in the sample `.env`; treated as missing.
pub const PLACEHOLDER_API_KEY: &str = "your-openai-api-key-here";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

/// Configuration for [`crate::CompletionClient`].
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Completion service base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Default sampling temperature (only sent to standard models).
    pub temperature: f32,

    /// Default output-token ceiling.
    pub max_tokens: u32,

    /// Default verbosity for reasoning-tier models.
    pub verbosity: Verbosity,

    /// Default reasoning effort for reasoning-tier models.
    pub reasoning_effort: ReasoningEffort,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            verbosity: Verbosity::Medium,
            reasoning_effort: ReasoningEffort::Medium,
            timeout: Duration::from_secs(300),
        }
    }
}

impl CompletionConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `OPENAI_API_KEY` - API key (the sample placeholder counts as missing)
    ///
    /// Optional environment variables:
    /// - `OPENAI_API_URL` - API URL (default: https://api.openai.com)
    /// - `MODEL_NAME` - Model name (default: gpt-5-mini)
    /// - `TEMPERATURE` - Temperature (default: 0.7)
    /// - `MAX_TOKENS` - Output-token ceiling (default: 4000)
    /// - `COMPLETION_TIMEOUT_SECS` - HTTP timeout (default: 300)
    pub fn from_env() -> Result<Self, CompletionError> {
        let defaults = Self::default();

        let api_key = env::var("OPENAI_API_KEY").unwrap_or_default();

        let api_url = env::var("OPENAI_API_URL").unwrap_or(defaults.api_url);

        let model = env::var("MODEL_NAME").unwrap_or(defaults.model);

        let temperature = env::var("TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.temperature);

        let max_tokens = env::var("MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tokens);

        let timeout = env::var("COMPLETION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let config = Self {
            api_url,
            api_key,
            model,
            temperature,
            max_tokens,
            timeout,
            ..defaults
        };
        config.validate()?;

        Ok(config)
    }

    /// Check that a usable credential is configured.
    pub fn validate(&self) -> Result<(), CompletionError> {
        let key = self.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            return Err(CompletionError::Configuration(
                "Please set OPENAI_API_KEY in the .env file. \
                 Get your API key from: https://platform.openai.com/api-keys"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Create a new config builder.
    pub fn builder() -> CompletionConfigBuilder {
        CompletionConfigBuilder::default()
    }
}

/// Builder for CompletionConfig.
#[derive(Debug, Default)]
pub struct CompletionConfigBuilder {
    config: CompletionConfig,
}

impl CompletionConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the default temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = temp;
        self
    }

    /// Set the default output-token ceiling.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    pub fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.config.reasoning_effort = effort;
        self
    }

    /// Set the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CompletionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompletionConfig::default();

        assert_eq!(config.api_url, "https://api.openai.com");
        assert!(config.api_key.is_empty());
        assert_eq!(config.model, "gpt-5-mini");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.verbosity, Verbosity::Medium);
        assert_eq!(config.reasoning_effort, ReasoningEffort::Medium);
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_builder_all_options() {
        let config = CompletionConfig::builder()
            .api_key("my-key")
            .api_url("https://custom.api.com")
            .model("gpt-4")
            .temperature(0.2)
            .max_tokens(512)
            .verbosity(Verbosity::Low)
            .reasoning_effort(ReasoningEffort::High)
            .timeout(Duration::from_secs(10))
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.api_url, "https://custom.api.com");
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.verbosity, Verbosity::Low);
        assert_eq!(config.reasoning_effort, ReasoningEffort::High);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_validate_rejects_placeholder() {
        let config = CompletionConfig::builder()
            .api_key(PLACEHOLDER_API_KEY)
            .build();
        assert!(matches!(
            config.validate(),
            Err(CompletionError::Configuration(_))
        ));

        let config = CompletionConfig::builder().api_key("   ").build();
        assert!(config.validate().is_err());

        let config = CompletionConfig::builder().api_key("sk-real").build();
        assert!(config.validate().is_ok());
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_vars() {
            for var in [
                "OPENAI_API_KEY",
                "OPENAI_API_URL",
                "MODEL_NAME",
                "TEMPERATURE",
                "MAX_TOKENS",
                "COMPLETION_TIMEOUT_SECS",
            ] {
                std::env::remove_var(var);
            }
        }

        // Scenario 1: Missing API key should error
        clear_all_vars();
        let err = CompletionConfig::from_env().unwrap_err();
        match err {
            CompletionError::Configuration(msg) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Scenario 2: Placeholder key should error
        clear_all_vars();
        std::env::set_var("OPENAI_API_KEY", PLACEHOLDER_API_KEY);
        assert!(CompletionConfig::from_env().is_err());

        // Scenario 3: Only API key set, defaults used
        clear_all_vars();
        std::env::set_var("OPENAI_API_KEY", "test-env-key");
        let config = CompletionConfig::from_env().unwrap();
        assert_eq!(config.api_key, "test-env-key");
        assert_eq!(config.model, "gpt-5-mini");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 4000);

        // Scenario 4: All vars set, unparsable numbers fall back to defaults
        clear_all_vars();
        std::env::set_var("OPENAI_API_KEY", "full-test-key");
        std::env::set_var("OPENAI_API_URL", "https://test.api.com");
        std::env::set_var("MODEL_NAME", "gpt-4-turbo-preview");
        std::env::set_var("TEMPERATURE", "0.3");
        std::env::set_var("MAX_TOKENS", "lots");
        std::env::set_var("COMPLETION_TIMEOUT_SECS", "30");
        let config = CompletionConfig::from_env().unwrap();
        assert_eq!(config.api_url, "https://test.api.com");
        assert_eq!(config.model, "gpt-4-turbo-preview");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.timeout, Duration::from_secs(30));

        clear_all_vars();
    }
}
