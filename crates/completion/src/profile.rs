//! Model-family parameter dialects.
//!
//! Different model families reject parameters outside their supported set.
//! [`ModelProfile`] classifies the configured model identifier once per
//! request and decides which fields the request body carries:
//!
//! | Profile | Prefix | `temperature` | Token field | Extra fields |
//! |---|---|---|---|---|
//! | `ReasoningTier` | `gpt-5` | omitted | `max_completion_tokens` | `verbosity`, `reasoning_effort` |
//! | `AlternateReasoning` | `o1` | omitted | `max_completion_tokens` | none |
//! | `Standard` | anything else | sent | `max_tokens` | none |

use crate::api_types::{
    ChatCompletionRequest, ChatMessage, ReasoningEffort, ResponseFormat, Verbosity,
};

/// Name of the legacy token-limit field.
pub const LEGACY_TOKEN_FIELD: &str = "max_tokens";

/// Name of the output-ceiling token field.
pub const OUTPUT_CEILING_FIELD: &str = "max_completion_tokens";

/// Parameter dialect of a model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProfile {
    /// Reasoning models with verbosity and effort controls.
    ReasoningTier,
    /// Older reasoning models without extra controls.
    AlternateReasoning,
    /// Everything else: classic sampling parameters.
    Standard,
}

/// Which field carries the token limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimitField {
    Legacy,
    OutputCeiling,
}

impl TokenLimitField {
    pub fn name(&self) -> &'static str {
        match self {
            TokenLimitField::Legacy => LEGACY_TOKEN_FIELD,
            TokenLimitField::OutputCeiling => OUTPUT_CEILING_FIELD,
        }
    }
}

/// The parameter contract of one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterContract {
    pub sends_temperature: bool,
    pub token_field: TokenLimitField,
    pub sends_reasoning_controls: bool,
}

/// Fully resolved sampling parameters for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub structured: bool,
    pub verbosity: Verbosity,
    pub reasoning_effort: ReasoningEffort,
}

impl ModelProfile {
    /// Prefix table, checked in order. Unmatched ids are `Standard`.
    pub const PREFIXES: &'static [(&'static str, ModelProfile)] = &[
        ("gpt-5", ModelProfile::ReasoningTier),
        ("o1", ModelProfile::AlternateReasoning),
    ];

    /// Classify a model identifier.
    pub fn classify(model: &str) -> Self {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
            .map(|(_, profile)| *profile)
            .unwrap_or(ModelProfile::Standard)
    }

    /// The parameter contract for this profile.
    pub fn contract(&self) -> ParameterContract {
        match self {
            ModelProfile::ReasoningTier => ParameterContract {
                sends_temperature: false,
                token_field: TokenLimitField::OutputCeiling,
                sends_reasoning_controls: true,
            },
            ModelProfile::AlternateReasoning => ParameterContract {
                sends_temperature: false,
                token_field: TokenLimitField::OutputCeiling,
                sends_reasoning_controls: false,
            },
            ModelProfile::Standard => ParameterContract {
                sends_temperature: true,
                token_field: TokenLimitField::Legacy,
                sends_reasoning_controls: false,
            },
        }
    }

    /// Build the request body for this profile.
    pub fn build_request(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        params: &ResolvedParams,
    ) -> ChatCompletionRequest {
        let contract = self.contract();

        let (max_tokens, max_completion_tokens) = match contract.token_field {
            TokenLimitField::Legacy => (Some(params.max_tokens), None),
            TokenLimitField::OutputCeiling => (None, Some(params.max_tokens)),
        };

        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: contract.sends_temperature.then_some(params.temperature),
            max_tokens,
            max_completion_tokens,
            verbosity: contract.sends_reasoning_controls.then_some(params.verbosity),
            reasoning_effort: contract
                .sends_reasoning_controls
                .then_some(params.reasoning_effort),
            response_format: params.structured.then(ResponseFormat::json_object),
        }
    }
}
