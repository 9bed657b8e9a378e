//! Best-effort decoding of JSON-shaped model output.
//!
//! A model that was asked for JSON and returned something else is an
//! ordinary outcome, not an error. Callers get a [`StructuredOutcome`] and
//! must check it before trusting the shape of the object.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// Result of decoding one structured response.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredOutcome {
    /// The text was a JSON object.
    Parsed(Map<String, Value>),
    /// The text was not a JSON object.
    Failed {
        error: String,
        raw_response: String,
    },
}

/// Decode `text` as a JSON object.
///
/// `kind` names what was requested ("curriculum", "analysis", ...) and ends
/// up in the error message as `Failed to parse <kind>`.
pub fn parse_structured(text: &str, kind: &str) -> StructuredOutcome {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => StructuredOutcome::Parsed(object),
        Ok(other) => {
            tracing::warn!(kind, found = json_type(&other), "Structured output is not an object");
            StructuredOutcome::failed(kind, text)
        }
        Err(e) => {
            tracing::warn!(kind, error = %e, "Failed to parse structured output");
            StructuredOutcome::failed(kind, text)
        }
    }
}

impl StructuredOutcome {
    fn failed(kind: &str, raw: &str) -> Self {
        StructuredOutcome::Failed {
            error: format!("Failed to parse {}", kind),
            raw_response: raw.to_string(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, StructuredOutcome::Parsed(_))
    }

    /// The error message, if decoding failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            StructuredOutcome::Parsed(_) => None,
            StructuredOutcome::Failed { error, .. } => Some(error),
        }
    }

    /// Flatten into a JSON value.
    ///
    /// Failures become `{"error": ..., "raw_response": ...}`.
    pub fn into_value(self) -> Value {
        match self {
            StructuredOutcome::Parsed(object) => Value::Object(object),
            StructuredOutcome::Failed {
                error,
                raw_response,
            } => json!({
                "error": error,
                "raw_response": raw_response,
            }),
        }
    }

    /// Decode a parsed object into a typed document.
    ///
    /// A parsed object that does not fit `T` is reported as a failure of the
    /// same kind, carrying the object's JSON text as the raw response.
    pub fn decode<T: DeserializeOwned>(self, kind: &str) -> Result<T, StructuredOutcome> {
        match self {
            StructuredOutcome::Parsed(object) => {
                let value = Value::Object(object);
                serde_json::from_value(value.clone())
                    .map_err(|_| StructuredOutcome::failed(kind, &value.to_string()))
            }
            failed => Err(failed),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_object() {
        let outcome = parse_structured(r#"{"title": "Rust", "modules": []}"#, "curriculum");
        assert!(outcome.is_parsed());
        assert_eq!(outcome.error(), None);
        assert_eq!(outcome.into_value()["title"], "Rust");
    }

    #[test]
    fn test_parse_is_idempotent_on_valid_input() {
        let original = json!({
            "title": "Build a GPT",
            "modules": [{"id": "module_1", "concepts": ["bigrams"]}],
            "estimated_duration": "4 weeks"
        });

        let first = parse_structured(&original.to_string(), "curriculum").into_value();
        let second = parse_structured(&first.to_string(), "curriculum").into_value();

        assert_eq!(first, original);
        assert_eq!(second, original);
    }

    #[test]
    fn test_malformed_input_yields_sentinel() {
        let raw = r#"{"title": "Rust", "modules": [ "#;
        let value = parse_structured(raw, "curriculum").into_value();

        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["error", "raw_response"]);
        assert_eq!(object["error"], "Failed to parse curriculum");
        assert_eq!(object["raw_response"], raw);
    }

    #[test]
    fn test_non_object_json_is_failure() {
        let outcome = parse_structured("[1, 2, 3]", "analysis");
        assert_eq!(outcome.error(), Some("Failed to parse analysis"));

        let outcome = parse_structured("\"just a string\"", "analysis");
        assert!(!outcome.is_parsed());
    }

    #[test]
    fn test_prose_is_failure_with_verbatim_raw() {
        let raw = "Sure! Here is your curriculum:\n```json\n{}\n```";
        match parse_structured(raw, "project scaffold") {
            StructuredOutcome::Failed {
                error,
                raw_response,
            } => {
                assert_eq!(error, "Failed to parse project scaffold");
                assert_eq!(raw_response, raw);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_typed() {
        #[derive(Debug, serde::Deserialize)]
        struct Doc {
            title: String,
        }

        let doc: Doc = parse_structured(r#"{"title": "x"}"#, "doc")
            .decode("doc")
            .unwrap();
        assert_eq!(doc.title, "x");

        let err = parse_structured(r#"{"title": 3}"#, "doc")
            .decode::<Doc>("doc")
            .unwrap_err();
        assert_eq!(err.error(), Some("Failed to parse doc"));
    }
}
