//! Embedding request inputs: parsing, query/passage classification and prefixing.

use serde_json::Value;

use super::EmbeddingError;
use crate::constants::{CHARS_PER_TOKEN, PASSAGE_PREFIX, QUERY_MAX_CHARS, QUERY_PREFIX};

/// How the embedding model should treat the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Exactly one input shorter than [`QUERY_MAX_CHARS`].
    Query,
    /// Anything else, including batches of short texts.
    Passage,
}

impl InputKind {
    /// Classifies a request. No further tie-breaking: multi-item batches are passages.
    pub fn classify(texts: &[String]) -> Self {
        match texts {
            [single] if single.chars().count() < QUERY_MAX_CHARS => InputKind::Query,
            _ => InputKind::Passage,
        }
    }

    #[inline]
    pub fn prefix(&self) -> &'static str {
        match self {
            InputKind::Query => QUERY_PREFIX,
            InputKind::Passage => PASSAGE_PREFIX,
        }
    }

    #[inline]
    pub fn is_query(&self) -> bool {
        matches!(self, InputKind::Query)
    }
}

/// Parsed `input` of an `/v1/embeddings` request.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingInput {
    texts: Vec<String>,
    kind: InputKind,
}

impl EmbeddingInput {
    /// Reads `input` (a string or an array of strings) from a request body.
    pub fn from_body(body: &Value) -> Result<Self, EmbeddingError> {
        let texts = match body.get("input") {
            None | Some(Value::Null) => return Err(invalid("Missing input")),
            Some(Value::String(text)) if text.is_empty() => {
                return Err(invalid("Missing input"));
            }
            Some(Value::String(text)) => vec![text.clone()],
            Some(Value::Array(items)) if items.is_empty() => {
                return Err(invalid("Empty input array"));
            }
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid("input array must contain only strings"))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(invalid("input must be a string or an array of strings")),
        };

        Ok(Self::new(texts))
    }

    pub fn new(texts: Vec<String>) -> Self {
        let kind = InputKind::classify(&texts);
        Self { texts, kind }
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// The original query text, when this request is a query.
    pub fn query_text(&self) -> Option<&str> {
        match self.kind {
            InputKind::Query => self.texts.first().map(String::as_str),
            InputKind::Passage => None,
        }
    }

    /// Inputs with the instruction prefix for their kind prepended.
    pub fn prefixed(&self) -> Vec<String> {
        let prefix = self.kind.prefix();
        self.texts
            .iter()
            .map(|text| format!("{prefix}{text}"))
            .collect()
    }

    /// Approximate token usage: `max(1, total_chars / 4)`.
    pub fn approx_tokens(&self) -> usize {
        let total_chars: usize = self.texts.iter().map(|t| t.chars().count()).sum();
        (total_chars / CHARS_PER_TOKEN).max(1)
    }
}

fn invalid(reason: &str) -> EmbeddingError {
    EmbeddingError::InvalidInput {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_string_is_query() {
        let input = EmbeddingInput::from_body(&json!({ "input": "parse json" })).expect("input");
        assert_eq!(input.kind(), InputKind::Query);
        assert_eq!(input.query_text(), Some("parse json"));
        assert_eq!(input.prefixed(), vec![format!("{QUERY_PREFIX}parse json")]);
    }

    #[test]
    fn test_single_item_array_is_query() {
        let input = EmbeddingInput::from_body(&json!({ "input": ["q"] })).expect("input");
        assert!(input.kind().is_query());
    }

    #[test]
    fn test_multiple_short_texts_are_passages() {
        let input = EmbeddingInput::from_body(&json!({ "input": ["a", "b"] })).expect("input");
        assert_eq!(input.kind(), InputKind::Passage);
        assert!(input.query_text().is_none());
        assert_eq!(
            input.prefixed(),
            vec![format!("{PASSAGE_PREFIX}a"), format!("{PASSAGE_PREFIX}b")]
        );
    }

    #[test]
    fn test_long_single_text_is_passage() {
        let boundary = "x".repeat(QUERY_MAX_CHARS);
        assert_eq!(InputKind::classify(&[boundary]), InputKind::Passage);

        let below = "x".repeat(QUERY_MAX_CHARS - 1);
        assert_eq!(InputKind::classify(&[below]), InputKind::Query);
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let text = "ü".repeat(QUERY_MAX_CHARS - 1);
        assert!(text.len() > QUERY_MAX_CHARS);
        assert_eq!(InputKind::classify(&[text]), InputKind::Query);
    }

    #[test]
    fn test_missing_input_rejected() {
        for body in [json!({}), json!({ "input": null }), json!({ "input": "" })] {
            let err = EmbeddingInput::from_body(&body).unwrap_err();
            assert!(err.to_string().contains("Missing input"), "{err}");
        }
    }

    #[test]
    fn test_empty_array_rejected() {
        let err = EmbeddingInput::from_body(&json!({ "input": [] })).unwrap_err();
        assert!(err.to_string().contains("Empty input array"));
    }

    #[test]
    fn test_non_string_items_rejected() {
        assert!(EmbeddingInput::from_body(&json!({ "input": ["a", 1] })).is_err());
        assert!(EmbeddingInput::from_body(&json!({ "input": 42 })).is_err());
        assert!(EmbeddingInput::from_body(&json!({ "input": { "text": "a" } })).is_err());
    }

    #[test]
    fn test_approx_tokens() {
        assert_eq!(EmbeddingInput::new(vec!["ab".to_string()]).approx_tokens(), 1);
        assert_eq!(
            EmbeddingInput::new(vec!["abcdefgh".to_string(), "ijkl".to_string()]).approx_tokens(),
            3
        );
        assert_eq!(EmbeddingInput::new(vec!["x".repeat(401)]).approx_tokens(), 100);
    }
}
