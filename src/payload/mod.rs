//! Projection of loosely structured search-hit payloads into rerankable text.
//!
//! Hits come from arbitrary indexers, so the text and the file path can live under several
//! field names. Candidates are tried in order and the first non-empty string wins.

use std::borrow::Cow;

use serde_json::Value;

use crate::constants::LOG_PREVIEW_CHARS;

/// Payload fields that may hold the indexed text, in priority order.
pub const TEXT_FIELDS: &[&str] = &["text", "content", "snippet", "code"];

/// Payload fields that may hold the source file path, in priority order.
pub const PATH_FIELDS: &[&str] = &["file_path", "path", "filename"];

/// Returns the first non-empty string stored under one of `fields`.
pub fn first_non_empty<'a>(payload: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|field| payload.get(*field).and_then(Value::as_str))
        .find(|value| !value.is_empty())
}

/// Builds the reranker input for a hit payload.
///
/// Returns `None` when the payload carries no text; such hits are not sent to the reranker.
/// When a path is present the text is prefixed with `File: {path}\n`.
pub fn rerank_text(payload: &Value) -> Option<String> {
    let text = first_non_empty(payload, TEXT_FIELDS)?;
    match first_non_empty(payload, PATH_FIELDS) {
        Some(path) => Some(format!("File: {path}\n{text}")),
        None => Some(text.to_string()),
    }
}

/// Truncates `text` to [`LOG_PREVIEW_CHARS`] characters for logging.
pub fn preview(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}
