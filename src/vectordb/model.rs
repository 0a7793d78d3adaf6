//! Qdrant search request/response shapes, handled as loose JSON so unknown fields pass through.

use serde_json::{Map, Value};

use crate::constants::{DEFAULT_SEARCH_LIMIT, WIDENED_SEARCH_LIMIT};

/// Caller intent removed from a search body before it is widened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Number of hits the caller asked for.
    pub limit: usize,
    /// Minimum score of returned hits, applied by the gateway after reranking.
    pub score_threshold: Option<f64>,
}

/// Records the caller's `limit`, pops `score_threshold`, then forces `limit = 100` and
/// `with_payload = true`.
///
/// Returns `None` if the body is not a JSON object.
pub fn widen_search_body(body: &mut Value) -> Option<SearchParams> {
    let obj = body.as_object_mut()?;

    let limit = obj
        .get("limit")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_SEARCH_LIMIT) as usize;
    let score_threshold = obj.remove("score_threshold").and_then(|v| v.as_f64());

    obj.insert("limit".to_string(), Value::from(WIDENED_SEARCH_LIMIT));
    obj.insert("with_payload".to_string(), Value::Bool(true));

    Some(SearchParams {
        limit,
        score_threshold,
    })
}

/// Extracts the dense query vector: either `vector: [..]` or the named form
/// `vector: {name, vector: [..]}`.
///
/// Returns `None` for missing, empty, sparse or non-numeric vectors.
pub fn search_vector(body: &Value) -> Option<Vec<f64>> {
    let vector = match body.get("vector")? {
        Value::Array(values) => values,
        Value::Object(named) => named.get("vector")?.as_array()?,
        _ => return None,
    };

    if vector.is_empty() {
        return None;
    }

    vector.iter().map(Value::as_f64).collect()
}

/// Score of a hit, `0.0` when absent.
pub fn hit_score(hit: &Value) -> f64 {
    hit.get("score").and_then(Value::as_f64).unwrap_or(0.0)
}

/// Overwrites a hit's score.
pub fn set_hit_score(hit: &mut Value, score: f64) {
    if let Some(obj) = hit.as_object_mut() {
        obj.insert("score".to_string(), Value::from(score));
    }
}

/// Payload of a hit (`Null` when absent).
pub fn hit_payload(hit: &Value) -> &Value {
    hit.get("payload").unwrap_or(&Value::Null)
}

/// Keeps hits whose score is `>= threshold`. No threshold keeps everything.
pub fn filter_by_threshold(hits: Vec<Value>, threshold: Option<f64>) -> Vec<Value> {
    match threshold {
        Some(threshold) => hits
            .into_iter()
            .filter(|hit| hit_score(hit) >= threshold)
            .collect(),
        None => hits,
    }
}

/// Sorts hits by score, highest first. Ties keep their order.
pub fn sort_by_score_desc(hits: &mut [Value]) {
    hits.sort_by(|a, b| hit_score(b).total_cmp(&hit_score(a)));
}

/// Takes the `result` array out of a search response, leaving `[]` behind.
pub fn take_results(response: &mut Map<String, Value>) -> Vec<Value> {
    match response.insert("result".to_string(), Value::Array(Vec::new())) {
        Some(Value::Array(hits)) => hits,
        _ => Vec::new(),
    }
}
