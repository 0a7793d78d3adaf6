use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use super::error::GatewayError;
use super::request_id;
use super::state::HandlerState;
use crate::embedding::EmbeddingInput;
use crate::payload::preview;

#[derive(Debug, Serialize)]
pub struct EmbeddingsResponse {
    pub object: &'static str,
    pub data: Vec<EmbeddingData>,
    pub model: String,
    pub usage: Usage,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingData {
    pub object: &'static str,
    pub embedding: Vec<f64>,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub total_tokens: usize,
}

/// `POST /v1/embeddings` (OpenAI-compatible).
///
/// A single short input is treated as a search query: it is embedded with the query prefix and
/// the returned vector is remembered so a later search with that vector can recover the text.
#[instrument(skip_all, fields(request_id = tracing::field::Empty))]
pub async fn embeddings_handler(
    State(state): State<HandlerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let request_id = request_id(&headers);
    tracing::Span::current().record("request_id", tracing::field::display(&request_id));

    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| GatewayError::InvalidRequest("Invalid JSON".to_string()))?;
    let input = EmbeddingInput::from_body(&body)?;

    debug!(
        inputs = input.texts().len(),
        kind = ?input.kind(),
        "Embedding request received"
    );

    let embeddings = state
        .embedder
        .embed(&input.prefixed())
        .await
        .map_err(|e| {
            error!(error = %e, "Embedder failed");
            GatewayError::EmbeddingFailed("Embedder Failed".to_string())
        })?;

    if let Some(query) = input.query_text()
        && let Some(vector) = embeddings.first()
    {
        state.cache.store(vector, query);
        info!(query = %preview(query), "Stored query correlation");
    }

    let tokens = input.approx_tokens();
    let response = EmbeddingsResponse {
        object: "list",
        data: embeddings
            .into_iter()
            .enumerate()
            .map(|(index, embedding)| EmbeddingData {
                object: "embedding",
                embedding,
                index,
            })
            .collect(),
        model: state.embedding_model.clone(),
        usage: Usage {
            prompt_tokens: tokens,
            total_tokens: tokens,
        },
    };

    Ok(Json(response).into_response())
}
