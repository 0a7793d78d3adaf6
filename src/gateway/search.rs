use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, Uri},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::error::GatewayError;
use super::request_id;
use super::state::HandlerState;
use crate::cache::{SearchStatus, TETHER_STATUS_HEADER};
use crate::embedding::RerankOrchestrator;
use crate::payload::{preview, rerank_text};
use crate::vectordb::model::{
    filter_by_threshold, hit_payload, set_hit_score, sort_by_score_desc, take_results,
};
use crate::vectordb::{SearchParams, search_auth_headers, search_vector, widen_search_body};

/// `POST /collections/{collection}/points/search`.
///
/// The search is widened to 100 hits with payloads. If the query vector was produced by
/// `/v1/embeddings` the original query text is recovered and the hits are reranked against
/// it. The caller's `score_threshold` and `limit` are applied last.
#[instrument(skip_all, fields(collection = %collection, request_id = tracing::field::Empty))]
pub async fn search_handler(
    State(state): State<HandlerState>,
    Path(collection): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let request_id = request_id(&headers);
    tracing::Span::current().record("request_id", tracing::field::display(&request_id));

    let mut body: Value = serde_json::from_slice(&body)
        .map_err(|_| GatewayError::InvalidRequest("Invalid JSON".to_string()))?;
    let params = widen_search_body(&mut body).ok_or_else(|| {
        GatewayError::InvalidRequest("search body must be a JSON object".to_string())
    })?;

    info!(
        limit = params.limit,
        score_threshold = ?params.score_threshold,
        "Search request received"
    );

    let query_text = search_vector(&body).and_then(|vector| state.cache.get(&vector));
    match &query_text {
        Some(query) => info!(query = %preview(query), "Correlated query"),
        None => warn!("No query text found in cache, reranking will be skipped"),
    }

    let mut response = state
        .qdrant
        .search(
            &collection,
            uri.query(),
            &body,
            search_auth_headers(&headers),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Qdrant search failed");
            GatewayError::from(e)
        })?;

    let hits = take_results(&mut response);
    let (hits, status) =
        rank_hits(state.reranker.as_ref(), query_text.as_deref(), hits, params).await;

    info!(results = hits.len(), status = %status, "Search completed");
    response.insert("result".to_string(), Value::Array(hits));

    let mut response = Json(Value::Object(response)).into_response();
    response.headers_mut().insert(
        TETHER_STATUS_HEADER,
        HeaderValue::from_static(status.as_header_value()),
    );
    Ok(response)
}

/// Reorders `hits` for the correlated `query`, then applies threshold and limit.
///
/// Only hits with rerankable payload text survive a successful rerank. A failed rerank keeps
/// the database order and scores.
pub async fn rank_hits(
    reranker: Option<&RerankOrchestrator>,
    query: Option<&str>,
    hits: Vec<Value>,
    params: SearchParams,
) -> (Vec<Value>, SearchStatus) {
    let (Some(query), Some(reranker)) = (query, reranker) else {
        return (finish(hits, params), SearchStatus::Passthrough);
    };

    let (positions, candidates): (Vec<usize>, Vec<String>) = hits
        .iter()
        .enumerate()
        .filter_map(|(pos, hit)| rerank_text(hit_payload(hit)).map(|text| (pos, text)))
        .unzip();

    if candidates.is_empty() {
        return (finish(hits, params), SearchStatus::Passthrough);
    }

    info!(candidates = candidates.len(), "Reranking candidates");

    let scores = match reranker.rerank(query, &candidates).await {
        Ok(scores) => scores,
        Err(e) => {
            error!(error = %e, query = %preview(query), "Reranking failed, keeping database order");
            return (finish(hits, params), SearchStatus::RerankFailed);
        }
    };

    let reranked: Option<Vec<Value>> = scores
        .iter()
        .map(|score| {
            let pos = *positions.get(score.index)?;
            let mut hit = hits[pos].clone();
            set_hit_score(&mut hit, score.relevance_score);
            Some(hit)
        })
        .collect();

    let Some(mut reranked) = reranked else {
        error!("Reranker returned an index outside the candidate list, keeping database order");
        return (finish(hits, params), SearchStatus::RerankFailed);
    };

    sort_by_score_desc(&mut reranked);
    let reranked = filter_by_threshold(reranked, params.score_threshold);
    if let Some(threshold) = params.score_threshold {
        info!(threshold, results = reranked.len(), "Applied threshold filter");
    }

    (truncate(reranked, params.limit), SearchStatus::Reranked)
}

fn finish(hits: Vec<Value>, params: SearchParams) -> Vec<Value> {
    truncate(filter_by_threshold(hits, params.score_threshold), params.limit)
}

fn truncate(mut hits: Vec<Value>, limit: usize) -> Vec<Value> {
    hits.truncate(limit);
    hits
}
