//! HTTP gateway (Axum) in front of the embedding service and Qdrant.
//!
//! Routes:
//! - `GET /healthz`, `GET /v1/models`, `GET /v1/cache/stats`
//! - `POST /v1/embeddings`: embeds and remembers query text
//! - `POST /collections/{collection}/points/search`: correlated, reranked search
//! - everything else: streamed reverse proxy to Qdrant

pub mod embeddings;
pub mod error;
pub mod proxy;
pub mod search;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    handler::Handler,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

pub use embeddings::embeddings_handler;
pub use error::GatewayError;
pub use proxy::proxy_handler;
pub use search::search_handler;
pub use state::HandlerState;

use crate::cache::{TETHER_STATUS_HEADER, TETHER_STATUS_HEALTHY};
use crate::constants::{MAX_BUFFERED_BODY_BYTES, MODEL_CREATED_AT, MODEL_OWNER};

/// Header a caller may use to correlate gateway logs with its own.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the gateway router.
///
/// Any method a route does not handle falls through to the proxy, as does any unmatched path.
/// Only the buffered JSON handlers are capped at [`MAX_BUFFERED_BODY_BYTES`]; proxied bodies
/// stream with no limit.
pub fn create_router_with_state(state: HandlerState) -> Router {
    let buffered = || DefaultBodyLimit::max(MAX_BUFFERED_BODY_BYTES);

    Router::new()
        .route("/healthz", get(health_handler).fallback(proxy_handler))
        .route("/v1/models", get(models_handler).fallback(proxy_handler))
        .route(
            "/v1/cache/stats",
            get(cache_stats_handler).fallback(proxy_handler),
        )
        .route(
            "/v1/embeddings",
            post(embeddings_handler.layer(buffered())).fallback(proxy_handler),
        )
        .route(
            "/collections/{collection}/points/search",
            post(search_handler.layer(buffered())).fallback(proxy_handler),
        )
        .fallback(proxy_handler)
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The caller's `x-request-id`, or a fresh 8-character id.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let mut id = uuid::Uuid::new_v4().simple().to_string();
            id.truncate(8);
            id
        })
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        TETHER_STATUS_HEADER,
        HeaderValue::from_static(TETHER_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// Static listing of the embedding and reranker models. No upstream calls.
#[tracing::instrument(skip(state))]
pub async fn models_handler(State(state): State<HandlerState>) -> Response {
    let model = |id: &str| {
        json!({
            "id": id,
            "object": "model",
            "created": MODEL_CREATED_AT,
            "owned_by": MODEL_OWNER,
        })
    };

    Json(json!({
        "object": "list",
        "data": [model(&state.embedding_model), model(&state.reranker_model)],
    }))
    .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn cache_stats_handler(State(state): State<HandlerState>) -> Response {
    Json(state.cache.stats()).into_response()
}
