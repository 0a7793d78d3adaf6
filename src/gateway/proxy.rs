use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument};

use super::error::GatewayError;
use super::request_id;
use super::state::HandlerState;
use crate::constants::{COLLECTION_CREATE_PREFIX, COLLECTION_EXISTS_BODY};
use crate::vectordb::{scrub_request_headers, scrub_response_headers};

/// Catch-all reverse proxy to Qdrant.
///
/// Request and response bodies are streamed in both directions. Only `POST`, `PUT` and
/// `PATCH` carry a body upstream.
#[instrument(
    skip_all,
    fields(
        request_id = tracing::field::Empty,
        method = %request.method(),
        path = %request.uri().path(),
    )
)]
pub async fn proxy_handler(
    State(state): State<HandlerState>,
    request: Request,
) -> Result<Response, GatewayError> {
    let request_id = request_id(request.headers());
    tracing::Span::current().record("request_id", tracing::field::display(&request_id));

    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());

    let upstream_body = carries_body(&parts.method)
        .then(|| reqwest::Body::wrap_stream(body.into_data_stream()));

    let upstream = state
        .qdrant
        .forward(
            parts.method.clone(),
            path_and_query,
            scrub_request_headers(&parts.headers),
            upstream_body,
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Proxy request failed");
            GatewayError::UpstreamFailed(format!("Proxy Failed: {e}"))
        })?;

    let status = upstream.status();
    info!(status = status.as_u16(), "Upstream responded");

    if is_collection_conflict(&parts.method, parts.uri.path(), status) {
        info!("Converting 409 Conflict to 200 OK (collection already exists)");
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CONNECTION, "close"),
            ],
            COLLECTION_EXISTS_BODY,
        )
            .into_response());
    }

    let headers = scrub_response_headers(upstream.headers());
    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// A `409` on `PUT /collections/...` means the collection already exists.
pub fn is_collection_conflict(method: &Method, path: &str, status: StatusCode) -> bool {
    status == StatusCode::CONFLICT
        && *method == Method::PUT
        && path.starts_with(COLLECTION_CREATE_PREFIX)
}
