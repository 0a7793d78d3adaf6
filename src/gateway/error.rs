use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cache::TETHER_STATUS_HEADER;
use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("upstream failed: {0}")]
    UpstreamFailed(String),
}

impl From<EmbeddingError> for GatewayError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::InvalidInput { reason } => GatewayError::InvalidRequest(reason),
            other => GatewayError::EmbeddingFailed(other.to_string()),
        }
    }
}

impl From<VectorDbError> for GatewayError {
    fn from(err: VectorDbError) -> Self {
        GatewayError::UpstreamFailed(err.to_string())
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::EmbeddingFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UpstreamFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn tether_status(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::EmbeddingFailed(_) => "embedding_error",
            GatewayError::UpstreamFailed(_) => "upstream_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut headers = HeaderMap::new();
        headers.insert(
            TETHER_STATUS_HEADER,
            HeaderValue::from_static(self.tether_status()),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
