use axum::http::{HeaderMap, Method};
use serde_json::Value;
use tracing::{debug, error};

use super::VectorDbError;

/// Qdrant REST client shared by the search handler and the catch-all proxy.
#[derive(Debug, Clone)]
pub struct QdrantRestClient {
    client: reqwest::Client,
    base_url: String,
}

impl QdrantRestClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute upstream URL for a request path (with query string).
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// `POST /collections/{collection}/points/search` with an already widened body.
    ///
    /// `query` is the caller's query string (`consistency`, `timeout`), passed through as-is.
    /// Any transport failure, non-2xx status or non-object JSON reply is an error.
    pub async fn search(
        &self,
        collection: &str,
        query: Option<&str>,
        body: &Value,
        headers: HeaderMap,
    ) -> Result<serde_json::Map<String, Value>, VectorDbError> {
        let path = format!("/collections/{collection}/points/search");
        let url = match query {
            Some(query) if !query.is_empty() => self.url_for(&format!("{path}?{query}")),
            _ => self.url_for(&path),
        };
        debug!(collection, "Forwarding search to Qdrant");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(collection, status = status.as_u16(), "Qdrant search failed");
            return Err(VectorDbError::SearchFailed {
                collection: collection.to_string(),
                status: status.as_u16(),
            });
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| VectorDbError::InvalidResponse {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        match value {
            Value::Object(obj) => Ok(obj),
            _ => Err(VectorDbError::InvalidResponse {
                collection: collection.to_string(),
                message: "expected a JSON object".to_string(),
            }),
        }
    }

    /// Sends an arbitrary request upstream and hands back the unread response.
    ///
    /// Headers must already be scrubbed. The status is not inspected.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Option<reqwest::Body>,
    ) -> Result<reqwest::Response, VectorDbError> {
        let url = self.url_for(path_and_query);

        let mut request = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        request
            .send()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url,
                message: e.to_string(),
            })
    }
}
