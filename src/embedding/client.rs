use tracing::debug;

use super::EmbeddingError;

/// Client for a text-embeddings-inference style service: `POST /embed {inputs, truncate}`.
#[derive(Debug, Clone)]
pub struct EmbedderClient {
    client: reqwest::Client,
    url: String,
}

impl EmbedderClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/embed", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Embeds `inputs`, returning one vector per input in request order.
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f64>>, EmbeddingError> {
        debug!(inputs = inputs.len(), "Requesting embeddings");

        let body = serde_json::json!({ "inputs": inputs, "truncate": true });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::RequestFailed {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<Vec<f64>>>()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse {
                reason: e.to_string(),
            })
    }
}
