use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Rerank, RerankScore, RerankerError};

/// Client for a Jina/Cohere-style rerank API.
///
/// `POST {base}/v1/rerank {model, query, documents}` answered with
/// `{results: [{index, relevance_score}]}`.
#[derive(Debug, Clone)]
pub struct HttpReranker {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl HttpReranker {
    pub fn new(client: reqwest::Client, base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client,
            url: format!("{}/v1/rerank", base_url.trim_end_matches('/')),
            model: model.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Rerank for HttpReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<RerankScore>, RerankerError> {
        debug!(
            model = %self.model,
            documents = documents.len(),
            "Submitting rerank batch"
        );

        let body = serde_json::json!({
            "model": self.model,
            "query": query,
            "documents": documents,
            "top_n": documents.len(),
            "return_documents": false,
        });

        let json: Value = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_rerank_response(&json)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Reads `results` (or `data`) entries carrying `index` and `relevance_score` (or `score`).
pub(crate) fn parse_rerank_response(json: &Value) -> Result<Vec<RerankScore>, RerankerError> {
    let results = json
        .get("results")
        .or_else(|| json.get("data"))
        .and_then(Value::as_array)
        .ok_or_else(|| RerankerError::InvalidResponse {
            reason: "missing results array".to_string(),
        })?;

    results
        .iter()
        .map(|item| {
            let index = item.get("index").and_then(Value::as_u64).ok_or_else(|| {
                RerankerError::InvalidResponse {
                    reason: "result missing index".to_string(),
                }
            })?;
            let relevance_score = item
                .get("relevance_score")
                .or_else(|| item.get("score"))
                .and_then(Value::as_f64)
                .ok_or_else(|| RerankerError::InvalidResponse {
                    reason: "result missing relevance_score".to_string(),
                })?;

            Ok(RerankScore {
                index: index as usize,
                relevance_score,
            })
        })
        .collect()
}
