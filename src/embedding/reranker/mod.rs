//! Listwise reranking.
//!
//! [`Rerank`] is the seam to the external reranking capability; [`HttpReranker`] talks to a
//! remote `/v1/rerank` endpoint. [`RerankOrchestrator`] splits a candidate list into batches,
//! submits them (possibly concurrently) and reassembles the scores against the original
//! candidate positions.

pub mod config;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod orchestrator;


pub use config::{DEFAULT_RERANKER_MODEL, RerankerConfig, default_concurrency};
pub use error::RerankerError;
pub use http::HttpReranker;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockReranker;
pub use orchestrator::RerankOrchestrator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Relevance of one candidate. `index` is 0-based within the list that was scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankScore {
    pub index: usize,
    pub relevance_score: f64,
}

/// A reranking capability: scores `documents` jointly against `query`.
///
/// Implementations may return the scores in any order and may omit documents; each score
/// carries its batch-local index.
#[async_trait]
pub trait Rerank: Send + Sync {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<RerankScore>, RerankerError>;

    /// Model identifier, for logs and `/v1/models`.
    fn model(&self) -> &str;
}
