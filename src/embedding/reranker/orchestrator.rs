use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, try_join_all};
use tokio::sync::Semaphore;
use tracing::debug;

use super::config::default_concurrency;
use super::{Rerank, RerankScore, RerankerConfig, RerankerError};
use crate::constants::DEFAULT_RERANK_BATCH_SIZE;

/// Batches candidates through a [`Rerank`] backend.
///
/// Batches are dispatched with at most `concurrency` in flight, but their scores are merged
/// in submission order, so index offsets never depend on which call finishes first. Any
/// failing batch fails the whole call.
#[derive(Clone)]
pub struct RerankOrchestrator {
    backend: Arc<dyn Rerank>,
    batch_size: usize,
    concurrency: usize,
}

impl RerankOrchestrator {
    pub fn new(backend: Arc<dyn Rerank>) -> Self {
        Self {
            backend,
            batch_size: DEFAULT_RERANK_BATCH_SIZE,
            concurrency: default_concurrency(),
        }
    }

    pub fn from_config(backend: Arc<dyn Rerank>, config: &RerankerConfig) -> Self {
        Self::new(backend)
            .with_batch_size(config.batch_size)
            .with_concurrency(config.concurrency)
    }

    /// Sets the batch size (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Sets the number of batches in flight (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Scores `candidates` against `query`.
    ///
    /// Returned indices refer to positions in `candidates`. The result is neither sorted nor
    /// thresholded.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: &[String],
    ) -> Result<Vec<RerankScore>, RerankerError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = self.batch_size;
        let query: Arc<str> = Arc::from(query);
        let permits = Arc::new(Semaphore::new(self.concurrency));

        debug!(
            candidates = candidates.len(),
            batch_size,
            batches = candidates.len().div_ceil(batch_size),
            "Reranking candidates"
        );

        let jobs: Vec<BoxFuture<'static, Result<Vec<RerankScore>, RerankerError>>> = candidates
            .chunks(batch_size)
            .enumerate()
            .map(|(n, batch)| {
                let backend = Arc::clone(&self.backend);
                let query = Arc::clone(&query);
                let permits = Arc::clone(&permits);
                let batch = batch.to_vec();
                let offset = n * batch_size;

                async move {
                    let _permit = permits.acquire_owned().await.map_err(|e| {
                        RerankerError::RequestFailed {
                            reason: e.to_string(),
                        }
                    })?;
                    let scores = backend.rerank(&query, &batch).await?;
                    offset_batch(scores, offset, batch.len())
                }
                .boxed()
            })
            .collect();

        // Results come back in submission order regardless of completion order.
        let batches = try_join_all(jobs).await?;

        Ok(batches.into_iter().flatten().collect())
    }
}

impl std::fmt::Debug for RerankOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RerankOrchestrator")
            .field("model", &self.backend.model())
            .field("batch_size", &self.batch_size)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

/// Shifts batch-local indices by `offset`, rejecting indices outside the batch.
pub(crate) fn offset_batch(
    scores: Vec<RerankScore>,
    offset: usize,
    batch_len: usize,
) -> Result<Vec<RerankScore>, RerankerError> {
    scores
        .into_iter()
        .map(|score| {
            if score.index >= batch_len {
                return Err(RerankerError::IndexOutOfRange {
                    index: score.index,
                    batch_len,
                });
            }
            Ok(RerankScore {
                index: score.index + offset,
                relevance_score: score.relevance_score,
            })
        })
        .collect()
}
