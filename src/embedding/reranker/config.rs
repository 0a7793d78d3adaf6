use crate::constants::DEFAULT_RERANK_BATCH_SIZE;

pub const DEFAULT_RERANKER_MODEL: &str = "jina-reranker-v3";

#[derive(Debug, Clone)]
pub struct RerankerConfig {
    /// Base URL of the rerank service. `None` disables reranking.
    pub base_url: Option<String>,

    pub model: String,

    pub batch_size: usize,

    /// Max batches in flight per request. Defaults to the available parallelism.
    pub concurrency: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: DEFAULT_RERANKER_MODEL.to_string(),
            batch_size: DEFAULT_RERANK_BATCH_SIZE,
            concurrency: default_concurrency(),
        }
    }
}

impl RerankerConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Number of batches a single request may have in flight.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
