use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::FingerprintCache;
use crate::config::Config;
use crate::constants::UPSTREAM_POOL_IDLE_PER_HOST;
use crate::embedding::{
    DEFAULT_EMBEDDING_MODEL, DEFAULT_RERANKER_MODEL, EmbedderClient, HttpReranker,
    RerankOrchestrator,
};
use crate::vectordb::QdrantRestClient;

/// The single HTTP client shared by every upstream.
///
/// Redirects are never followed so the proxy relays them verbatim.
pub fn upstream_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(UPSTREAM_POOL_IDLE_PER_HOST)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Everything a handler needs, built once at startup and cloned per request.
#[derive(Clone, Debug)]
pub struct HandlerState {
    pub cache: Arc<FingerprintCache>,

    pub embedder: EmbedderClient,

    pub qdrant: QdrantRestClient,

    /// `None` when no reranker is configured; correlated searches then pass through.
    pub reranker: Option<RerankOrchestrator>,

    pub embedding_model: String,

    pub reranker_model: String,
}

impl HandlerState {
    pub fn new(
        cache: Arc<FingerprintCache>,
        embedder: EmbedderClient,
        qdrant: QdrantRestClient,
        reranker: Option<RerankOrchestrator>,
    ) -> Self {
        let reranker_model = reranker
            .as_ref()
            .map(|r| r.model().to_string())
            .unwrap_or_else(|| DEFAULT_RERANKER_MODEL.to_string());

        Self {
            cache,
            embedder,
            qdrant,
            reranker,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            reranker_model,
        }
    }

    /// Wires the cache and upstream clients described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = upstream_client(config.upstream_timeout())?;
        let cache = Arc::new(FingerprintCache::with_limits(
            config.cache_capacity,
            config.cache_ttl(),
        ));

        let reranker_config = config.reranker_config();
        let reranker = match reranker_config.base_url.as_deref() {
            Some(url) => {
                let backend = HttpReranker::new(client.clone(), url, reranker_config.model.clone());
                info!(url = backend.url(), model = %reranker_config.model, "Reranker configured");
                Some(RerankOrchestrator::from_config(
                    Arc::new(backend),
                    &reranker_config,
                ))
            }
            None => {
                warn!("No TETHER_RERANKER_URL configured, searches will not be reranked");
                None
            }
        };

        let state = Self::new(
            cache,
            EmbedderClient::new(client.clone(), &config.embedder_url),
            QdrantRestClient::new(client, &config.qdrant_url),
            reranker,
        )
        .with_embedding_model(config.embedding_model.clone())
        .with_reranker_model(config.reranker_model.clone());

        Ok(state)
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_reranker_model(mut self, model: impl Into<String>) -> Self {
        self.reranker_model = model.into();
        self
    }
}
