//! Tether library crate (used by the server binary and integration tests).
//!
//! Tether sits between a code-indexing client, an embedding service and Qdrant. It remembers
//! which query text produced which embedding, so when the same vector comes back in a search
//! the hits can be reranked against the original query.
//!
//! ## Modules
//! - [`cache`]: [`FingerprintCache`], the vector-to-query correlation store
//! - [`hashing`]: vector fingerprints used as cache keys
//! - [`embedding`]: embedding client, query/passage classification, reranking
//! - [`vectordb`]: Qdrant REST client and proxy header handling
//! - [`payload`]: rerank text extraction from hit payloads
//! - [`gateway`]: the Axum router and handlers
//! - [`config`]: `TETHER_*` environment configuration
//!
//! ## Test/Mock Support
//! Mock upstreams are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod payload;
pub mod vectordb;

pub use cache::{
    CacheEntry, CacheStats, FingerprintCache, SearchStatus, TETHER_STATUS_HEADER,
    TETHER_STATUS_HEALTHY,
};
pub use config::{Config, ConfigError};
pub use embedding::{
    EmbedderClient, EmbeddingError, EmbeddingInput, HttpReranker, InputKind, Rerank,
    RerankOrchestrator, RerankScore, RerankerConfig, RerankerError,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockEmbedder, MockReranker};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use hashing::{Fingerprint, fingerprint_vector};
pub use vectordb::{QdrantRestClient, VectorDbError};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::{CannedResponse, MockQdrant};
