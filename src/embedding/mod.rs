//! Embedding and reranking upstreams.
//!
//! - [`client`] talks to the embedding service.
//! - [`input`] classifies embedding inputs as queries or passages.
//! - [`reranker`] provides listwise reranking used by the search handler.

/// Embedding service client.
pub mod client;
mod error;
/// Input parsing and query/passage classification.
pub mod input;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Listwise reranking.
pub mod reranker;

pub use client::EmbedderClient;
pub use error::EmbeddingError;
pub use input::{EmbeddingInput, InputKind};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use reranker::{
    DEFAULT_RERANKER_MODEL, HttpReranker, Rerank, RerankOrchestrator, RerankScore,
    RerankerConfig, RerankerError,
};
#[cfg(any(test, feature = "mock"))]
pub use reranker::MockReranker;

/// Default embedding model identifier reported to clients.
pub const DEFAULT_EMBEDDING_MODEL: &str = "jina-code-embeddings";
