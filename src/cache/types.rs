use std::time::Instant;

use serde::Serialize;

use crate::hashing::Fingerprint;

pub const TETHER_STATUS_HEADER: &str = "X-Tether-Status";
pub const TETHER_STATUS_HEALTHY: &str = "healthy";

/// Which branch of the search pipeline produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    /// Query text was correlated and the reranker reordered the hits.
    Reranked,
    /// Query text was correlated but reranking failed; database order was kept.
    RerankFailed,
    /// No correlation (or no reranker); database results were passed through.
    Passthrough,
}

impl SearchStatus {
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            SearchStatus::Reranked => "RERANKED",
            SearchStatus::RerankFailed => "RERANK_FAILED",
            SearchStatus::Passthrough => "PASSTHROUGH",
        }
    }
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}

/// One live correlation: the query text that produced a vector.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub query_text: String,
    pub inserted_at: Instant,
}

/// Snapshot of cache occupancy and lookup counters (served at `/v1/cache/stats`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub ttl_seconds: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}
