//! Cross-cutting, shared constants.
//!
//! Values that the upstream services or callers depend on byte-for-byte live here so the
//! handlers and their tests agree on them.

/// Instruction prefix for single short inputs (retrieval intent).
pub const QUERY_PREFIX: &str = "Find the code snippet most similar to the query of:\n";

/// Instruction prefix for everything that is not classified as a query.
pub const PASSAGE_PREFIX: &str = "Candidate code snippet:\n";

/// An embedding request is a query iff it has exactly one input shorter than this (in chars).
pub const QUERY_MAX_CHARS: usize = 2000;

/// Characters per token used for the approximate usage count.
pub const CHARS_PER_TOKEN: usize = 4;

/// Number of leading vector components that participate in the fingerprint.
pub const FINGERPRINT_DIMS: usize = 32;

/// Decimal digits each component is rounded to before hashing.
pub const FINGERPRINT_PRECISION: usize = 6;

/// Default FingerprintCache capacity.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Default FingerprintCache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// `limit` the database is always asked for, so reranking has enough candidates.
pub const WIDENED_SEARCH_LIMIT: u64 = 100;

/// `limit` assumed when the caller does not send one.
pub const DEFAULT_SEARCH_LIMIT: u64 = 20;

/// Candidates per reranker call.
pub const DEFAULT_RERANK_BATCH_SIZE: usize = 64;

/// Ceiling for every upstream call (embedder, database, reranker).
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

/// Idle keep-alive connections kept per upstream host.
pub const UPSTREAM_POOL_IDLE_PER_HOST: usize = 20;

/// Path prefix whose `PUT` conflicts are reported as success.
pub const COLLECTION_CREATE_PREFIX: &str = "/collections/";

/// Body returned in place of a `409` on collection creation.
pub const COLLECTION_EXISTS_BODY: &[u8] = br#"{"result":true,"status":"ok"}"#;

/// Max chars of query text that may appear in logs.
pub const LOG_PREVIEW_CHARS: usize = 50;

/// `created` timestamp reported by `/v1/models`.
pub const MODEL_CREATED_AT: i64 = 1_686_935_002;

/// `owned_by` reported by `/v1/models`.
pub const MODEL_OWNER: &str = "tether";

/// Largest request body the embeddings and search handlers will buffer. Proxied bodies are
/// streamed and not subject to it.
pub const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024 * 1024;
