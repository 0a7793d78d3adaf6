use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by vector database calls.
pub enum VectorDbError {
    /// Transport failure (connect, timeout, reset) talking to Qdrant.
    #[error("failed to reach Qdrant at '{url}': {message}")]
    ConnectionFailed {
        /// Target URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Search returned a non-2xx status.
    #[error("search in '{collection}' failed with status {status}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Upstream status code.
        status: u16,
    },

    /// Search response was not the expected JSON shape.
    #[error("invalid search response from '{collection}': {message}")]
    InvalidResponse {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },
}
