use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding service unreachable at '{url}': {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("embedding service returned status {status}")]
    UpstreamStatus { status: u16 },

    #[error("invalid embedding response: {reason}")]
    InvalidResponse { reason: String },

    #[error("invalid embedding input: {reason}")]
    InvalidInput { reason: String },
}
