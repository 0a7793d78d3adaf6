use thiserror::Error;

#[derive(Debug, Error)]
pub enum RerankerError {
    #[error("reranker request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("reranker returned status {status}")]
    UpstreamStatus { status: u16 },

    #[error("invalid reranker response: {reason}")]
    InvalidResponse { reason: String },

    #[error("reranker returned index {index} for a batch of {batch_len}")]
    IndexOutOfRange { index: usize, batch_len: usize },
}

impl From<reqwest::Error> for RerankerError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RerankerError::UpstreamStatus {
                status: status.as_u16(),
            },
            None if err.is_decode() => RerankerError::InvalidResponse {
                reason: err.to_string(),
            },
            None => RerankerError::RequestFailed {
                reason: err.to_string(),
            },
        }
    }
}
