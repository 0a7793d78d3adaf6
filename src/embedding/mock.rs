use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

struct MockEmbedderState {
    dim: usize,
    failing: AtomicBool,
    requests: Mutex<Vec<Value>>,
}

/// In-process embedding service answering `POST /embed` with deterministic vectors.
///
/// The vector for an input depends only on the exact (prefixed) text it receives, so the same
/// query always embeds to the same vector.
pub struct MockEmbedder {
    addr: SocketAddr,
    state: Arc<MockEmbedderState>,
    handle: JoinHandle<()>,
}

impl MockEmbedder {
    pub async fn spawn(dim: usize) -> std::io::Result<Self> {
        let state = Arc::new(MockEmbedderState {
            dim,
            failing: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/embed", post(embed_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Makes every subsequent call answer `500`.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Request bodies received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().clone()
    }

    /// The vector the mock returns for `text`.
    pub fn vector_for(text: &str, dim: usize) -> Vec<f64> {
        let mut bytes = vec![0u8; dim * 4];
        blake3::Hasher::new()
            .update(text.as_bytes())
            .finalize_xof()
            .fill(&mut bytes);

        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                raw as f64 / u32::MAX as f64 * 2.0 - 1.0
            })
            .collect()
    }
}

impl Drop for MockEmbedder {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn embed_handler(
    State(state): State<Arc<MockEmbedderState>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.requests.lock().push(body.clone());

    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded").into_response();
    }

    let vectors: Vec<Vec<f64>> = body
        .get("inputs")
        .and_then(Value::as_array)
        .map(|inputs| {
            inputs
                .iter()
                .filter_map(Value::as_str)
                .map(|text| MockEmbedder::vector_for(text, state.dim))
                .collect()
        })
        .unwrap_or_default();

    Json(vectors).into_response()
}
