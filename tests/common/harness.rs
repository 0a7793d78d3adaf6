//! Test server harness.
//!
//! Spawns the full gateway on an ephemeral port in front of in-process mock upstreams.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tether::cache::FingerprintCache;
use tether::config::Config;
use tether::embedding::{EmbedderClient, MockEmbedder, MockReranker, RerankOrchestrator};
use tether::gateway::{HandlerState, create_router_with_state, state::upstream_client};
use tether::vectordb::{MockQdrant, QdrantRestClient};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub embedding_dim: usize,
    pub rerank_batch_size: usize,
    /// Spawn a `MockReranker` (word-overlap scoring) behind the gateway.
    pub with_reranker: bool,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 64,
            rerank_batch_size: 64,
            with_reranker: true,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub embedder: MockEmbedder,
    pub qdrant: MockQdrant,
    pub reranker: Option<Arc<MockReranker>>,
    pub cache: Arc<FingerprintCache>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns the gateway with every upstream mocked.
///
/// | Upstream  | Stand-in                                      |
/// |-----------|-----------------------------------------------|
/// | Embedder  | `MockEmbedder` (deterministic vectors)        |
/// | Qdrant    | `MockQdrant` (configurable hits, echo proxy)  |
/// | Reranker  | `MockReranker` or none                        |
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let embedder = MockEmbedder::spawn(config.embedding_dim).await?;
    let qdrant = MockQdrant::spawn().await?;
    let reranker = config.with_reranker.then(|| Arc::new(MockReranker::new()));

    let client = upstream_client(Duration::from_secs(10))
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let cache = Arc::new(FingerprintCache::new());

    let orchestrator = reranker.clone().map(|mock| {
        RerankOrchestrator::new(mock).with_batch_size(config.rerank_batch_size)
    });

    let state = HandlerState::new(
        Arc::clone(&cache),
        EmbedderClient::new(client.clone(), &embedder.url()),
        QdrantRestClient::new(client, &qdrant.url()),
        orchestrator,
    );

    let (addr, shutdown_tx, server_handle) = serve(state).await?;

    Ok(TestServer {
        addr,
        embedder,
        qdrant,
        reranker,
        cache,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

/// Spawns the gateway the way the binary does, from a [`Config`] pointing at mock upstreams.
///
/// No reranker URL is configured, so searches are never reranked.
pub async fn spawn_configured_server(
    embedding_dim: usize,
) -> Result<TestServer, ServerStartupError> {
    let embedder = MockEmbedder::spawn(embedding_dim).await?;
    let qdrant = MockQdrant::spawn().await?;

    let config = Config {
        embedder_url: embedder.url(),
        qdrant_url: qdrant.url(),
        ..Config::default()
    };
    config
        .validate()
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let state = HandlerState::from_config(&config)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let cache = Arc::clone(&state.cache);

    let (addr, shutdown_tx, server_handle) = serve(state).await?;

    Ok(TestServer {
        addr,
        embedder,
        qdrant,
        reranker: None,
        cache,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

async fn serve(
    state: HandlerState,
) -> Result<(SocketAddr, oneshot::Sender<()>, JoinHandle<()>), ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let app = create_router_with_state(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok((local_addr, shutdown_tx, server_handle))
}
