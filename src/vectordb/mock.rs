use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as the mock database saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Body parsed as JSON (`Null` if it is not JSON).
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

/// Fixed reply for one `(method, path)` pair.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/json")],
            body: body.to_string().into_bytes(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

#[derive(Default)]
struct MockQdrantState {
    search_hits: Mutex<Vec<Value>>,
    search_status: Mutex<Option<StatusCode>>,
    canned: Mutex<HashMap<(Method, String), CannedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process stand-in for the Qdrant REST API.
///
/// `POST /collections/*/points/search` answers with the configured hits. Canned responses
/// take precedence over everything else. Any other request is echoed back as
/// `{"result": {method, path, query, body_len}, "status": "ok"}`.
pub struct MockQdrant {
    addr: SocketAddr,
    state: Arc<MockQdrantState>,
    handle: JoinHandle<()>,
}

impl MockQdrant {
    pub async fn spawn() -> std::io::Result<Self> {
        let state = Arc::new(MockQdrantState::default());

        let router = Router::new()
            .fallback(handle_request)
            .layer(DefaultBodyLimit::disable())
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

    /// Hits returned by every search, in this order.
    pub fn set_search_hits(&self, hits: Vec<Value>) {
        *self.state.search_hits.lock() = hits;
    }

    /// Makes every search answer with `status` and an error body.
    pub fn set_search_status(&self, status: StatusCode) {
        *self.state.search_status.lock() = Some(status);
    }

    pub fn respond_with(&self, method: Method, path: &str, response: CannedResponse) {
        self.state
            .canned
            .lock()
            .insert((method, path.to_string()), response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Most recent request, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().last().cloned()
    }
}

impl Drop for MockQdrant {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn is_search_path(path: &str) -> bool {
    path.starts_with("/collections/") && path.ends_with("/points/search")
}

async fn handle_request(
    State(state): State<Arc<MockQdrantState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let recorded = RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    };
    let body_len = recorded.body.len();
    let query = recorded.query.clone();
    state.requests.lock().push(recorded);

    let canned = state.canned.lock().get(&(method.clone(), path.clone())).cloned();
    if let Some(canned) = canned {
        let mut response = Response::new(Body::from(canned.body));
        *response.status_mut() = canned.status;
        for (name, value) in canned.headers {
            response.headers_mut().insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        return response;
    }

    if method == Method::POST && is_search_path(&path) {
        if let Some(status) = *state.search_status.lock() {
            return (
                status,
                axum::Json(json!({ "status": { "error": "search failed" } })),
            )
                .into_response();
        }

        let hits = state.search_hits.lock().clone();
        return axum::Json(json!({ "result": hits, "status": "ok", "time": 0.001 }))
            .into_response();
    }

    axum::Json(json!({
        "result": {
            "method": method.as_str(),
            "path": path,
            "query": query,
            "body_len": body_len,
        },
        "status": "ok"
    }))
    .into_response()
}
