//! HTTP client helpers for tests.

use std::time::Duration;

use serde_json::{Value, json};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

/// Status, `X-Tether-Status` header and JSON body of a gateway response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub tether_status: String,
    pub body: Value,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    async fn into_test_response(resp: reqwest::Response) -> Result<TestResponse, reqwest::Error> {
        let status = resp.status().as_u16();
        let tether_status = resp
            .headers()
            .get("x-tether-status")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(TestResponse {
            status,
            tether_status,
            body,
        })
    }

    pub async fn get(&self, path: &str) -> Result<TestResponse, reqwest::Error> {
        let resp = self.client.get(self.url(path)).send().await?;
        Self::into_test_response(resp).await
    }

    pub async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &Value,
    ) -> Result<TestResponse, reqwest::Error> {
        let resp = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Self::into_test_response(resp).await
    }

    /// Embeds a single query and returns its vector as JSON.
    pub async fn embed_query(&self, query: &str) -> Result<Value, reqwest::Error> {
        let resp = self
            .send_json(reqwest::Method::POST, "/v1/embeddings", &json!({ "input": query }))
            .await?;
        Ok(resp.body["data"][0]["embedding"].clone())
    }

    pub async fn search(
        &self,
        collection: &str,
        body: &Value,
    ) -> Result<TestResponse, reqwest::Error> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/collections/{collection}/points/search"),
            body,
        )
        .await
    }
}
