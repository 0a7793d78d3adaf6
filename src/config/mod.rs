//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TETHER_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_RERANK_BATCH_SIZE,
    DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use crate::embedding::{DEFAULT_EMBEDDING_MODEL, DEFAULT_RERANKER_MODEL, RerankerConfig};

/// Default embedding service URL used when `TETHER_EMBEDDER_URL` is not set.
pub const DEFAULT_EMBEDDER_URL: &str = "http://localhost:8080";

/// Default Qdrant REST URL used when `TETHER_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";

/// Gateway configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TETHER_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `0.0.0.0`.
    pub bind_addr: IpAddr,

    /// Embedding service base URL (`POST {url}/embed`).
    pub embedder_url: String,

    /// Qdrant REST base URL.
    pub qdrant_url: String,

    /// Rerank service base URL. `None` disables reranking.
    pub reranker_url: Option<String>,

    pub reranker_model: String,

    /// Model id reported by `/v1/embeddings` and `/v1/models`.
    pub embedding_model: String,

    /// FingerprintCache capacity. Default: `1000`.
    pub cache_capacity: usize,

    /// FingerprintCache TTL. Default: `60`.
    pub cache_ttl_secs: u64,

    /// Candidates per reranker call. Default: `64`.
    pub rerank_batch_size: usize,

    /// Ceiling for each upstream call. Default: `120`.
    pub upstream_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            embedder_url: DEFAULT_EMBEDDER_URL.to_string(),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            reranker_url: None,
            reranker_model: DEFAULT_RERANKER_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            rerank_batch_size: DEFAULT_RERANK_BATCH_SIZE,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "TETHER_PORT";
    const ENV_BIND_ADDR: &'static str = "TETHER_BIND_ADDR";
    const ENV_EMBEDDER_URL: &'static str = "TETHER_EMBEDDER_URL";
    const ENV_QDRANT_URL: &'static str = "TETHER_QDRANT_URL";
    const ENV_RERANKER_URL: &'static str = "TETHER_RERANKER_URL";
    const ENV_RERANKER_MODEL: &'static str = "TETHER_RERANKER_MODEL";
    const ENV_EMBEDDING_MODEL: &'static str = "TETHER_EMBEDDING_MODEL";
    const ENV_CACHE_CAPACITY: &'static str = "TETHER_CACHE_CAPACITY";
    const ENV_CACHE_TTL_SECS: &'static str = "TETHER_CACHE_TTL_SECS";
    const ENV_RERANK_BATCH_SIZE: &'static str = "TETHER_RERANK_BATCH_SIZE";
    const ENV_UPSTREAM_TIMEOUT_SECS: &'static str = "TETHER_UPSTREAM_TIMEOUT_SECS";

    /// Every variable [`Config::from_env`] reads.
    pub const ENV_VARS: &'static [&'static str] = &[
        Self::ENV_PORT,
        Self::ENV_BIND_ADDR,
        Self::ENV_EMBEDDER_URL,
        Self::ENV_QDRANT_URL,
        Self::ENV_RERANKER_URL,
        Self::ENV_RERANKER_MODEL,
        Self::ENV_EMBEDDING_MODEL,
        Self::ENV_CACHE_CAPACITY,
        Self::ENV_CACHE_TTL_SECS,
        Self::ENV_RERANK_BATCH_SIZE,
        Self::ENV_UPSTREAM_TIMEOUT_SECS,
    ];

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Only the port and bind address are hard errors; unparseable numbers fall back to their
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            embedder_url: Self::parse_url_from_env(Self::ENV_EMBEDDER_URL, defaults.embedder_url),
            qdrant_url: Self::parse_url_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            reranker_url: Self::parse_optional_string_from_env(Self::ENV_RERANKER_URL)
                .map(|url| url.trim_end_matches('/').to_string()),
            reranker_model: Self::parse_optional_string_from_env(Self::ENV_RERANKER_MODEL)
                .unwrap_or(defaults.reranker_model),
            embedding_model: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_MODEL)
                .unwrap_or(defaults.embedding_model),
            cache_capacity: Self::parse_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity),
            cache_ttl_secs: Self::parse_from_env(Self::ENV_CACHE_TTL_SECS, defaults.cache_ttl_secs),
            rerank_batch_size: Self::parse_from_env(
                Self::ENV_RERANK_BATCH_SIZE,
                defaults.rerank_batch_size,
            ),
            upstream_timeout_secs: Self::parse_from_env(
                Self::ENV_UPSTREAM_TIMEOUT_SECS,
                defaults.upstream_timeout_secs,
            ),
        })
    }

    /// Rejects unusable URLs and zero-valued limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url(Self::ENV_EMBEDDER_URL, &self.embedder_url)?;
        validate_url(Self::ENV_QDRANT_URL, &self.qdrant_url)?;
        if let Some(ref url) = self.reranker_url {
            validate_url(Self::ENV_RERANKER_URL, url)?;
        }

        let positive = [
            (Self::ENV_CACHE_CAPACITY, self.cache_capacity as u64),
            (Self::ENV_CACHE_TTL_SECS, self.cache_ttl_secs),
            (Self::ENV_RERANK_BATCH_SIZE, self.rerank_batch_size as u64),
            (Self::ENV_UPSTREAM_TIMEOUT_SECS, self.upstream_timeout_secs),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: value.to_string(),
                    reason: "must be greater than 0",
                });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Reranker settings; disabled when no reranker URL is configured.
    pub fn reranker_config(&self) -> RerankerConfig {
        let config = match self.reranker_url {
            Some(ref url) => RerankerConfig::new(url.clone()),
            None => RerankerConfig::disabled(),
        };
        config
            .with_model(self.reranker_model.clone())
            .with_batch_size(self.rerank_batch_size)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_url_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(default)
    }

    fn parse_from_env<T: std::str::FromStr>(var_name: &str, default: T) -> T {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

fn validate_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason,
    };

    let url = reqwest::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
