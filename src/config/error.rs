//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// An upstream URL is not an absolute http(s) URL.
    #[error("invalid URL in {name} ('{value}'): {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid value for {name} ('{value}'): {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}
