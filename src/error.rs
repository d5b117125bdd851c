//! Error types for Sitechat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Sitechat operations
///
/// Covers configuration loading, the chat backend round trip, and
/// transcript bookkeeping. None of these are ever shown verbatim to the
/// person chatting; the controller swaps them for fixed phrases.
#[derive(Error, Debug)]
pub enum SitechatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend could not be reached or the request failed in flight
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status
    #[error("Backend returned HTTP {status}")]
    Status {
        /// The HTTP status code
        status: u16,
    },

    /// The backend answered 2xx but the body was not usable JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Transcript bookkeeping errors (unknown handle, double finalize)
    #[error("Transcript error: {0}")]
    Transcript(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Sitechat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
