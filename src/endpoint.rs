//! Chat endpoint resolution
//!
//! Turns the configured site origin into the API base URL. Opaque origins
//! (a page opened from disk reports `null`) fall back to a local
//! development address.

use crate::config::ChatConfig;
use crate::error::{Result, SitechatError};
use url::{Origin, Url};

/// Resolve the API base URL from an optional origin and a fallback
///
/// Returns the origin's `scheme://host[:port]` when it is a network
/// (tuple) origin, otherwise the parsed fallback.
///
/// # Errors
///
/// Returns error only if the fallback itself is not a valid URL
///
/// # Examples
///
/// ```
/// use sitechat::endpoint::resolve_api_base;
///
/// let base = resolve_api_base(Some("file:///srv/site/index.html"), "http://127.0.0.1:8000").unwrap();
/// assert_eq!(base.as_str(), "http://127.0.0.1:8000/");
///
/// let base = resolve_api_base(Some("https://example.org/chat/page"), "http://127.0.0.1:8000").unwrap();
/// assert_eq!(base.as_str(), "https://example.org/");
/// ```
pub fn resolve_api_base(origin: Option<&str>, fallback: &str) -> Result<Url> {
    if let Some(base) = origin.and_then(network_origin) {
        return Ok(base);
    }

    if let Some(raw) = origin {
        tracing::debug!(origin = %raw, fallback = %fallback, "Origin is not a network origin, using fallback");
    }

    Url::parse(fallback).map_err(|e| {
        SitechatError::Config(format!("Invalid fallback address {}: {}", fallback, e)).into()
    })
}

fn network_origin(raw: &str) -> Option<Url> {
    let parsed = Url::parse(raw.trim()).ok()?;
    match parsed.origin() {
        Origin::Tuple(..) => Url::parse(&parsed.origin().ascii_serialization()).ok(),
        Origin::Opaque(_) => None,
    }
}

/// Resolve the `/chat` endpoint for a chat configuration
///
/// # Errors
///
/// Returns error if the fallback address is invalid
pub fn chat_endpoint(config: &ChatConfig) -> Result<Url> {
    join(config, "/chat")
}

/// Resolve the `/health` endpoint for a chat configuration
///
/// # Errors
///
/// Returns error if the fallback address is invalid
pub fn health_endpoint(config: &ChatConfig) -> Result<Url> {
    join(config, "/health")
}

fn join(config: &ChatConfig, path: &str) -> Result<Url> {
    let base = resolve_api_base(config.origin.as_deref(), &config.dev_fallback)?;
    base.join(path)
        .map_err(|e| SitechatError::Config(format!("Cannot build {} URL: {}", path, e)).into())
}
