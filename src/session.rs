//! Per-run session identifier
//!
//! Every chat request carries the same opaque token so the backend can
//! correlate turns. The token carries no authentication meaning.

use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session token, generated once and immutable afterwards
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new session identifier
    ///
    /// Uses a random v4 UUID built from OS randomness. If the OS source is
    /// unavailable, falls back to the current Unix time in milliseconds.
    /// Never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitechat::session::SessionId;
    ///
    /// let id = SessionId::generate();
    /// assert!(!id.as_str().is_empty());
    /// ```
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        match OsRng.try_fill_bytes(&mut bytes) {
            Ok(()) => Self::from_random_bytes(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "OS randomness unavailable, using timestamp session id");
                Self::from_timestamp()
            }
        }
    }

    fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .to_string(),
        )
    }

    fn from_timestamp() -> Self {
        Self(chrono::Utc::now().timestamp_millis().to_string())
    }

    /// Borrow the token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
