//! Chat backend client
//!
//! Defines the [`ChatBackend`] seam the controller talks to and its HTTP
//! implementation against the site's `POST /chat` endpoint.

use crate::config::ChatConfig;
use crate::endpoint;
use crate::error::{Result, SitechatError};
use crate::session::SessionId;
use crate::sources::SourceEntry;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Body of a chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: SessionId,
}

impl ChatRequest {
    /// Build a request for one user message
    pub fn new(message: impl Into<String>, session_id: &SessionId) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.clone(),
        }
    }
}

/// What the controller needs from a successful reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    /// The answer text; `None` when missing, empty, or not a string
    pub answer: Option<String>,
    /// Source entries, in backend order
    pub sources: Vec<SourceEntry>,
}

impl ChatReply {
    /// Extract a reply from a decoded JSON body
    ///
    /// Lenient the way a page script would be: a body that is not an
    /// object, an `answer` that is not a non-empty string, or a `sources`
    /// value that is not an array all degrade to "absent" instead of
    /// failing. Every source item is kept in order, URL or not, so that
    /// truncation sees the backend's positions.
    ///
    /// # Errors
    ///
    /// Returns error when the body is JSON `null`, which has no fields to
    /// read at all
    pub fn from_json(body: serde_json::Value) -> Result<Self> {
        let mut fields = match body {
            serde_json::Value::Object(fields) => fields,
            serde_json::Value::Null => {
                return Err(
                    SitechatError::MalformedResponse("reply body is null".to_string()).into(),
                )
            }
            _ => return Ok(Self::default()),
        };

        let answer = match fields.remove("answer") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };

        let sources = match fields.remove("sources") {
            Some(serde_json::Value::Array(items)) => {
                items.iter().map(SourceEntry::from_value).collect()
            }
            _ => Vec::new(),
        };

        Ok(Self { answer, sources })
    }
}

/// Status document served by `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Something that can answer chat requests
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one message and wait for the reply
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-2xx status, or an unparsable body
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply>;
}

/// [`ChatBackend`] over HTTP
///
/// # Examples
///
/// ```no_run
/// use sitechat::client::{ChatBackend, ChatRequest, HttpChatBackend};
/// use sitechat::config::ChatConfig;
/// use sitechat::session::SessionId;
///
/// # async fn example() -> sitechat::error::Result<()> {
/// let backend = HttpChatBackend::from_config(&ChatConfig::default())?;
/// let session = SessionId::generate();
/// let reply = backend.send(&ChatRequest::new("Bonjour", &session)).await?;
/// println!("{:?}", reply.answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: Client,
    chat_url: Url,
    health_url: Url,
}

impl HttpChatBackend {
    /// Create a backend from the chat configuration
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint cannot be resolved or the HTTP client
    /// cannot be built
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("sitechat/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SitechatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let chat_url = endpoint::chat_endpoint(config)?;
        let health_url = endpoint::health_endpoint(config)?;
        tracing::debug!(chat_url = %chat_url, "Chat backend configured");

        Ok(Self {
            client,
            chat_url,
            health_url,
        })
    }

    /// The resolved `/chat` URL
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// The resolved `/health` URL
    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    /// Query the backend's `/health` endpoint
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-2xx status, or an unparsable body
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(|e| SitechatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitechatError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| SitechatError::MalformedResponse(e.to_string()).into())
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        tracing::debug!(url = %self.chat_url, session_id = %request.session_id, "Posting chat message");

        let response = self
            .client
            .post(self.chat_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| SitechatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitechatError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SitechatError::MalformedResponse(e.to_string()))?;

        ChatReply::from_json(body)
    }
}
