//! Sitechat - website chat widget library
//!
//! This library provides the pieces of a site assistant widget: a chat
//! controller that posts questions to the site's `/chat` endpoint and renders
//! the reply with its source links, and a slide rotator for the page's
//! background carousels.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `controller`: Submission lifecycle (placeholder, request, reply or error)
//! - `client`: Chat backend trait and its HTTP implementation
//! - `transcript`: Append-only message log and the view trait
//! - `terminal`: Terminal rendering of the transcript
//! - `sources`: Source link block rendering
//! - `session`: Per-run session identifier
//! - `endpoint`: Origin to API base resolution
//! - `rotator`: Auto-advancing slide rotator
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use sitechat::{ChatController, Config, HttpChatBackend, SessionId, Transcript};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = HttpChatBackend::from_config(&config.chat)?;
//!     let mut controller = ChatController::new(
//!         backend,
//!         Transcript::new(),
//!         SessionId::generate(),
//!         config.messages.clone(),
//!         config.chat.max_sources,
//!     );
//!     controller.set_input("Bonjour");
//!     controller.submit().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod rotator;
pub mod session;
pub mod sources;
pub mod terminal;
pub mod transcript;

// Re-export commonly used types
pub use client::{ChatBackend, ChatReply, ChatRequest, HttpChatBackend};
pub use config::Config;
pub use controller::{ChatController, SubmissionOutcome, SubmissionState, SubmitControl};
pub use error::{Result, SitechatError};
pub use session::SessionId;
pub use transcript::{Speaker, Transcript, TranscriptView};

#[cfg(test)]
pub mod test_utils;
