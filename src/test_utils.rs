//! Test utilities for Sitechat
//!
//! This module provides common test utilities: temporary files for config
//! tests, a scripted chat backend, and a transcript view that can be
//! inspected from outside the controller.

use crate::client::{ChatBackend, ChatReply, ChatRequest};
use crate::controller::SubmitControl;
use crate::error::{Result, SitechatError};
use crate::sources::SourceBlock;
use crate::transcript::{Message, MessageHandle, Speaker, Transcript, TranscriptView};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// One scripted backend answer
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// A 2xx reply with this JSON body
    Json(serde_json::Value),
    /// A transport failure
    Fail,
    /// A request that never completes
    Hang,
}

impl FakeReply {
    pub fn json(body: serde_json::Value) -> Self {
        Self::Json(body)
    }
}

/// What the fake backend saw while a request was in flight
#[derive(Debug, Default)]
pub struct Probe {
    /// Submit control to sample during `send`
    pub control: Option<SubmitControl>,
    /// View to snapshot during `send`
    pub transcript: Option<SharedTranscript>,
    /// `is_enabled()` of `control`, one sample per call
    pub enabled_during_send: Vec<bool>,
    /// Transcript contents at the time of the last call
    pub messages_during_send: Vec<Message>,
}

/// Chat backend answering from a script
pub struct FakeBackend {
    replies: Mutex<VecDeque<FakeReply>>,
    calls: Arc<Mutex<Vec<ChatRequest>>>,
    probe: Arc<Mutex<Probe>>,
}

impl FakeBackend {
    pub fn new(replies: Vec<FakeReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
            probe: Arc::new(Mutex::new(Probe::default())),
        }
    }

    /// Requests received so far
    pub fn calls(&self) -> Arc<Mutex<Vec<ChatRequest>>> {
        Arc::clone(&self.calls)
    }

    /// Shared probe filled in during each `send`
    pub fn probe(&self) -> Arc<Mutex<Probe>> {
        Arc::clone(&self.probe)
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.calls.lock().unwrap().push(request.clone());

        {
            let mut probe = self.probe.lock().unwrap();
            if let Some(enabled) = probe.control.as_ref().map(SubmitControl::is_enabled) {
                probe.enabled_during_send.push(enabled);
            }
            if let Some(messages) = probe.transcript.as_ref().map(SharedTranscript::snapshot) {
                probe.messages_during_send = messages;
            }
        }

        tokio::task::yield_now().await;

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(FakeReply::Json(body)) => ChatReply::from_json(body),
            Some(FakeReply::Hang) => std::future::pending().await,
            Some(FakeReply::Fail) => {
                Err(SitechatError::Transport("connection refused".to_string()).into())
            }
            None => Err(SitechatError::Transport("no scripted reply".to_string()).into()),
        }
    }
}

/// Transcript view shared between the controller and the test body
#[derive(Debug, Clone, Default)]
pub struct SharedTranscript {
    inner: Arc<Mutex<Transcript>>,
}

impl SharedTranscript {
    /// Copy of the current messages
    pub fn snapshot(&self) -> Vec<Message> {
        self.inner.lock().unwrap().messages().to_vec()
    }
}

impl TranscriptView for SharedTranscript {
    fn append(&mut self, speaker: Speaker, text: &str) -> MessageHandle {
        self.inner.lock().unwrap().append(speaker, text)
    }

    fn finalize(
        &mut self,
        handle: MessageHandle,
        text: &str,
        sources: Option<SourceBlock>,
    ) -> Result<()> {
        self.inner.lock().unwrap().finalize(handle, text, sources)
    }

    fn scroll_to_latest(&mut self) {
        self.inner.lock().unwrap().scroll_to_latest();
    }
}
