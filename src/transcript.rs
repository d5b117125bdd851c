//! Chat transcript model and the view seam
//!
//! The transcript is an append-only list of messages for one run. Views
//! render it (the terminal renderer in [`crate::terminal`]) and hand out
//! [`MessageHandle`]s so the controller can fill in a placeholder once the
//! reply arrives.

use crate::error::{Result, SitechatError};
use crate::sources::SourceBlock;
use std::fmt;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Whether a message may still be replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    /// Placeholder awaiting its single replacement
    Provisional,
    /// Final; never changes again
    Final,
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
    pub sources: Option<SourceBlock>,
    pub state: MessageState,
}

impl Message {
    /// Source URLs attached to this message, in order
    pub fn source_urls(&self) -> Vec<&str> {
        self.sources.as_ref().map(|s| s.urls()).unwrap_or_default()
    }
}

/// Position of a message in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle(usize);

impl MessageHandle {
    /// Zero-based index of the message
    pub fn index(self) -> usize {
        self.0
    }
}

/// Anything that can display the chat transcript
///
/// Mirrors the operations the chat controller needs from the page: append a
/// bubble, fill in a placeholder exactly once, and keep the newest entry in
/// view.
pub trait TranscriptView {
    /// Append a message and scroll it into view
    ///
    /// User messages are final immediately. Assistant messages start
    /// provisional and must be finalized through the returned handle.
    fn append(&mut self, speaker: Speaker, text: &str) -> MessageHandle;

    /// Replace a provisional message's text and attach optional sources
    ///
    /// # Errors
    ///
    /// Returns error if the handle is unknown or the message is already final
    fn finalize(
        &mut self,
        handle: MessageHandle,
        text: &str,
        sources: Option<SourceBlock>,
    ) -> Result<()>;

    /// Bring the newest entry into view
    fn scroll_to_latest(&mut self);
}

/// Headless, in-memory transcript
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    scroll_position: usize,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a message by handle
    pub fn get(&self, handle: MessageHandle) -> Option<&Message> {
        self.messages.get(handle.0)
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing has been said yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages written by `speaker`
    pub fn count(&self, speaker: Speaker) -> usize {
        self.messages.iter().filter(|m| m.speaker == speaker).count()
    }

    /// Index of the entry currently scrolled into view
    pub fn scroll_position(&self) -> usize {
        self.scroll_position
    }
}

impl TranscriptView for Transcript {
    fn append(&mut self, speaker: Speaker, text: &str) -> MessageHandle {
        let state = match speaker {
            Speaker::User => MessageState::Final,
            Speaker::Assistant => MessageState::Provisional,
        };
        self.messages.push(Message {
            speaker,
            text: text.to_string(),
            sources: None,
            state,
        });
        self.scroll_to_latest();
        MessageHandle(self.messages.len() - 1)
    }

    fn finalize(
        &mut self,
        handle: MessageHandle,
        text: &str,
        sources: Option<SourceBlock>,
    ) -> Result<()> {
        let message = self.messages.get_mut(handle.0).ok_or_else(|| {
            SitechatError::Transcript(format!("no message at index {}", handle.0))
        })?;

        if message.state == MessageState::Final {
            return Err(SitechatError::Transcript(format!(
                "message {} already finalized",
                handle.0
            ))
            .into());
        }

        message.text = text.to_string();
        message.sources = sources;
        message.state = MessageState::Final;
        Ok(())
    }

    fn scroll_to_latest(&mut self) {
        self.scroll_position = self.messages.len().saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{render_sources, SourceEntry};

    #[test]
    fn test_append_returns_sequential_handles() {
        let mut transcript = Transcript::new();
        let a = transcript.append(Speaker::User, "bonjour");
        let b = transcript.append(Speaker::Assistant, "...");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.scroll_position(), 1);
    }

    #[test]
    fn test_user_messages_are_final() {
        let mut transcript = Transcript::new();
        let handle = transcript.append(Speaker::User, "question");
        assert_eq!(transcript.get(handle).unwrap().state, MessageState::Final);
        assert!(transcript.finalize(handle, "edited", None).is_err());
        assert_eq!(transcript.get(handle).unwrap().text, "question");
    }

    #[test]
    fn test_placeholder_is_replaced_exactly_once() {
        let mut transcript = Transcript::new();
        let handle = transcript.append(Speaker::Assistant, "Recherche en cours...");
        assert_eq!(
            transcript.get(handle).unwrap().state,
            MessageState::Provisional
        );

        let sources = render_sources(&[SourceEntry::new("https://a")], 4, "Sources");
        transcript.finalize(handle, "Réponse", sources).unwrap();

        let message = transcript.get(handle).unwrap();
        assert_eq!(message.text, "Réponse");
        assert_eq!(message.source_urls(), ["https://a"]);
        assert_eq!(message.state, MessageState::Final);

        let err = transcript.finalize(handle, "again", None).unwrap_err();
        assert!(err.to_string().contains("already finalized"));
        assert_eq!(transcript.get(handle).unwrap().text, "Réponse");
    }

    #[test]
    fn test_finalize_unknown_handle() {
        let mut transcript = Transcript::new();
        assert!(transcript.finalize(MessageHandle(7), "x", None).is_err());
    }

    #[test]
    fn test_empty_text_is_accepted() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::User, "");
        assert_eq!(transcript.last().unwrap().text, "");
    }

    #[test]
    fn test_count_by_speaker() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::User, "q1");
        transcript.append(Speaker::Assistant, "a1");
        transcript.append(Speaker::User, "q2");
        assert_eq!(transcript.count(Speaker::User), 2);
        assert_eq!(transcript.count(Speaker::Assistant), 1);
    }
}
