//! Chat request controller
//!
//! Owns the lifecycle of one user submission:
//!
//! ```text
//! Idle -> Submitted -> AwaitingResponse -> Resolved | Failed -> Idle
//! ```
//!
//! The user bubble is appended before the placeholder, the placeholder
//! before the network call, and the network call before either terminal
//! branch. Every user message ends up with exactly one assistant message.

use crate::client::{ChatBackend, ChatRequest};
use crate::config::MessagesConfig;
use crate::session::SessionId;
use crate::sources::render_sources;
use crate::transcript::{Speaker, TranscriptView};

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Where a submission currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitted,
    AwaitingResponse,
    Resolved,
    Failed,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Submitted => write!(f, "submitted"),
            Self::AwaitingResponse => write!(f, "awaiting_response"),
            Self::Resolved => write!(f, "resolved"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// How a call to [`ChatController::submit`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Blank input, or the submit control was already disabled
    Ignored,
    /// The backend answered; the placeholder holds the answer or the fallback phrase
    Resolved,
    /// The request failed; the placeholder holds the error phrase
    Failed,
}

/// Shared enabled/disabled flag of the send control
///
/// Cloning yields another handle on the same flag, so a UI can watch it
/// while the controller owns the submission.
#[derive(Debug, Clone)]
pub struct SubmitControl {
    enabled: Arc<AtomicBool>,
}

impl SubmitControl {
    /// A new, enabled control
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether a submission may start
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Disable the control until the returned guard is dropped
    fn disable(&self) -> SubmitGuard {
        self.enabled.store(false, Ordering::SeqCst);
        SubmitGuard {
            control: self.clone(),
        }
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-enables the submit control on every exit path, including a dropped
/// submission future
struct SubmitGuard {
    control: SubmitControl,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.control.enabled.store(true, Ordering::SeqCst);
    }
}

/// Drives submissions from an input value through a backend into a view
///
/// # Examples
///
/// ```no_run
/// use sitechat::client::HttpChatBackend;
/// use sitechat::config::Config;
/// use sitechat::controller::ChatController;
/// use sitechat::session::SessionId;
/// use sitechat::transcript::Transcript;
///
/// # async fn example() -> sitechat::error::Result<()> {
/// let config = Config::default();
/// let backend = HttpChatBackend::from_config(&config.chat)?;
/// let mut controller = ChatController::new(
///     backend,
///     Transcript::new(),
///     SessionId::generate(),
///     config.messages.clone(),
///     config.chat.max_sources,
/// );
/// controller.set_input("Quels sont les horaires ?");
/// controller.submit().await;
/// # Ok(())
/// # }
/// ```
pub struct ChatController<B, V> {
    backend: B,
    view: V,
    session: SessionId,
    messages: MessagesConfig,
    max_sources: usize,
    input: String,
    submit: SubmitControl,
    state: SubmissionState,
}

impl<B: ChatBackend, V: TranscriptView> ChatController<B, V> {
    /// Create a controller with its injected backend, view, and session token
    pub fn new(
        backend: B,
        view: V,
        session: SessionId,
        messages: MessagesConfig,
        max_sources: usize,
    ) -> Self {
        Self {
            backend,
            view,
            session,
            messages,
            max_sources,
            input: String::new(),
            submit: SubmitControl::new(),
            state: SubmissionState::Idle,
        }
    }

    /// Replace the current input value
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Current input value
    pub fn input(&self) -> &str {
        &self.input
    }

    /// A handle on the submit control's flag
    pub fn submit_control(&self) -> SubmitControl {
        self.submit.clone()
    }

    /// Current submission state
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// The session token sent with every request
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// The backend requests are sent to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The view the transcript is rendered into
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Consume the controller and return its view
    pub fn into_view(self) -> V {
        self.view
    }

    /// Submit the current input
    ///
    /// Blank input is a no-op. Otherwise appends the user bubble and a
    /// placeholder, clears the input, disables the submit control, and
    /// awaits the backend. The placeholder is then replaced with the
    /// answer, the fallback phrase, or the error phrase. The control is
    /// re-enabled and the view re-scrolled no matter which branch ran.
    pub async fn submit(&mut self) -> SubmissionOutcome {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            tracing::debug!("Ignoring blank submission");
            return SubmissionOutcome::Ignored;
        }
        if !self.submit.is_enabled() {
            tracing::debug!("Submit control disabled, ignoring submission");
            return SubmissionOutcome::Ignored;
        }

        self.transition(SubmissionState::Submitted);
        self.view.append(Speaker::User, &text);
        let placeholder = self.view.append(Speaker::Assistant, &self.messages.placeholder);
        self.input.clear();
        let guard = self.submit.disable();
        self.transition(SubmissionState::AwaitingResponse);

        let request = ChatRequest::new(text, &self.session);
        let (outcome, reply_text, sources) = match self.backend.send(&request).await {
            Ok(reply) => {
                let answer = reply
                    .answer
                    .unwrap_or_else(|| self.messages.fallback_answer.clone());
                let sources = render_sources(
                    &reply.sources,
                    self.max_sources,
                    &self.messages.sources_title,
                );
                (SubmissionOutcome::Resolved, answer, sources)
            }
            Err(e) => {
                tracing::error!(error = %e, session_id = %self.session, "Chat request failed");
                (SubmissionOutcome::Failed, self.messages.error.clone(), None)
            }
        };

        self.transition(match outcome {
            SubmissionOutcome::Failed => SubmissionState::Failed,
            _ => SubmissionState::Resolved,
        });

        if let Err(e) = self.view.finalize(placeholder, &reply_text, sources) {
            tracing::warn!(error = %e, "Could not finalize assistant message");
        }

        drop(guard);
        self.view.scroll_to_latest();
        self.transition(SubmissionState::Idle);

        outcome
    }

    fn transition(&mut self, next: SubmissionState) {
        tracing::debug!(from = %self.state, to = %next, "Submission state change");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeBackend, FakeReply, SharedTranscript};
    use crate::transcript::{MessageState, Transcript};

    fn controller(backend: FakeBackend) -> ChatController<FakeBackend, Transcript> {
        ChatController::new(
            backend,
            Transcript::new(),
            SessionId::from("test-session"),
            MessagesConfig::default(),
            4,
        )
    }

    #[tokio::test]
    async fn test_blank_input_is_noop() {
        let backend = FakeBackend::new(vec![]);
        let calls = backend.calls();
        let mut controller = controller(backend);

        for input in ["", "   ", "\n\t "] {
            controller.set_input(input);
            assert_eq!(controller.submit().await, SubmissionOutcome::Ignored);
        }

        assert!(controller.view().is_empty());
        assert!(controller.submit_control().is_enabled());
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolved_submission() {
        let backend = FakeBackend::new(vec![FakeReply::json(serde_json::json!({
            "answer": "X",
            "sources": [{"url": "a"}, {"url": "b"}]
        }))]);
        let calls = backend.calls();
        let mut controller = controller(backend);

        controller.set_input("  Bonjour  ");
        assert_eq!(controller.submit().await, SubmissionOutcome::Resolved);

        let transcript = controller.view();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].speaker, Speaker::User);
        assert_eq!(transcript.messages()[0].text, "Bonjour");
        let reply = &transcript.messages()[1];
        assert_eq!(reply.speaker, Speaker::Assistant);
        assert_eq!(reply.text, "X");
        assert_eq!(reply.source_urls(), ["a", "b"]);
        assert_eq!(reply.state, MessageState::Final);

        assert_eq!(controller.input(), "");
        assert!(controller.submit_control().is_enabled());
        assert_eq!(controller.state(), SubmissionState::Idle);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].message, "Bonjour");
        assert_eq!(calls[0].session_id.as_str(), "test-session");
    }

    #[tokio::test]
    async fn test_missing_answer_uses_fallback_phrase() {
        let backend = FakeBackend::new(vec![FakeReply::json(serde_json::json!({}))]);
        let mut controller = controller(backend);

        controller.set_input("Question");
        assert_eq!(controller.submit().await, SubmissionOutcome::Resolved);

        let reply = controller.view().last().unwrap();
        assert_eq!(reply.text, "Je n'ai pas de réponse pour l'instant.");
        assert!(reply.sources.is_none());
    }

    #[tokio::test]
    async fn test_six_sources_truncated_to_four() {
        let sources: Vec<_> = (1..=6)
            .map(|i| serde_json::json!({"url": format!("https://s/{i}")}))
            .collect();
        let backend = FakeBackend::new(vec![FakeReply::json(serde_json::json!({
            "answer": "ok",
            "sources": sources
        }))]);
        let mut controller = controller(backend);

        controller.set_input("Question");
        controller.submit().await;

        assert_eq!(
            controller.view().last().unwrap().source_urls(),
            ["https://s/1", "https://s/2", "https://s/3", "https://s/4"]
        );
    }

    #[tokio::test]
    async fn test_failure_shows_error_phrase_and_reenables() {
        let backend = FakeBackend::new(vec![FakeReply::Fail]);
        let mut controller = controller(backend);

        controller.set_input("Question");
        assert_eq!(controller.submit().await, SubmissionOutcome::Failed);

        let reply = controller.view().last().unwrap();
        assert_eq!(reply.text, "Erreur : impossible de joindre le serveur.");
        assert!(reply.sources.is_none());
        assert!(controller.submit_control().is_enabled());
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_submit_control_disabled_only_in_flight() {
        let backend = FakeBackend::new(vec![
            FakeReply::json(serde_json::json!({"answer": "one"})),
            FakeReply::Fail,
        ]);
        let probe = backend.probe();
        let mut controller = controller(backend);
        probe.lock().unwrap().control = Some(controller.submit_control());

        assert!(controller.submit_control().is_enabled());
        controller.set_input("first");
        controller.submit().await;
        assert!(controller.submit_control().is_enabled());
        controller.set_input("second");
        controller.submit().await;
        assert!(controller.submit_control().is_enabled());

        assert_eq!(probe.lock().unwrap().enabled_during_send, [false, false]);
    }

    #[tokio::test]
    async fn test_one_assistant_message_per_user_message() {
        let backend = FakeBackend::new(vec![
            FakeReply::json(serde_json::json!({"answer": "a"})),
            FakeReply::Fail,
            FakeReply::json(serde_json::json!({"sources": [{"url": "u"}]})),
        ]);
        let mut controller = controller(backend);

        for input in ["q1", "   ", "q2", "q3"] {
            controller.set_input(input);
            controller.submit().await;
        }

        let transcript = controller.view();
        assert_eq!(transcript.count(Speaker::User), 3);
        assert_eq!(transcript.count(Speaker::Assistant), 3);
        let speakers: Vec<_> = transcript.messages().iter().map(|m| m.speaker).collect();
        assert_eq!(
            speakers,
            [
                Speaker::User,
                Speaker::Assistant,
                Speaker::User,
                Speaker::Assistant,
                Speaker::User,
                Speaker::Assistant
            ]
        );
        assert!(transcript
            .messages()
            .iter()
            .all(|m| m.state == MessageState::Final));
    }

    #[tokio::test]
    async fn test_placeholder_visible_while_awaiting() {
        let backend =
            FakeBackend::new(vec![FakeReply::json(serde_json::json!({"answer": "done"}))]);
        let probe = backend.probe();
        let view = SharedTranscript::default();
        probe.lock().unwrap().transcript = Some(view.clone());
        let mut controller = ChatController::new(
            backend,
            view.clone(),
            SessionId::from("s"),
            MessagesConfig::default(),
            4,
        );

        controller.set_input("Question");
        controller.submit().await;

        let seen = probe.lock().unwrap().messages_during_send.clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].text, "Question");
        assert_eq!(seen[1].text, "Recherche en cours...");
        assert_eq!(seen[1].state, MessageState::Provisional);

        let after = view.snapshot();
        assert_eq!(after.len(), 2);
        assert_eq!(after[1].text, "done");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submission_reenables_control() {
        let backend = FakeBackend::new(vec![
            FakeReply::Hang,
            FakeReply::json(serde_json::json!({"answer": "second"})),
        ]);
        let mut controller = controller(backend);
        let control = controller.submit_control();

        controller.set_input("Question");
        let abandoned =
            tokio::time::timeout(std::time::Duration::from_secs(30), controller.submit()).await;
        assert!(abandoned.is_err());

        assert!(control.is_enabled());
        let placeholder = controller.view().last().unwrap();
        assert_eq!(placeholder.text, "Recherche en cours...");
        assert_eq!(placeholder.state, MessageState::Provisional);

        controller.set_input("Again");
        assert_eq!(controller.submit().await, SubmissionOutcome::Resolved);
        assert_eq!(controller.view().last().unwrap().text, "second");
        assert_eq!(controller.state(), SubmissionState::Idle);
    }
}
