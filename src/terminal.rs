//! Terminal rendering of the chat transcript
//!
//! Assistant bubbles carry the assistant's name, user bubbles the user
//! label. The placeholder is printed without a trailing newline so it can
//! be overwritten in place when the reply arrives.

use crate::config::MessagesConfig;
use crate::error::Result;
use crate::sources::{SourceBlock, SourceLink};
use crate::transcript::{MessageHandle, Speaker, Transcript, TranscriptView};

use colored::Colorize;
use std::fmt;
use std::io::Write;

/// Erase the current line and return the cursor to column 0
const CLEAR_LINE: &str = "\r\x1b[2K";

/// [`TranscriptView`] that prints to a writer
pub struct TerminalView<W: Write> {
    transcript: Transcript,
    out: W,
    decor: MessagesConfig,
    /// Placeholder still sitting on the last printed line
    pending: Option<MessageHandle>,
}

impl<W: Write> fmt::Debug for TerminalView<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalView")
            .field("transcript", &self.transcript)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl TerminalView<std::io::Stdout> {
    /// Render to standard output
    pub fn stdout(decor: MessagesConfig) -> Self {
        Self::new(std::io::stdout(), decor)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, decor: MessagesConfig) -> Self {
        Self {
            transcript: Transcript::new(),
            out,
            decor,
            pending: None,
        }
    }

    /// Messages rendered so far
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Consume the view and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn label(&self, speaker: Speaker) -> String {
        match speaker {
            Speaker::User => format!("[{}]", self.decor.user_label).bold().to_string(),
            Speaker::Assistant => format!("[{}]", self.decor.assistant_name)
                .cyan()
                .bold()
                .to_string(),
        }
    }

    fn write_bubble(&mut self, speaker: Speaker, text: &str, provisional: bool) {
        let label = self.label(speaker);
        let body = if provisional {
            text.dimmed().italic().to_string()
        } else {
            text.to_string()
        };
        let result = if provisional {
            write!(self.out, "{} {}", label, body)
        } else {
            writeln!(self.out, "{} {}", label, body)
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }

    fn write_sources(&mut self, block: &SourceBlock) {
        let mut lines = vec![format!("  {}", block.title.underline())];
        lines.extend(block.links.iter().map(|l| format!("  - {}", hyperlink(l))));
        for line in lines {
            if let Err(e) = writeln!(self.out, "{}", line) {
                tracing::warn!(error = %e, "Failed to write to terminal");
            }
        }
    }
}

/// OSC 8 hyperlink; terminals without support show the plain text
fn hyperlink(link: &SourceLink) -> String {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", link.href, link.text)
}

impl<W: Write> TranscriptView for TerminalView<W> {
    fn append(&mut self, speaker: Speaker, text: &str) -> MessageHandle {
        if self.pending.take().is_some() {
            let _ = writeln!(self.out);
        }

        let handle = self.transcript.append(speaker, text);
        let provisional = speaker == Speaker::Assistant;
        self.write_bubble(speaker, text, provisional);
        if provisional {
            self.pending = Some(handle);
        }
        self.scroll_to_latest();
        handle
    }

    fn finalize(
        &mut self,
        handle: MessageHandle,
        text: &str,
        sources: Option<SourceBlock>,
    ) -> Result<()> {
        self.transcript.finalize(handle, text, sources.clone())?;

        if self.pending == Some(handle) {
            self.pending = None;
            let _ = write!(self.out, "{}", CLEAR_LINE);
        } else if self.pending.take().is_some() {
            let _ = writeln!(self.out);
        }

        self.write_bubble(Speaker::Assistant, text, false);
        if let Some(block) = &sources {
            self.write_sources(block);
        }
        Ok(())
    }

    fn scroll_to_latest(&mut self) {
        self.transcript.scroll_to_latest();
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "Failed to flush terminal");
        }
    }
}
