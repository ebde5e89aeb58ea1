//! Conversation state for one chat thread.
//!
//! The transcript, session id, draft prompt, busy flag and status line
//! are owned exclusively by the orchestrator; nothing else mutates
//! them.

use kai_core::Message;

/// Default status line shown when no turn is in flight.
pub const STATUS_READY: &str = "Ready.";

/// The full local state of one chat thread.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Opaque session identifier, absent until the first successful
    /// session creation, then fixed for the conversation's lifetime.
    pub session_id: Option<String>,
    /// Ordered transcript. Order is the context sent to the
    /// generation service.
    pub messages: Vec<Message>,
    /// The prompt currently being typed.
    pub draft: String,
    /// True for the entire duration of one in-flight turn.
    pub busy: bool,
    /// Human-readable progress or error summary.
    pub status: String,
}

impl Conversation {
    /// Create a new empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_id: None,
            messages: Vec::new(),
            draft: String::new(),
            busy: false,
            status: STATUS_READY.to_string(),
        }
    }

    /// Replace the draft prompt.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Get message count.
    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Check if the transcript is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
