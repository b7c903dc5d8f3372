//! Transient one-line status messages

use std::time::Duration;

/// How long a status message stays visible
pub const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(15);

/// A message shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Duration,
}

/// Holds at most one message; newer messages replace older ones
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    message: Option<StatusMessage>,
}

impl StatusLine {
    pub fn set(&mut self, text: impl Into<String>, is_error: bool, now: Duration) {
        self.message = Some(StatusMessage {
            text: text.into(),
            is_error,
            shown_at: now,
        });
    }

    /// The current message, unless it has expired
    pub fn current(&self, now: Duration) -> Option<&StatusMessage> {
        self.message
            .as_ref()
            .filter(|msg| now.saturating_sub(msg.shown_at) < STATUS_MESSAGE_TTL)
    }

    /// The most recent message regardless of age
    pub fn last(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn clear(&mut self) {
        self.message = None;
    }
}
