//! Status message stream
//! Messages the host surfaces in its status line, newest last

use crate::error::ErrorSeverity;
use std::collections::VecDeque;

/// Messages kept before the oldest is dropped
pub const MESSAGE_HISTORY: usize = 200;

/// Types of status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Informational message (e.g. `:set ts?` output)
    Info,
    /// Warning message (e.g. search hit BOTTOM)
    Warning,
    /// Error message
    Error,
}

impl From<ErrorSeverity> for MessageKind {
    fn from(severity: ErrorSeverity) -> Self {
        match severity {
            ErrorSeverity::Info => MessageKind::Info,
            ErrorSeverity::Warning => MessageKind::Warning,
            ErrorSeverity::Error | ErrorSeverity::Critical => MessageKind::Error,
        }
    }
}

/// A single status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Unique identifier
    pub id: u64,
    /// The type/severity of the message
    pub kind: MessageKind,
    /// The message content
    pub text: String,
}

/// Bounded log of status messages for one session
#[derive(Debug)]
pub struct MessageLog {
    messages: VecDeque<Message>,
    next_id: u64,
    /// Monotonic generation counter for change detection
    pub generation: u64,
}

impl MessageLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            next_id: 0,
            generation: 0,
        }
    }

    /// Append a message, dropping the oldest one when full
    pub fn push(&mut self, kind: MessageKind, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.messages.len() == MESSAGE_HISTORY {
            self.messages.pop_front();
        }
        self.messages.push_back(Message {
            id,
            kind,
            text: text.into(),
        });
        self.generation += 1;
        id
    }

    pub fn info(&mut self, text: impl Into<String>) -> u64 {
        self.push(MessageKind::Info, text)
    }

    pub fn warn(&mut self, text: impl Into<String>) -> u64 {
        self.push(MessageKind::Warning, text)
    }

    pub fn error(&mut self, text: impl Into<String>) -> u64 {
        self.push(MessageKind::Error, text)
    }

    /// Most recent message, if any
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Remove and return all messages (host consumed them)
    pub fn drain(&mut self) -> Vec<Message> {
        if self.messages.is_empty() {
            return Vec::new();
        }
        self.generation += 1;
        self.messages.drain(..).collect()
    }

    pub fn clear(&mut self) {
        if !self.messages.is_empty() {
            self.messages.clear();
            self.generation += 1;
        }
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}
