//! Error Manager
//! Routes engine errors into the session message stream

use crate::error::messages::MessageLog;
use crate::error::{EngineError, ErrorSeverity};

/// Manages errors and their presentation to the user
#[derive(Debug, Default)]
pub struct ErrorManager {
    messages: MessageLog,
}

impl ErrorManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: MessageLog::new(),
        }
    }

    /// Record an error in the message stream according to its severity
    pub fn handle(&mut self, err: &EngineError) {
        let text = err.status_line();
        match err.severity {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::warn!(code = %err.code, kind = %err.kind, "{}", err.message);
                self.messages.error(text);
            }
            ErrorSeverity::Warning => {
                tracing::debug!(code = %err.code, "{}", err.message);
                self.messages.warn(text);
            }
            ErrorSeverity::Info => {
                self.messages.info(text);
            }
        }
    }

    #[must_use]
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageLog {
        &mut self.messages
    }
}
