//! Centralized error handling for the engine
//! Defines common error types, severity levels, and error codes

pub mod manager;
pub mod messages;

pub use manager::ErrorManager;
pub use messages::{Message, MessageKind, MessageLog};

use std::fmt;

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational message (not really an error)
    Info,
    /// Warning - something might be wrong but operation can continue
    Warning,
    /// Standard error - operation failed but the session can continue
    Error,
    /// Critical error - engine state may be inconsistent
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Category of the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Key input that does not form a valid command
    Input,
    /// Command line or key notation parsing errors
    Parse,
    /// Option registry errors
    Options,
    /// Mapping definition or expansion errors
    Mapping,
    /// Pattern compilation errors
    Search,
    /// Init script errors
    Script,
    /// File system or I/O errors
    Io,
    /// Internal logic or invariant violations
    Internal,
    /// Errors that don't fit other categories
    Other,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "Input"),
            Self::Parse => write!(f, "Parse"),
            Self::Options => write!(f, "Options"),
            Self::Mapping => write!(f, "Mapping"),
            Self::Search => write!(f, "Search"),
            Self::Script => write!(f, "Script"),
            Self::Io => write!(f, "IO"),
            Self::Internal => write!(f, "Internal"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A structured engine error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// How serious the error is
    pub severity: ErrorSeverity,
    /// What kind of error occurred
    pub kind: ErrorType,
    /// Stable error code (e.g., "E545", "E_UNKNOWN_COMMAND")
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl EngineError {
    /// Create a new standard error (Severity: Error)
    pub fn new(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Error,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new critical error (Severity: Critical)
    pub fn critical(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Critical,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new warning (Severity: Warning)
    pub fn warning(kind: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Warning,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an input error (unknown command, bad key sequence)
    pub fn input(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorType::Input, code, message)
    }

    /// Check if the message contains a substring (useful for tests)
    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }

    /// Short line suitable for a status bar, e.g. `E545: Missing colon: whatever`
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("{}: {}", self.code, self.message)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}({}): {}",
            self.severity, self.kind, self.code, self.message
        )
    }
}

impl std::error::Error for EngineError {}

impl From<String> for EngineError {
    fn from(msg: String) -> Self {
        Self::new(ErrorType::Other, "GENERIC_ERROR", msg)
    }
}

impl From<&str> for EngineError {
    fn from(msg: &str) -> Self {
        Self::new(ErrorType::Other, "GENERIC_ERROR", msg)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorType::Io, "IO_ERROR", err.to_string())
    }
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
