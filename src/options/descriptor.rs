//! Option descriptor types
//! Type definitions for declarative option configuration

use crate::constants::errors::{
    DIGIT_EXPECTED, ILLEGAL_MODE, ILLEGAL_PERCENTAGE, INVALID_ARGUMENT, INVALID_VALUE,
    MISSING_COLON, UNKNOWN_OPTION,
};
use crate::error::{EngineError, ErrorType};
use std::fmt;

/// Typed option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Number(i64),
    String(String),
    /// Comma-separated list, stored split
    List(Vec<String>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "boolean",
            OptionValue::Number(_) => "number",
            OptionValue::String(_) => "string",
            OptionValue::List(_) => "list",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", if *b { "on" } else { "off" }),
            OptionValue::Number(n) => write!(f, "{n}"),
            OptionValue::String(s) => f.write_str(s),
            OptionValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Declared option type for parsing and validation
#[derive(Debug, Clone, Copy)]
pub enum OptionType {
    /// Boolean option (on/off, set with `opt` / `noopt`)
    Boolean,
    /// Number with optional inclusive bounds
    Number { min: Option<i64>, max: Option<i64> },
    /// String, optionally limited to a set of enumerants
    String {
        allowed: Option<&'static [&'static str]>,
    },
    /// Comma-separated list, optionally limited to a set of items
    List {
        allowed: Option<&'static [&'static str]>,
        /// Drop duplicate items when adding
        dedup: bool,
    },
}

impl OptionType {
    pub fn name(&self) -> &'static str {
        match self {
            OptionType::Boolean => "boolean",
            OptionType::Number { .. } => "number",
            OptionType::String { .. } => "string",
            OptionType::List { .. } => "list",
        }
    }

    /// Whether `value` has the runtime type this descriptor declares
    pub fn accepts(&self, value: &OptionValue) -> bool {
        matches!(
            (self, value),
            (OptionType::Boolean, OptionValue::Bool(_))
                | (OptionType::Number { .. }, OptionValue::Number(_))
                | (OptionType::String { .. }, OptionValue::String(_))
                | (OptionType::List { .. }, OptionValue::List(_))
        )
    }
}

/// Where an option's value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    /// One process-wide value
    Global,
    /// Global default plus per-buffer overrides
    Buffer,
}

/// Structured error for option operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// Unknown option name
    UnknownOption(String),
    /// Name prefix matches several options
    Ambiguous { prefix: String, matches: Vec<String> },
    /// Value could not be parsed, or the operation does not apply to the type
    InvalidArgument(String),
    /// Value parsed but failed validation (range, enumerant)
    InvalidValue(String),
    /// guicursor token without a colon
    MissingColon(String),
    /// guicursor token naming an unknown mode
    IllegalMode(String),
    /// guicursor shape keyword without a number
    DigitExpected(String),
    /// guicursor thickness outside 1..=100
    IllegalPercentage(String),
}

impl OptionError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            OptionError::UnknownOption(_) | OptionError::Ambiguous { .. } => UNKNOWN_OPTION,
            OptionError::InvalidArgument(_) => INVALID_ARGUMENT,
            OptionError::InvalidValue(_) => INVALID_VALUE,
            OptionError::MissingColon(_) => MISSING_COLON,
            OptionError::IllegalMode(_) => ILLEGAL_MODE,
            OptionError::DigitExpected(_) => DIGIT_EXPECTED,
            OptionError::IllegalPercentage(_) => ILLEGAL_PERCENTAGE,
        }
    }

    /// The offending token or name
    pub fn token(&self) -> &str {
        match self {
            OptionError::UnknownOption(s)
            | OptionError::InvalidArgument(s)
            | OptionError::InvalidValue(s)
            | OptionError::MissingColon(s)
            | OptionError::IllegalMode(s)
            | OptionError::DigitExpected(s)
            | OptionError::IllegalPercentage(s) => s,
            OptionError::Ambiguous { prefix, .. } => prefix,
        }
    }
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::UnknownOption(name) => write!(f, "Unknown option: {name}"),
            OptionError::Ambiguous { prefix, matches } => {
                write!(f, "Unknown option: {prefix} (matches {})", matches.join(", "))
            }
            OptionError::InvalidArgument(arg) => write!(f, "Invalid argument: {arg}"),
            OptionError::InvalidValue(arg) => write!(f, "Invalid value: {arg}"),
            OptionError::MissingColon(token) => write!(f, "Missing colon: {token}"),
            OptionError::IllegalMode(token) => write!(f, "Illegal mode: {token}"),
            OptionError::DigitExpected(token) => write!(f, "Digit expected: {token}"),
            OptionError::IllegalPercentage(token) => write!(f, "Illegal percentage: {token}"),
        }
    }
}

impl std::error::Error for OptionError {}

impl From<OptionError> for EngineError {
    fn from(err: OptionError) -> Self {
        let kind = match err {
            OptionError::InvalidArgument(_) => ErrorType::Parse,
            _ => ErrorType::Options,
        };
        EngineError::new(kind, err.code(), err.to_string())
    }
}

/// Extra validation beyond the declared type
///
/// Function pointers (not trait objects) for static dispatch.
pub type OptionValidator = fn(&OptionValue) -> Result<(), OptionError>;

/// Option descriptor
#[derive(Debug, Clone, Copy)]
pub struct OptionDescriptor {
    /// Canonical option name (e.g., "ignorecase")
    pub name: &'static str,
    /// Short aliases (e.g., &["ic"])
    pub aliases: &'static [&'static str],
    pub ty: OptionType,
    pub locality: Locality,
    /// Default in `:set opt=value` syntax
    pub default: &'static str,
    pub validate: Option<OptionValidator>,
}
