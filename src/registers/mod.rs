//! Register storage
//!
//! Named slots for yanked and deleted text. `"` is the unnamed register,
//! `0` holds the last yank, `1`-`9` shift on multi-line deletes, `-`
//! holds small deletes and `_` discards. Uppercase names append to their
//! lowercase register.

use crate::constants::errors::INVALID_REGISTER;
use crate::error::{EngineError, ErrorType, Result};
use std::collections::HashMap;

pub const UNNAMED: char = '"';
pub const YANK: char = '0';
pub const SMALL_DELETE: char = '-';
pub const BLACK_HOLE: char = '_';

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Register {
    pub text: String,
    /// Put as whole lines
    pub linewise: bool,
}

impl Register {
    pub fn new(text: impl Into<String>, linewise: bool) -> Self {
        Self {
            text: text.into(),
            linewise,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registers {
    slots: HashMap<char, Register>,
}

/// Whether `name` may follow `"` in a command
pub fn is_valid(name: char) -> bool {
    name.is_ascii_alphanumeric() || matches!(name, '"' | '-' | '_' | '+' | '*')
}

pub fn validate(name: char) -> Result<char> {
    if is_valid(name) {
        Ok(name)
    } else {
        Err(EngineError::new(
            ErrorType::Input,
            INVALID_REGISTER,
            format!("Invalid register name: {name}"),
        ))
    }
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: char) -> Option<&Register> {
        self.slots.get(&name.to_ascii_lowercase())
    }

    /// Store into one register, appending for uppercase names
    pub fn set(&mut self, name: char, register: Register) {
        match name {
            BLACK_HOLE => {}
            'A'..='Z' => {
                let slot = self.slots.entry(name.to_ascii_lowercase()).or_default();
                if register.linewise && !slot.linewise && !slot.text.is_empty() {
                    slot.text.push('\n');
                }
                slot.text.push_str(&register.text);
                slot.linewise |= register.linewise;
            }
            _ => {
                self.slots.insert(name, register);
            }
        }
    }

    /// Record yanked text in `name` (or `0`) and the unnamed register
    pub fn record_yank(&mut self, name: Option<char>, register: Register) {
        match name {
            Some(BLACK_HOLE) => return,
            Some(n) if n != UNNAMED => self.set(n, register.clone()),
            _ => self.set(YANK, register.clone()),
        }
        self.slots.insert(UNNAMED, register);
    }

    /// Record deleted text. Without a name, multi-line deletes shift into
    /// `1`-`9` and small deletes go to `-`.
    pub fn record_delete(&mut self, name: Option<char>, register: Register) {
        match name {
            Some(BLACK_HOLE) => return,
            Some(n) if n != UNNAMED => self.set(n, register.clone()),
            _ if register.linewise || register.text.contains('\n') => {
                for n in (1..9u8).rev() {
                    let from = char::from(b'0' + n);
                    let to = char::from(b'0' + n + 1);
                    if let Some(r) = self.slots.remove(&from) {
                        self.slots.insert(to, r);
                    }
                }
                self.set('1', register.clone());
            }
            _ => self.set(SMALL_DELETE, register.clone()),
        }
        self.slots.insert(UNNAMED, register);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
