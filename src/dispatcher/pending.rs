//! Partially typed command

use crate::constants::limits::MAX_COUNT;
use crate::handlers::{Binding, PendingOperator};
use crate::key::{format_keys, KeyEvent};
use std::sync::Arc;

/// Count, register, operator and trigger keys gathered so far. Cleared
/// after every completed command, error or cancel.
#[derive(Debug, Default)]
pub struct PendingCommand {
    pub count: Option<usize>,
    pub register: Option<char>,
    /// `"` typed, register name next
    pub awaiting_register: bool,
    pub operator: Option<PendingOperator>,
    /// Trigger keys typed so far (`g` of `gg`)
    pub keys: Vec<KeyEvent>,
    /// Handler waiting for its character argument
    pub awaiting_arg: Option<Arc<Binding>>,
    /// Everything typed for this command, for display
    pub typed: Vec<KeyEvent>,
}

impl PendingCommand {
    pub fn is_empty(&self) -> bool {
        self.count.is_none()
            && self.register.is_none()
            && !self.awaiting_register
            && self.operator.is_none()
            && self.keys.is_empty()
            && self.awaiting_arg.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Next key is taken literally, so mappings must not apply
    pub fn awaits_literal(&self) -> bool {
        self.awaiting_register || self.awaiting_arg.is_some()
    }

    pub fn push_digit(&mut self, digit: u32) {
        let count = self.count.unwrap_or(0);
        let count = count.saturating_mul(10).saturating_add(digit as usize);
        self.count = Some(count.min(MAX_COUNT));
    }

    pub fn display(&self) -> String {
        format_keys(&self.typed)
    }
}

/// Counts typed before and after an operator multiply
pub fn combine_counts(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(1).saturating_mul(b.unwrap_or(1)).min(MAX_COUNT)),
    }
}
