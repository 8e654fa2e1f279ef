//! Debounced host selection notifications
//!
//! Hosts often clear and re-set a selection inside one logical edit. Each
//! notification replaces the pending one and pushes the deadline out; the
//! session polls with the current time and only a change that survives
//! the settle delay is applied.

use crate::buffer::TextRange;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSelection {
    selection: TextRange,
    deadline: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionDebouncer {
    pending: Option<PendingSelection>,
}

impl SelectionDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a host selection change, cancelling any pending one.
    /// An empty range means the selection was removed.
    pub fn notify(&mut self, selection: TextRange, now: Instant, delay: Duration) {
        self.pending = Some(PendingSelection {
            selection,
            deadline: now + delay,
        });
    }

    /// Settled selection, if the pending change has outlived its delay
    pub fn poll(&mut self, now: Instant) -> Option<TextRange> {
        match self.pending {
            Some(p) if now >= p.deadline => {
                self.pending = None;
                Some(p.selection)
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
