//! Text buffer used when the host has no document model of its own
//!
//! `TextBuffer` keeps the document as a vector of code-points plus a line
//! start index rebuilt after each edit. It backs tests, benches and the
//! `rift-keys` binary; real hosts implement [`BufferMut`] over their own
//! storage.

pub mod api;

pub use api::{BufferId, BufferMut, BufferView, Position, TextRange};

use crate::constants::errors::BUFFER_RANGE;
use crate::error::{EngineError, ErrorType, Result};
use std::fmt;

/// Simple in-memory document
#[derive(Debug, Clone)]
pub struct TextBuffer {
    id: BufferId,
    text: Vec<char>,
    line_starts: Vec<usize>,
    revision: u64,
}

impl TextBuffer {
    /// Create a buffer with a freshly allocated id
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self::with_id(BufferId::next(), text)
    }

    #[must_use]
    pub fn with_id(id: BufferId, text: &str) -> Self {
        let mut buffer = TextBuffer {
            id,
            text: text.chars().collect(),
            line_starts: Vec::new(),
            revision: 0,
        };
        buffer.reindex();
        buffer
    }

    fn reindex(&mut self) {
        self.line_starts.clear();
        self.line_starts.push(0);
        for (i, &c) in self.text.iter().enumerate() {
            if c == '\n' {
                self.line_starts.push(i + 1);
            }
        }
    }

    fn check_range(&self, range: TextRange) -> Result<()> {
        if range.start > range.end || range.end > self.text.len() {
            return Err(EngineError::new(
                ErrorType::Internal,
                BUFFER_RANGE,
                format!(
                    "Range {}..{} out of bounds (len: {})",
                    range.start,
                    range.end,
                    self.text.len()
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.text.iter().collect();
        f.write_str(&s)
    }
}

impl BufferView for TextBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_start(&self, line: usize) -> usize {
        match self.line_starts.get(line) {
            Some(&start) => start,
            None => self.text.len(),
        }
    }

    fn line_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(&next) => next - 1,
            None => self.text.len(),
        }
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(offset).copied()
    }

    fn slice(&self, range: TextRange) -> String {
        let end = range.end.min(self.text.len());
        let start = range.start.min(end);
        self.text[start..end].iter().collect()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn line_of_offset(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }
}

impl BufferMut for TextBuffer {
    fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.check_range(TextRange::new(offset, offset))?;
        if text.is_empty() {
            return Ok(());
        }
        let tail = self.text.split_off(offset);
        self.text.extend(text.chars());
        self.text.extend(tail);
        self.reindex();
        self.revision += 1;
        Ok(())
    }

    fn delete(&mut self, range: TextRange) -> Result<String> {
        self.check_range(range)?;
        if range.is_empty() {
            return Ok(String::new());
        }
        let removed: String = self.text.drain(range.start..range.end).collect();
        self.reindex();
        self.revision += 1;
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
