//! Buffer abstraction layer
//!
//! These traits are the boundary between the engine and the host editor.
//! The host owns the real document; the engine reads and mutates it only
//! through [`BufferView`] and [`BufferMut`].
//!
//! ## Indexing model
//!
//! All offsets are **code-point based**. Lines are separated by `\n`; the
//! newline belongs to the line it terminates but is never part of
//! `line_text`. A buffer always has at least one (possibly empty) line.
//!
//! ## Revision semantics
//!
//! Revision increments on every text mutation. Caret movement is owned by
//! the session and never touches the buffer.

use crate::error::Result;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a host buffer, used to scope local marks and options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

impl BufferId {
    /// Allocate a process-unique buffer id
    #[must_use]
    pub fn next() -> Self {
        BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Logical line/column position (0-based, column in code-points)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open range `[start, end)` of code-point offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range between two offsets in either order
    #[must_use]
    pub fn between(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Shrink the exclusive end by `adjustment`, never below `start`
    #[must_use]
    pub fn adjusted(self, adjustment: usize) -> Self {
        Self {
            start: self.start,
            end: self.end.saturating_sub(adjustment).max(self.start),
        }
    }
}

/// Read-only view of a host document
pub trait BufferView {
    /// Identity used for local marks and options
    fn id(&self) -> BufferId;

    /// Total number of code-points in the document
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of logical lines (at least 1)
    fn line_count(&self) -> usize;

    /// Offset of the first character of `line`
    fn line_start(&self, line: usize) -> usize;

    /// Offset just past the last character of `line`, excluding the newline
    fn line_end(&self, line: usize) -> usize;

    fn char_at(&self, offset: usize) -> Option<char>;

    /// Text between code-point offsets `[start, end)`
    fn slice(&self, range: TextRange) -> String;

    /// Revision identifier; increments on text mutations
    fn revision(&self) -> u64;

    fn line_text(&self, line: usize) -> String {
        self.slice(TextRange::new(self.line_start(line), self.line_end(line)))
    }

    /// Line containing `offset` (offsets past the end map to the last line)
    fn line_of_offset(&self, offset: usize) -> usize {
        let mut low = 0;
        let mut high = self.line_count();
        while low + 1 < high {
            let mid = low + (high - low) / 2;
            if self.line_start(mid) <= offset {
                low = mid;
            } else {
                high = mid;
            }
        }
        low
    }

    fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len());
        let line = self.line_of_offset(offset);
        Position::new(line, offset - self.line_start(line))
    }

    /// Offset for `pos`, clamping line and column into the document
    fn position_to_offset(&self, pos: Position) -> usize {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        let start = self.line_start(line);
        let end = self.line_end(line);
        (start + pos.column).min(end)
    }
}

/// Mutable buffer interface used by handlers
pub trait BufferMut: BufferView {
    /// Insert text at `offset`
    fn insert(&mut self, offset: usize, text: &str) -> Result<()>;

    /// Delete `range`, returning the removed text
    fn delete(&mut self, range: TextRange) -> Result<String>;

    /// Replace `range` with `text`, returning the removed text
    fn replace(&mut self, range: TextRange, text: &str) -> Result<String> {
        let removed = self.delete(range)?;
        self.insert(range.start, text)?;
        Ok(removed)
    }
}
