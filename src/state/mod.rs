//! Per-session editor state
//!
//! ## state/ Invariants
//!
//! - The caret is always a valid offset for the current mode: in NORMAL it
//!   rests on a character (or at the start of an empty line).
//! - Visual sub-mode only exists inside the mode machine; the state keeps
//!   just the anchor of the selection.
//! - Leaving a selection mode records the `<` and `>` marks.
//! - Leaving INSERT or REPLACE records `^` and steps the caret back one.

use crate::buffer::{BufferId, BufferMut, BufferView, Position, TextRange};
use crate::error::manager::ErrorManager;
use crate::error::messages::MessageLog;
use crate::error::{EngineError, Result};
use crate::handlers::PendingOperator;
use crate::marks::{self, MarkStore, SharedMarks};
use crate::mode::{Mode, ModeMachine, VisualSubMode};
use crate::search::SearchDirection;

/// Shape of a range handed to an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Charwise,
    Linewise,
    Blockwise,
}

/// Text an operator acts on. Blockwise ranges hold one segment per line,
/// top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorRange {
    pub ranges: Vec<TextRange>,
    pub kind: RangeKind,
}

impl OperatorRange {
    pub fn charwise(range: TextRange) -> Self {
        Self {
            ranges: vec![range],
            kind: RangeKind::Charwise,
        }
    }

    pub fn linewise(range: TextRange) -> Self {
        Self {
            ranges: vec![range],
            kind: RangeKind::Linewise,
        }
    }

    /// Smallest range covering every segment
    pub fn span(&self) -> TextRange {
        let start = self.ranges.iter().map(|r| r.start).min().unwrap_or(0);
        let end = self.ranges.iter().map(|r| r.end).max().unwrap_or(start);
        TextRange::new(start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandLineKind {
    Ex,
    Search(SearchDirection),
}

impl CommandLineKind {
    pub fn prompt(self) -> char {
        match self {
            CommandLineKind::Ex => ':',
            CommandLineKind::Search(SearchDirection::Forward) => '/',
            CommandLineKind::Search(SearchDirection::Backward) => '?',
        }
    }
}

/// Text being edited on the command line
#[derive(Debug, Clone)]
pub struct CommandLine {
    pub kind: CommandLineKind,
    pub text: Vec<char>,
    pub cursor: usize,
    /// Mode restored when the line is cancelled or executed
    pub return_mode: Mode,
    /// Operator waiting for a search motion (`d/foo<CR>`)
    pub operator: Option<PendingOperator>,
    /// Caret when the line was opened
    pub origin: usize,
    pub count: Option<usize>,
}

impl CommandLine {
    pub fn new(kind: CommandLineKind, return_mode: Mode, origin: usize) -> Self {
        Self {
            kind,
            text: Vec::new(),
            cursor: 0,
            return_mode,
            operator: None,
            origin,
            count: None,
        }
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }
}

/// Selection remembered for `gv` and the `<`/`>` marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualSnapshot {
    pub anchor: usize,
    pub caret: usize,
    pub sub_mode: VisualSubMode,
}

pub struct EditorState {
    buffer: Box<dyn BufferMut + Send>,
    caret: usize,
    modes: ModeMachine,
    pub marks: MarkStore,
    visual_anchor: usize,
    last_visual: Option<VisualSnapshot>,
    pub command_line: Option<CommandLine>,
    pub errors: ErrorManager,
    /// Column kept across vertical motions
    pub preferred_column: Option<usize>,
    /// Where the current insert started, limits `<C-w>`/`<C-u>`
    pub insert_start: Option<usize>,
    /// Characters typed in REPLACE mode with what they overwrote, `None`
    /// when the character was added past the line end
    pub replaced: Vec<(usize, Option<char>)>,
}

impl std::fmt::Debug for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorState")
            .field("buffer", &self.buffer.id())
            .field("caret", &self.caret)
            .field("mode", &self.modes.mode())
            .field("visual_anchor", &self.visual_anchor)
            .finish()
    }
}

impl EditorState {
    pub fn new(buffer: Box<dyn BufferMut + Send>, global_marks: SharedMarks) -> Self {
        let id = buffer.id();
        Self {
            buffer,
            caret: 0,
            modes: ModeMachine::new(),
            marks: MarkStore::new(id, global_marks),
            visual_anchor: 0,
            last_visual: None,
            command_line: None,
            errors: ErrorManager::new(),
            preferred_column: None,
            insert_start: None,
            replaced: Vec::new(),
        }
    }

    pub fn buffer(&self) -> &(dyn BufferMut + Send) {
        self.buffer.as_ref()
    }

    pub fn buffer_mut(&mut self) -> &mut (dyn BufferMut + Send) {
        self.buffer.as_mut()
    }

    pub fn buffer_id(&self) -> BufferId {
        self.buffer.id()
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn modes(&self) -> &ModeMachine {
        &self.modes
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn caret_position(&self) -> Position {
        self.buffer.offset_to_position(self.caret)
    }

    pub fn caret_line(&self) -> usize {
        self.buffer.line_of_offset(self.caret)
    }

    /// Move the caret, clamped to what the current mode allows
    pub fn set_caret(&mut self, offset: usize) {
        self.caret = self.clamp(offset, self.mode().is_end_offset_allowed_past_last_char());
    }

    /// Move the caret allowing the position past the last character
    pub fn set_caret_past_end(&mut self, offset: usize) {
        self.caret = self.clamp(offset, true);
    }

    /// Clamp an offset to the line it falls in
    pub fn clamp(&self, offset: usize, past_end: bool) -> usize {
        let offset = offset.min(self.buffer.len());
        let line = self.buffer.line_of_offset(offset);
        let start = self.buffer.line_start(line);
        let end = self.buffer.line_end(line);
        let max = if past_end || end == start { end } else { end - 1 };
        offset.clamp(start, max)
    }

    pub fn report(&mut self, err: &EngineError) {
        self.errors.handle(err);
    }

    pub fn messages(&self) -> &MessageLog {
        self.errors.messages()
    }

    pub fn messages_mut(&mut self) -> &mut MessageLog {
        self.errors.messages_mut()
    }

    pub fn visual_anchor(&self) -> usize {
        self.visual_anchor
    }

    pub fn set_visual_anchor(&mut self, offset: usize) {
        self.visual_anchor = offset.min(self.buffer.len());
    }

    pub fn last_visual(&self) -> Option<VisualSnapshot> {
        self.last_visual
    }

    /// Explicit mode change with its side effects
    pub fn enter_mode(&mut self, to: Mode) -> Result<()> {
        let from = self.mode();
        self.modes.transition(to)?;
        self.after_mode_change(from, to);
        Ok(())
    }

    /// Host selection appeared
    pub fn promote(&mut self, to: Mode) -> Result<()> {
        let from = self.mode();
        self.modes.promote(to)?;
        self.after_mode_change(from, to);
        Ok(())
    }

    /// Host selection went away
    pub fn demote(&mut self) -> Mode {
        let from = self.mode();
        let to = self.modes.demote();
        self.after_mode_change(from, to);
        to
    }

    /// Return to NORMAL unconditionally
    pub fn reset_mode(&mut self) {
        let from = self.mode();
        self.modes.reset();
        self.command_line = None;
        self.after_mode_change(from, Mode::Normal);
    }

    fn after_mode_change(&mut self, from: Mode, to: Mode) {
        if from.has_active_selection() && !to.has_active_selection() {
            if let Some(sub) = from.sub_mode() {
                self.remember_visual(sub);
            }
        }
        if !from.has_active_selection() && to.has_active_selection() {
            self.visual_anchor = self.caret;
        }
        if matches!(from, Mode::Insert | Mode::Replace)
            && !matches!(to, Mode::Insert | Mode::Replace)
        {
            let pos = self.caret_position();
            self.marks.set_special(pos, marks::LAST_INSERT);
            self.insert_start = None;
            if to == Mode::Normal && pos.column > 0 {
                self.caret -= 1;
            }
        }
        if from == Mode::Replace || to == Mode::Replace {
            self.replaced.clear();
        }
        if matches!(to, Mode::Insert | Mode::Replace) && self.insert_start.is_none() {
            self.insert_start = Some(self.caret);
        }
        if to == Mode::Normal {
            self.caret = self.clamp(self.caret, false);
        }
    }

    fn remember_visual(&mut self, sub_mode: VisualSubMode) {
        let snapshot = VisualSnapshot {
            anchor: self.visual_anchor,
            caret: self.caret,
            sub_mode,
        };
        self.last_visual = Some(snapshot);
        let start = self.buffer.offset_to_position(self.visual_anchor.min(self.caret));
        let end = self.buffer.offset_to_position(self.visual_anchor.max(self.caret));
        self.marks.set_special(start, marks::VISUAL_START);
        self.marks.set_special(end, marks::VISUAL_END);
    }

    /// Current selection as an operator range; `exclusive` follows the
    /// `selection` option.
    pub fn selection_range(&self, exclusive: bool) -> Option<OperatorRange> {
        let sub = self.mode().sub_mode()?;
        Some(self.range_between(self.visual_anchor, self.caret, sub, exclusive))
    }

    pub fn range_between(
        &self,
        anchor: usize,
        caret: usize,
        sub: VisualSubMode,
        exclusive: bool,
    ) -> OperatorRange {
        let len = self.buffer.len();
        let lo = anchor.min(caret);
        let hi = anchor.max(caret);
        match sub {
            VisualSubMode::Character => {
                let end = if exclusive { hi } else { (hi + 1).min(len) };
                OperatorRange::charwise(TextRange::new(lo, end.max(lo)))
            }
            VisualSubMode::Line => {
                let first = self.buffer.line_of_offset(lo);
                let last = self.buffer.line_of_offset(hi);
                OperatorRange::linewise(self.line_span(first, last))
            }
            VisualSubMode::Block => {
                let a = self.buffer.offset_to_position(anchor);
                let c = self.buffer.offset_to_position(caret);
                let (left, right) = (a.column.min(c.column), a.column.max(c.column));
                let right = if exclusive { right } else { right + 1 };
                let ranges = (a.line.min(c.line)..=a.line.max(c.line))
                    .map(|line| {
                        let start = self.buffer.line_start(line);
                        let end = self.buffer.line_end(line);
                        TextRange::new((start + left).min(end), (start + right).min(end))
                    })
                    .collect();
                OperatorRange {
                    ranges,
                    kind: RangeKind::Blockwise,
                }
            }
        }
    }

    /// Whole lines `first..=last` including the line break that separates
    /// them from the rest of the buffer
    pub fn line_span(&self, first: usize, last: usize) -> TextRange {
        let last = last.min(self.buffer.line_count().saturating_sub(1));
        let start = self.buffer.line_start(first);
        if last + 1 < self.buffer.line_count() {
            TextRange::new(start, self.buffer.line_start(last + 1))
        } else if first > 0 {
            // Last line has no trailing break; take the one before it
            TextRange::new(self.buffer.line_end(first - 1), self.buffer.len())
        } else {
            TextRange::new(start, self.buffer.len())
        }
    }

    /// Record `[`, `]` and `.` after a change covering `range`
    pub fn mark_change(&mut self, range: TextRange) {
        let start = self.buffer.offset_to_position(range.start);
        let end = self.buffer.offset_to_position(range.end.saturating_sub(1).max(range.start));
        self.marks.set_special(start, marks::CHANGE_START);
        self.marks.set_special(end, marks::CHANGE_END);
        self.marks.set_special(start, marks::LAST_CHANGE);
    }

    /// Remember the caret before a jump for `''`
    pub fn mark_jump(&mut self) {
        let pos = self.caret_position();
        self.marks.set_special(pos, marks::JUMP);
    }

    /// Restore the last visual selection (`gv`)
    pub fn restore_visual(&mut self, select: bool) -> Result<bool> {
        let Some(snapshot) = self.last_visual else {
            return Ok(false);
        };
        let mode = if select {
            Mode::Select(snapshot.sub_mode)
        } else {
            Mode::Visual(snapshot.sub_mode)
        };
        self.enter_mode(mode)?;
        self.visual_anchor = snapshot.anchor.min(self.buffer.len());
        self.caret = self.clamp(snapshot.caret, true);
        Ok(true)
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
