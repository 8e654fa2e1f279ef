//! Editor mode definitions and the mode state machine

pub mod selection;

pub use selection::SelectionDebouncer;

use crate::constants::errors::ILLEGAL_TRANSITION;
use crate::constants::modes;
use crate::error::{EngineError, ErrorType, Result};
use std::fmt;

/// Selection granularity for visual and select modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualSubMode {
    Character,
    Line,
    Block,
}

/// Editor operating mode
///
/// Visual and select carry their sub-mode, so a sub-mode can never exist
/// outside of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Normal mode (command mode)
    #[default]
    Normal,
    /// Insert mode (text editing)
    Insert,
    /// Replace mode (overtype, entered with R)
    Replace,
    /// Command line (`:` commands and `/` `?` searches)
    CommandLine,
    /// Visual selection driven by motions
    Visual(VisualSubMode),
    /// Select mode: typing replaces the selection
    Select(VisualSubMode),
}

impl Mode {
    /// Whether the caret may rest one past the last character of a line
    #[must_use]
    pub fn is_end_offset_allowed_past_last_char(self) -> bool {
        matches!(
            self,
            Mode::Insert | Mode::Replace | Mode::Visual(_) | Mode::Select(_)
        )
    }

    #[must_use]
    pub fn uses_block_caret_shape(self) -> bool {
        matches!(self, Mode::Normal | Mode::Visual(_))
    }

    #[must_use]
    pub fn has_active_selection(self) -> bool {
        matches!(self, Mode::Visual(_) | Mode::Select(_))
    }

    /// Modes where unbound printable keys are inserted as text
    #[must_use]
    pub fn accepts_literal_text(self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace | Mode::CommandLine)
    }

    #[must_use]
    pub fn sub_mode(self) -> Option<VisualSubMode> {
        match self {
            Mode::Visual(sub) | Mode::Select(sub) => Some(sub),
            _ => None,
        }
    }

    /// Status line name, e.g. `VISUAL LINE`
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Normal => modes::NORMAL,
            Mode::Insert => modes::INSERT,
            Mode::Replace => modes::REPLACE,
            Mode::CommandLine => modes::COMMAND_LINE,
            Mode::Visual(VisualSubMode::Character) => modes::VISUAL,
            Mode::Visual(VisualSubMode::Line) => modes::VISUAL_LINE,
            Mode::Visual(VisualSubMode::Block) => modes::VISUAL_BLOCK,
            Mode::Select(VisualSubMode::Character) => modes::SELECT,
            Mode::Select(VisualSubMode::Line) => modes::SELECT_LINE,
            Mode::Select(VisualSubMode::Block) => modes::SELECT_BLOCK,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Owns the session's current mode and enforces legal transitions
#[derive(Debug, Clone, Default)]
pub struct ModeMachine {
    mode: Mode,
    /// Mode an implicit selection promoted from
    promoted_from: Option<Mode>,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn promoted_from(&self) -> Option<Mode> {
        self.promoted_from
    }

    /// Transition table
    pub fn is_legal(from: Mode, to: Mode) -> bool {
        match from {
            Mode::Normal => true,
            Mode::Insert | Mode::Replace => !matches!(to, Mode::CommandLine),
            Mode::Visual(_) => !matches!(to, Mode::Replace),
            Mode::Select(_) => !matches!(to, Mode::CommandLine | Mode::Replace),
            Mode::CommandLine => matches!(to, Mode::Normal | Mode::Visual(_)),
        }
    }

    /// Explicit transition requested by a handler
    pub fn transition(&mut self, to: Mode) -> Result<()> {
        self.check(to)?;
        tracing::trace!(from = %self.mode, to = %to, "mode transition");
        self.mode = to;
        if !to.has_active_selection() {
            self.promoted_from = None;
        }
        Ok(())
    }

    /// Implicit transition caused by a host selection appearing
    pub fn promote(&mut self, to: Mode) -> Result<()> {
        self.check(to)?;
        if self.promoted_from.is_none() && !self.mode.has_active_selection() {
            self.promoted_from = Some(self.mode);
        }
        tracing::trace!(from = %self.mode, to = %to, "implicit promotion");
        self.mode = to;
        Ok(())
    }

    /// Implicit transition caused by the host selection going away.
    /// Returns to the promoting mode, or NORMAL for explicit visual.
    pub fn demote(&mut self) -> Mode {
        let target = self.promoted_from.take().unwrap_or(Mode::Normal);
        tracing::trace!(from = %self.mode, to = %target, "implicit demotion");
        self.mode = target;
        target
    }

    /// Unconditional return to NORMAL (escape, reset)
    pub fn reset(&mut self) {
        self.mode = Mode::Normal;
        self.promoted_from = None;
    }

    fn check(&self, to: Mode) -> Result<()> {
        if Self::is_legal(self.mode, to) {
            Ok(())
        } else {
            Err(EngineError::new(
                ErrorType::Internal,
                ILLEGAL_TRANSITION,
                format!("Illegal mode transition: {} -> {}", self.mode, to),
            ))
        }
    }
}
