//! Line ranges for ex commands
//!
//! `N`, `.`, `$`, `%`, `'x`, `+N`/`-N` offsets and `a,b` pairs. Lines are
//! 1-based in the text and 0-based in [`LineRange`].

use crate::buffer::BufferView;
use crate::constants::errors::{INVALID_RANGE, MARK_NOT_SET};
use crate::error::{EngineError, ErrorType, Result};
use crate::state::EditorState;

/// Inclusive, 0-based line range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn single(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }
}

fn invalid_range() -> EngineError {
    EngineError::new(ErrorType::Parse, INVALID_RANGE, "Invalid range")
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    state: Option<&'a EditorState>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_blanks(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.pos += 1;
        }
    }

    fn number(&mut self) -> Option<i64> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        Some(digits.parse().unwrap_or(i64::MAX))
    }

    fn state(&self) -> Result<&'a EditorState> {
        self.state.ok_or_else(invalid_range)
    }

    fn current_line(&self) -> Result<i64> {
        Ok(self.state()?.caret_line() as i64 + 1)
    }

    fn last_line(&self) -> Result<i64> {
        Ok(self.state()?.buffer().line_count() as i64)
    }

    /// One address, 1-based. `None` when nothing address-like follows.
    fn address(&mut self) -> Result<Option<i64>> {
        self.skip_blanks();
        let base = match self.peek() {
            Some(c) if c.is_ascii_digit() => self.number(),
            Some('.') => {
                self.pos += 1;
                Some(self.current_line()?)
            }
            Some('$') => {
                self.pos += 1;
                Some(self.last_line()?)
            }
            Some('\'') => {
                let name = self.chars.get(self.pos + 1).copied().ok_or_else(invalid_range)?;
                self.pos += 2;
                let state = self.state()?;
                let mark = state
                    .marks
                    .get_mark(name)
                    .filter(|m| m.buffer == state.buffer_id())
                    .ok_or_else(|| {
                        EngineError::new(ErrorType::Input, MARK_NOT_SET, format!("Mark not set: {name}"))
                    })?;
                Some(mark.position.line as i64 + 1)
            }
            _ => None,
        };

        let mut value = base;
        loop {
            self.skip_blanks();
            let sign = match self.peek() {
                Some('+') => 1,
                Some('-') => -1,
                _ => break,
            };
            self.pos += 1;
            let amount = self.number().unwrap_or(1);
            let current = match value {
                Some(v) => v,
                None => self.current_line()?,
            };
            value = Some(current.saturating_add(sign * amount));
        }
        Ok(value)
    }
}

/// Parse a leading range from `input`, returning it and the rest of the
/// command. Lines outside the buffer are an `E16` error; a backwards range
/// is swapped.
pub fn parse_range<'i>(
    input: &'i str,
    state: Option<&EditorState>,
) -> Result<(Option<LineRange>, &'i str)> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
        state,
    };
    parser.skip_blanks();

    let (start, end) = if parser.peek() == Some('%') {
        parser.pos += 1;
        (Some(1), Some(parser.last_line()?))
    } else {
        let start = parser.address()?;
        parser.skip_blanks();
        if matches!(parser.peek(), Some(',') | Some(';')) {
            parser.pos += 1;
            let end = parser.address()?;
            let start = match start {
                Some(s) => s,
                None => parser.current_line()?,
            };
            let end = match end {
                Some(e) => e,
                None => parser.current_line()?,
            };
            (Some(start), Some(end))
        } else {
            (start, start)
        }
    };

    let rest_offset: usize = parser.chars[..parser.pos.min(parser.chars.len())]
        .iter()
        .map(|c| c.len_utf8())
        .sum();
    let rest = &input[rest_offset..];

    let (Some(start), Some(end)) = (start, end) else {
        return Ok((None, rest));
    };
    let last = parser.last_line()?;
    let check = |line: i64| -> Result<usize> {
        if line < 0 || line > last {
            Err(invalid_range())
        } else {
            Ok(line.max(1) as usize - 1)
        }
    };
    let (mut start, mut end) = (check(start)?, check(end)?);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    Ok((Some(LineRange { start, end }), rest))
}
