//! Search engine
//!
//! Regex search over buffer text through monster-regex, plus the
//! process-wide "last search" used by `n`, `N` and `gn`.
//!
//! Patterns without a newline are searched line by line; patterns that can
//! span lines fall back to materializing the whole buffer. Regex match
//! offsets are bytes and are converted to code-point offsets before they
//! leave this module.

use crate::buffer::{BufferView, TextRange};
use crate::constants::errors::{NO_PREVIOUS_REGEX, REGEX_COMPILE_ERROR, REGEX_PARSE_ERROR};
use crate::error::{EngineError, ErrorType, Result};
use monster_regex::{parse_rift_format, Regex};
use parking_lot::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }
}

/// Option values that shape a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub ignorecase: bool,
    pub smartcase: bool,
    pub wrapscan: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignorecase: false,
            smartcase: false,
            wrapscan: true,
        }
    }
}

/// Last pattern and direction, shared by every session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub pattern: Option<String>,
    pub direction: SearchDirection,
    /// Cleared by `:nohlsearch`, set again by the next search
    pub highlight: bool,
}

#[derive(Debug, Default)]
pub struct SearchEngine {
    state: RwLock<SearchState>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SearchState {
        self.state.read().clone()
    }

    pub fn last_pattern(&self) -> Option<String> {
        self.state.read().pattern.clone()
    }

    pub fn last_direction(&self) -> SearchDirection {
        self.state.read().direction
    }

    pub fn set_last(&self, pattern: &str, direction: SearchDirection) {
        let mut state = self.state.write();
        state.pattern = Some(pattern.to_string());
        state.direction = direction;
        state.highlight = true;
    }

    /// `:nohlsearch`
    pub fn clear_highlight(&self) {
        self.state.write().highlight = false;
    }

    /// Forget the last search
    pub fn reset(&self) {
        *self.state.write() = SearchState::default();
    }

    /// Find the `count`th match of `pattern` from offset `from` and remember
    /// the pattern for later repeats. `None` means no match.
    pub fn find<B: BufferView + ?Sized>(
        &self,
        buffer: &B,
        pattern: &str,
        from: usize,
        direction: SearchDirection,
        count: usize,
        opts: &SearchOptions,
    ) -> Result<Option<TextRange>> {
        let compiled = Compiled::new(pattern, opts)?;
        self.set_last(pattern, direction);
        tracing::debug!(pattern, from, ?direction, count, "search");
        Ok(compiled.find_nth(buffer, from, direction, count, opts.wrapscan))
    }

    /// Repeat the last search (`n`), or in the opposite direction (`N`)
    pub fn repeat<B: BufferView + ?Sized>(
        &self,
        buffer: &B,
        from: usize,
        reverse: bool,
        count: usize,
        opts: &SearchOptions,
    ) -> Result<Option<TextRange>> {
        let state = self.state();
        let Some(pattern) = state.pattern else {
            return Err(no_previous_regex());
        };
        let direction = if reverse {
            state.direction.reversed()
        } else {
            state.direction
        };
        let compiled = Compiled::new(&pattern, opts)?;
        self.state.write().highlight = true;
        Ok(compiled.find_nth(buffer, from, direction, count, opts.wrapscan))
    }

    /// Range of the `count`th last-pattern match at or after (`forward`) or
    /// at or before the caret, with `adjustment` taken off the exclusive end.
    /// Missing pattern, bad pattern and no match all yield `None`.
    pub fn next_match_object<B: BufferView + ?Sized>(
        &self,
        buffer: &B,
        caret: usize,
        count: usize,
        forward: bool,
        adjustment: usize,
        opts: &SearchOptions,
    ) -> Option<TextRange> {
        let pattern = self.last_pattern()?;
        let compiled = Compiled::new(&pattern, opts).ok()?;
        let direction = if forward {
            SearchDirection::Forward
        } else {
            SearchDirection::Backward
        };

        let mut found = compiled.match_covering(buffer, caret);
        let mut remaining = compiled.effective_count(buffer, count, opts.wrapscan);
        if found.is_some() {
            remaining -= 1;
        }
        let mut pos = found.map_or(caret, |r| r.start);
        while remaining > 0 {
            let next = compiled.find_once(buffer, pos, direction, opts.wrapscan)?;
            pos = next.start;
            found = Some(next);
            remaining -= 1;
        }
        found.map(|range| range.adjusted(adjustment))
    }
}

/// Every match of `pattern` in the buffer, in order
pub fn find_all<B: BufferView + ?Sized>(
    buffer: &B,
    pattern: &str,
    opts: &SearchOptions,
) -> Result<Vec<TextRange>> {
    let compiled = Compiled::new(pattern, opts)?;
    Ok(compiled.all_matches(buffer))
}

fn no_previous_regex() -> EngineError {
    EngineError::new(
        ErrorType::Search,
        NO_PREVIOUS_REGEX,
        "No previous regular expression",
    )
}

/// Case flags for a pattern under `ignorecase`/`smartcase`
fn case_flags(pattern: &str, opts: &SearchOptions) -> &'static str {
    let has_upper = pattern.chars().any(char::is_uppercase);
    if opts.ignorecase && !(opts.smartcase && has_upper) {
        "i"
    } else {
        ""
    }
}

struct Compiled {
    re: Regex,
    multiline: bool,
}

impl Compiled {
    fn new(pattern: &str, opts: &SearchOptions) -> Result<Self> {
        let query = format!("{pattern}/{}", case_flags(pattern, opts));
        let (parsed, flags) = parse_rift_format(&query).map_err(|e| {
            EngineError::new(ErrorType::Search, REGEX_PARSE_ERROR, format!("{e:?}"))
        })?;
        let multiline = parsed.contains("\\n") || parsed.contains('\n');
        let re = Regex::new(&parsed, flags).map_err(|e| {
            EngineError::new(ErrorType::Search, REGEX_COMPILE_ERROR, format!("{e:?}"))
        })?;
        Ok(Self { re, multiline })
    }

    fn find_nth<B: BufferView + ?Sized>(
        &self,
        buffer: &B,
        from: usize,
        direction: SearchDirection,
        count: usize,
        wrap: bool,
    ) -> Option<TextRange> {
        let mut pos = from;
        let mut found = None;
        for _ in 0..self.effective_count(buffer, count, wrap) {
            let next = self.find_once(buffer, pos, direction, wrap)?;
            pos = next.start;
            found = Some(next);
        }
        found
    }

    /// With wrapping the matches repeat in a cycle, so a count larger than
    /// the number of matches only needs its remainder
    fn effective_count<B: BufferView + ?Sized>(&self, buffer: &B, count: usize, wrap: bool) -> usize {
        let count = count.max(1);
        if !wrap || count == 1 {
            return count;
        }
        match self.all_matches(buffer).len() {
            0 => 1,
            total if count > total => (count - 1) % total + 1,
            _ => count,
        }
    }

    /// Next match strictly after (forward) or before (backward) `pos`
    fn find_once<B: BufferView + ?Sized>(
        &self,
        buffer: &B,
        pos: usize,
        direction: SearchDirection,
        wrap: bool,
    ) -> Option<TextRange> {
        if self.multiline {
            return pick(&self.all_matches(buffer), pos, direction, wrap);
        }

        let line_count = buffer.line_count();
        let current = buffer.line_of_offset(pos);
        match direction {
            SearchDirection::Forward => {
                let after = |i: usize| {
                    self.line_matches(buffer, i)
                        .into_iter()
                        .find(|m| m.start > pos)
                };
                if let Some(m) = after(current) {
                    return Some(m);
                }
                for i in (current + 1)..line_count {
                    if let Some(m) = self.line_matches(buffer, i).into_iter().next() {
                        return Some(m);
                    }
                }
                if wrap {
                    for i in 0..=current {
                        let first = self
                            .line_matches(buffer, i)
                            .into_iter()
                            .find(|m| i < current || m.start <= pos);
                        if first.is_some() {
                            return first;
                        }
                    }
                }
            }
            SearchDirection::Backward => {
                let before = self
                    .line_matches(buffer, current)
                    .into_iter()
                    .filter(|m| m.start < pos)
                    .last();
                if before.is_some() {
                    return before;
                }
                for i in (0..current).rev() {
                    if let Some(m) = self.line_matches(buffer, i).into_iter().last() {
                        return Some(m);
                    }
                }
                if wrap {
                    for i in (current..line_count).rev() {
                        let last = self
                            .line_matches(buffer, i)
                            .into_iter()
                            .filter(|m| i > current || m.start >= pos)
                            .last();
                        if last.is_some() {
                            return last;
                        }
                    }
                }
            }
        }
        None
    }

    /// Match containing `pos`, if any
    fn match_covering<B: BufferView + ?Sized>(&self, buffer: &B, pos: usize) -> Option<TextRange> {
        let candidates = if self.multiline {
            self.all_matches(buffer)
        } else {
            self.line_matches(buffer, buffer.line_of_offset(pos))
        };
        candidates.into_iter().find(|m| m.contains(pos))
    }

    fn line_matches<B: BufferView + ?Sized>(&self, buffer: &B, line: usize) -> Vec<TextRange> {
        let text = buffer.line_text(line);
        let base = buffer.line_start(line);
        self.re
            .find_all(&text)
            .into_iter()
            .map(|m| {
                TextRange::new(
                    base + char_offset(&text, m.start),
                    base + char_offset(&text, m.end),
                )
            })
            .collect()
    }

    fn all_matches<B: BufferView + ?Sized>(&self, buffer: &B) -> Vec<TextRange> {
        if !self.multiline {
            return (0..buffer.line_count())
                .flat_map(|i| self.line_matches(buffer, i))
                .collect();
        }
        let text = buffer.slice(TextRange::new(0, buffer.len()));
        self.re
            .find_all(&text)
            .into_iter()
            .map(|m| TextRange::new(char_offset(&text, m.start), char_offset(&text, m.end)))
            .collect()
    }
}

/// Choose the next match from a sorted list
fn pick(
    matches: &[TextRange],
    pos: usize,
    direction: SearchDirection,
    wrap: bool,
) -> Option<TextRange> {
    match direction {
        SearchDirection::Forward => matches
            .iter()
            .find(|m| m.start > pos)
            .or_else(|| if wrap { matches.first() } else { None })
            .copied(),
        SearchDirection::Backward => matches
            .iter()
            .rev()
            .find(|m| m.start < pos)
            .or_else(|| if wrap { matches.last() } else { None })
            .copied(),
    }
}

/// Code-point offset for a byte offset into `text`
fn char_offset(text: &str, byte: usize) -> usize {
    match text.get(..byte) {
        Some(prefix) => prefix.chars().count(),
        None => text.char_indices().take_while(|(i, _)| *i < byte).count(),
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
