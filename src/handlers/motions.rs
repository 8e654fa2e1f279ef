//! Built-in motions

use super::{Argument, Handler, HandlerContext, HandlerRegistry, MotionTarget};
use crate::buffer::{BufferView, Position};
use crate::constants::errors::{MARK_NOT_SET, PATTERN_NOT_FOUND};
use crate::error::{EngineError, ErrorType, Result};
use crate::keymap::MapModes;
use crate::search::SearchDirection;

/// Character categories for word movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Word,
    Punctuation,
}

pub fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

fn class_at<B: BufferView + ?Sized>(buffer: &B, offset: usize) -> CharClass {
    buffer
        .char_at(offset)
        .map_or(CharClass::Whitespace, classify)
}

/// An empty line counts as a word of its own
fn is_empty_line_at<B: BufferView + ?Sized>(buffer: &B, offset: usize) -> bool {
    let line = buffer.line_of_offset(offset);
    buffer.line_start(line) == offset && buffer.line_end(line) == offset
}

/// Start of the next word after `pos`
pub fn next_word_start<B: BufferView + ?Sized>(buffer: &B, pos: usize) -> usize {
    let len = buffer.len();
    if pos >= len {
        return len;
    }
    let mut p = pos;
    let class = class_at(buffer, p);
    if class != CharClass::Whitespace {
        while p < len && class_at(buffer, p) == class {
            p += 1;
        }
    }
    while p < len && class_at(buffer, p) == CharClass::Whitespace {
        if p != pos && is_empty_line_at(buffer, p) {
            break;
        }
        p += 1;
    }
    p
}

/// Last character of the current or next word
pub fn word_end<B: BufferView + ?Sized>(buffer: &B, pos: usize) -> usize {
    let len = buffer.len();
    if len == 0 {
        return 0;
    }
    let mut p = pos + 1;
    while p < len && class_at(buffer, p) == CharClass::Whitespace {
        p += 1;
    }
    if p >= len {
        return len - 1;
    }
    let class = class_at(buffer, p);
    while p + 1 < len && class_at(buffer, p + 1) == class {
        p += 1;
    }
    p
}

/// Start of the current or previous word
pub fn prev_word_start<B: BufferView + ?Sized>(buffer: &B, pos: usize) -> usize {
    if pos == 0 {
        return 0;
    }
    let mut p = pos - 1;
    while p > 0 && class_at(buffer, p) == CharClass::Whitespace {
        if is_empty_line_at(buffer, p) {
            return p;
        }
        p -= 1;
    }
    let class = class_at(buffer, p);
    if class == CharClass::Whitespace {
        return p;
    }
    while p > 0 && class_at(buffer, p - 1) == class {
        p -= 1;
    }
    p
}

/// First non-blank character of `line`, or its end when blank
pub fn first_non_blank<B: BufferView + ?Sized>(buffer: &B, line: usize) -> usize {
    let end = buffer.line_end(line);
    let mut p = buffer.line_start(line);
    while p < end && buffer.char_at(p).is_some_and(|c| c == ' ' || c == '\t') {
        p += 1;
    }
    p
}

/// Last offset the caret may rest on in `line` outside of pending operators
fn last_char<B: BufferView + ?Sized>(buffer: &B, line: usize) -> usize {
    let start = buffer.line_start(line);
    let end = buffer.line_end(line);
    if end > start {
        end - 1
    } else {
        start
    }
}

fn wraps(ctx: &HandlerContext<'_>, flag: &str) -> bool {
    ctx.engine
        .options
        .list_contains(ctx.scope(), "whichwrap", flag)
}

fn left(ctx: &mut HandlerContext<'_>, wrap_flag: &str) -> Result<Option<MotionTarget>> {
    let buffer = ctx.buffer();
    let wrap = wraps(ctx, wrap_flag);
    let mut pos = ctx.state.caret();
    for _ in 0..ctx.count1() {
        let line = buffer.line_of_offset(pos);
        if pos > buffer.line_start(line) {
            pos -= 1;
        } else if wrap && line > 0 {
            pos = last_char(buffer, line - 1);
        } else {
            break;
        }
    }
    Ok(Some(MotionTarget::exclusive(pos)))
}

fn right(ctx: &mut HandlerContext<'_>, wrap_flag: &str) -> Result<Option<MotionTarget>> {
    let buffer = ctx.buffer();
    let wrap = wraps(ctx, wrap_flag);
    let past_end = ctx.operator_pending()
        || (ctx.state.mode().has_active_selection() && ctx.exclusive_selection());
    let mut pos = ctx.state.caret();
    for _ in 0..ctx.count1() {
        let line = buffer.line_of_offset(pos);
        let limit = if past_end {
            buffer.line_end(line)
        } else {
            last_char(buffer, line)
        };
        if pos < limit {
            pos += 1;
        } else if wrap && !ctx.operator_pending() && line + 1 < buffer.line_count() {
            pos = buffer.line_start(line + 1);
        } else {
            break;
        }
    }
    Ok(Some(MotionTarget::exclusive(pos)))
}

fn motion_left(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    left(ctx, "h")
}

fn motion_right(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    right(ctx, "l")
}

fn motion_arrow_left(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    left(ctx, "<")
}

fn motion_arrow_right(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    right(ctx, ">")
}

fn vertical(ctx: &mut HandlerContext<'_>, down: bool) -> Result<Option<MotionTarget>> {
    let caret = ctx.state.caret_position();
    let line_count = ctx.buffer().line_count();
    let count = ctx.count1();
    let line = if down {
        if caret.line + 1 >= line_count {
            return Ok(None);
        }
        caret.line.saturating_add(count).min(line_count - 1)
    } else {
        if caret.line == 0 {
            return Ok(None);
        }
        caret.line.saturating_sub(count)
    };
    let column = *ctx.state.preferred_column.get_or_insert(caret.column);
    let offset = ctx.buffer().position_to_offset(Position::new(line, column));
    Ok(Some(MotionTarget::vertical(offset)))
}

fn motion_down(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    vertical(ctx, true)
}

fn motion_up(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    vertical(ctx, false)
}

fn motion_line_start(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    let line = ctx.state.caret_line();
    Ok(Some(MotionTarget::exclusive(ctx.buffer().line_start(line))))
}

fn motion_first_non_blank(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    let line = ctx.state.caret_line();
    Ok(Some(MotionTarget::exclusive(first_non_blank(ctx.buffer(), line))))
}

fn motion_line_end(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    let buffer = ctx.buffer();
    let line = ctx
        .state
        .caret_line()
        .saturating_add(ctx.count1() - 1)
        .min(buffer.line_count().saturating_sub(1));
    let target = if ctx.state.mode().has_active_selection() {
        buffer.line_end(line)
    } else {
        last_char(buffer, line)
    };
    ctx.state.preferred_column = Some(usize::MAX);
    Ok(Some(MotionTarget {
        keep_column: true,
        ..MotionTarget::inclusive(target)
    }))
}

fn motion_word_forward(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    let buffer = ctx.buffer();
    let caret = ctx.state.caret();
    // `cw` on a word changes to its end like `ce`
    let changing = ctx.operator.as_ref().is_some_and(|op| op.name == "change");
    if changing && class_at(buffer, caret) != CharClass::Whitespace {
        let mut pos = caret;
        for i in 0..ctx.count1() {
            let next = if i == 0 && class_at(buffer, pos + 1) != class_at(buffer, pos) {
                pos
            } else {
                word_end(buffer, pos)
            };
            if i > 0 && next == pos {
                break;
            }
            pos = next;
        }
        return Ok(Some(MotionTarget::inclusive(pos)));
    }

    let mut pos = caret;
    for _ in 0..ctx.count1() {
        let next = next_word_start(buffer, pos);
        if next == pos {
            break;
        }
        pos = next;
    }
    if ctx.operator_pending() {
        let start_line = buffer.line_of_offset(caret);
        let line = buffer.line_of_offset(pos);
        // Operators stop at the end of the line instead of eating the break
        if line > start_line && pos <= first_non_blank(buffer, line) {
            pos = buffer.line_end(line - 1).max(caret);
        }
    }
    Ok(Some(MotionTarget::exclusive(pos)))
}

fn motion_word_backward(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    let mut pos = ctx.state.caret();
    for _ in 0..ctx.count1() {
        let next = prev_word_start(ctx.buffer(), pos);
        if next == pos {
            break;
        }
        pos = next;
    }
    Ok(Some(MotionTarget::exclusive(pos)))
}

fn motion_word_end(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    let mut pos = ctx.state.caret();
    for _ in 0..ctx.count1() {
        let next = word_end(ctx.buffer(), pos);
        if next == pos {
            break;
        }
        pos = next;
    }
    Ok(Some(MotionTarget::inclusive(pos)))
}

fn goto_line(ctx: &HandlerContext<'_>, line: usize) -> MotionTarget {
    let buffer = ctx.buffer();
    let line = line.min(buffer.line_count() - 1);
    MotionTarget::linewise(first_non_blank(buffer, line))
}

fn motion_first_line(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    let line = ctx.count.map_or(0, |n| n.saturating_sub(1));
    Ok(Some(goto_line(ctx, line)))
}

fn motion_last_line(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    let line = match ctx.count {
        Some(n) => n.saturating_sub(1),
        None => ctx.buffer().line_count() - 1,
    };
    Ok(Some(goto_line(ctx, line)))
}

/// `f`, `F`, `t` and `T` within the caret line
fn find_char(ctx: &HandlerContext<'_>, forward: bool, till: bool) -> Option<MotionTarget> {
    let target = ctx.arg_char()?;
    let buffer = ctx.buffer();
    let caret = ctx.state.caret();
    let line = buffer.line_of_offset(caret);
    let start = buffer.line_start(line);
    let end = buffer.line_end(line);

    let mut pos = caret;
    for _ in 0..ctx.count1() {
        pos = if forward {
            (pos + 1..end).find(|&p| buffer.char_at(p) == Some(target))?
        } else {
            (start..pos).rev().find(|&p| buffer.char_at(p) == Some(target))?
        };
    }
    Some(match (forward, till) {
        (true, false) => MotionTarget::inclusive(pos),
        (true, true) => MotionTarget::inclusive(pos - 1),
        (false, false) => MotionTarget::exclusive(pos),
        (false, true) => MotionTarget::exclusive(pos + 1),
    })
}

fn motion_find_forward(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    Ok(find_char(ctx, true, false))
}

fn motion_find_backward(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    Ok(find_char(ctx, false, false))
}

fn motion_till_forward(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    Ok(find_char(ctx, true, true))
}

fn motion_till_backward(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    Ok(find_char(ctx, false, true))
}

pub(crate) fn pattern_not_found(pattern: &str) -> EngineError {
    EngineError::new(
        ErrorType::Search,
        PATTERN_NOT_FOUND,
        format!("Pattern not found: {pattern}"),
    )
}

fn repeat_search(ctx: &mut HandlerContext<'_>, reverse: bool) -> Result<Option<MotionTarget>> {
    let opts = ctx.search_options();
    let found = ctx.engine.search.repeat(
        ctx.state.buffer(),
        ctx.state.caret(),
        reverse,
        ctx.count1(),
        &opts,
    )?;
    match found {
        Some(range) => Ok(Some(MotionTarget::exclusive(range.start))),
        None => Err(pattern_not_found(
            &ctx.engine.search.last_pattern().unwrap_or_default(),
        )),
    }
}

fn motion_search_next(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    repeat_search(ctx, false)
}

fn motion_search_prev(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    repeat_search(ctx, true)
}

/// Keyword under or after the caret on the caret line
pub fn word_under_caret<B: BufferView + ?Sized>(buffer: &B, caret: usize) -> Option<String> {
    let line = buffer.line_of_offset(caret);
    let end = buffer.line_end(line);
    let mut start = (caret..end).find(|&p| class_at(buffer, p) == CharClass::Word)?;
    while start > buffer.line_start(line) && class_at(buffer, start - 1) == CharClass::Word {
        start -= 1;
    }
    let word: String = (start..end)
        .map_while(|p| buffer.char_at(p).filter(|&c| classify(c) == CharClass::Word))
        .collect();
    Some(word)
}

fn star(ctx: &mut HandlerContext<'_>, direction: SearchDirection) -> Result<Option<MotionTarget>> {
    let Some(word) = word_under_caret(ctx.buffer(), ctx.state.caret()) else {
        return Err(EngineError::new(
            ErrorType::Search,
            PATTERN_NOT_FOUND,
            "No string under cursor",
        ));
    };
    let opts = ctx.search_options();
    // Start the search at the beginning of the word so the current
    // occurrence is skipped in both directions
    let line = ctx.state.caret_line();
    let from = (ctx.buffer().line_start(line)..=ctx.state.caret())
        .rev()
        .find(|&p| {
            p == ctx.buffer().line_start(line) || class_at(ctx.buffer(), p - 1) != CharClass::Word
        })
        .unwrap_or(ctx.state.caret());
    let found = ctx.engine.search.find(
        ctx.state.buffer(),
        &word,
        from,
        direction,
        ctx.count1(),
        &opts,
    )?;
    match found {
        Some(range) => Ok(Some(MotionTarget::exclusive(range.start))),
        None => Err(pattern_not_found(&word)),
    }
}

fn motion_star(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    star(ctx, SearchDirection::Forward)
}

fn motion_hash(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    star(ctx, SearchDirection::Backward)
}

fn mark_not_set(name: char) -> EngineError {
    EngineError::new(ErrorType::Input, MARK_NOT_SET, format!("Mark not set: {name}"))
}

fn mark_position(ctx: &HandlerContext<'_>) -> Result<Option<usize>> {
    let Some(name) = ctx.arg_char() else {
        return Ok(None);
    };
    match ctx.state.marks.get_mark(name) {
        Some(mark) if mark.buffer == ctx.state.buffer_id() => {
            Ok(Some(ctx.buffer().position_to_offset(mark.position)))
        }
        _ => Err(mark_not_set(name)),
    }
}

fn motion_mark_exact(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    Ok(mark_position(ctx)?.map(MotionTarget::exclusive))
}

fn motion_mark_line(ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
    Ok(mark_position(ctx)?.map(|offset| {
        let line = ctx.buffer().line_of_offset(offset);
        MotionTarget::linewise(first_non_blank(ctx.buffer(), line))
    }))
}

pub(super) fn register(registry: &mut HandlerRegistry) {
    let modes = MapModes::NVO;
    registry.register(modes, "h", "left", Handler::motion(motion_left));
    registry.register(modes, "<Left>", "left", Handler::motion(motion_arrow_left));
    registry.register(modes, "l", "right", Handler::motion(motion_right));
    registry.register(modes, "<Right>", "right", Handler::motion(motion_arrow_right));
    registry.register(modes, "j", "down", Handler::motion(motion_down));
    registry.register(modes, "<Down>", "down", Handler::motion(motion_down));
    registry.register(modes, "k", "up", Handler::motion(motion_up));
    registry.register(modes, "<Up>", "up", Handler::motion(motion_up));
    registry.register(modes, "0", "line-start", Handler::motion(motion_line_start));
    registry.register(modes, "<Home>", "line-start", Handler::motion(motion_line_start));
    registry.register(modes, "^", "first-non-blank", Handler::motion(motion_first_non_blank));
    registry.register(modes, "$", "line-end", Handler::motion(motion_line_end));
    registry.register(modes, "<End>", "line-end", Handler::motion(motion_line_end));
    registry.register(modes, "w", "word-forward", Handler::motion(motion_word_forward));
    registry.register(modes, "b", "word-backward", Handler::motion(motion_word_backward));
    registry.register(modes, "e", "word-end", Handler::motion(motion_word_end));
    registry.register(modes, "gg", "first-line", Handler::jump(motion_first_line, Argument::None));
    registry.register(modes, "G", "last-line", Handler::jump(motion_last_line, Argument::None));
    registry.register(modes, "f", "find-char", Handler::motion_with_char(motion_find_forward));
    registry.register(modes, "F", "find-char-backward", Handler::motion_with_char(motion_find_backward));
    registry.register(modes, "t", "till-char", Handler::motion_with_char(motion_till_forward));
    registry.register(modes, "T", "till-char-backward", Handler::motion_with_char(motion_till_backward));
    registry.register(modes, "n", "search-next", Handler::jump(motion_search_next, Argument::None));
    registry.register(modes, "N", "search-prev", Handler::jump(motion_search_prev, Argument::None));
    registry.register(modes, "*", "search-word", Handler::jump(motion_star, Argument::None));
    registry.register(modes, "#", "search-word-backward", Handler::jump(motion_hash, Argument::None));
    registry.register(modes, "`", "goto-mark", Handler::jump(motion_mark_exact, Argument::Char));
    registry.register(modes, "'", "goto-mark-line", Handler::jump(motion_mark_line, Argument::Char));
}
