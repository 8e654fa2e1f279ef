//! Built-in operators
//!
//! Every operator gets an [`OperatorRange`] already adjusted for the motion
//! kind or the visual selection. Blockwise segments are edited bottom-up
//! so earlier offsets stay valid.

use super::motions::first_non_blank;
use super::{Handler, HandlerContext, HandlerRegistry, MotionKind, MotionTarget};
use crate::buffer::{BufferMut, BufferView, Position, TextRange};
use crate::constants::errors::TEXT_TOO_LONG;
use crate::constants::limits::MAX_INSERT_BYTES;
use crate::error::{EngineError, ErrorType, Result};
use crate::keymap::MapModes;
use crate::mode::Mode;
use crate::registers::Register;
use crate::state::{EditorState, OperatorRange, RangeKind};

/// Range between the caret and a motion target
pub fn motion_range(state: &EditorState, target: MotionTarget) -> OperatorRange {
    let buffer = state.buffer();
    let caret = state.caret();
    let lo = caret.min(target.offset);
    let hi = caret.max(target.offset);
    match target.kind {
        MotionKind::Exclusive => OperatorRange::charwise(TextRange::new(lo, hi)),
        MotionKind::Inclusive => {
            // An inclusive motion never takes the line break it lands on
            let end = if buffer.char_at(hi).is_some_and(|c| c != '\n') {
                hi + 1
            } else {
                hi
            };
            OperatorRange::charwise(TextRange::new(lo, end))
        }
        MotionKind::Linewise => {
            let first = buffer.line_of_offset(lo);
            let last = buffer.line_of_offset(hi);
            OperatorRange::linewise(state.line_span(first, last))
        }
    }
}

/// Range for a doubled operator (`dd`, `3yy`)
pub fn lines_range(state: &EditorState, count: usize) -> OperatorRange {
    let first = state.caret_line();
    let last = first.saturating_add(count.max(1) - 1);
    OperatorRange::linewise(state.line_span(first, last))
}

/// Register text for a range; linewise text always ends in a line break
fn register_text(state: &EditorState, range: &OperatorRange) -> Register {
    let buffer = state.buffer();
    match range.kind {
        RangeKind::Charwise => Register::new(buffer.slice(range.span()), false),
        RangeKind::Linewise => {
            let mut text = buffer.slice(range.span());
            if let Some(rest) = text.strip_prefix('\n') {
                // Span of the last line starts at the previous break
                text = format!("{rest}\n");
            } else if !text.ends_with('\n') {
                text.push('\n');
            }
            Register::new(text, true)
        }
        RangeKind::Blockwise => {
            let parts: Vec<String> = range.ranges.iter().map(|r| buffer.slice(*r)).collect();
            Register::new(parts.join("\n"), false)
        }
    }
}

fn delete_ranges(state: &mut EditorState, range: &OperatorRange) -> Result<()> {
    for r in range.ranges.iter().rev() {
        if !r.is_empty() {
            state.buffer_mut().delete(*r)?;
        }
    }
    Ok(())
}

pub(super) fn operator_delete(ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
    let span = range.span();
    let register = register_text(ctx.state, &range);
    ctx.engine.registers.write().record_delete(ctx.register, register);
    delete_ranges(ctx.state, &range)?;

    let start = span.start.min(ctx.state.buffer().len());
    ctx.state.mark_change(TextRange::new(start, start));
    let caret = match range.kind {
        RangeKind::Linewise => {
            let line = ctx.state.buffer().line_of_offset(start);
            first_non_blank(ctx.state.buffer(), line)
        }
        _ => start,
    };
    ctx.state.set_caret(caret);
    tracing::debug!(start = span.start, end = span.end, kind = ?range.kind, "delete");
    Ok(())
}

pub(super) fn operator_change(ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
    let register = register_text(ctx.state, &range);
    ctx.engine.registers.write().record_delete(ctx.register, register);

    let start = match range.kind {
        RangeKind::Linewise => {
            // Keep one empty line to type into
            let buffer = ctx.state.buffer();
            let span = range.span();
            let first = buffer.line_of_offset(span.start);
            let first = if buffer.char_at(span.start) == Some('\n') && span.start > 0 {
                first + 1
            } else {
                first
            };
            let last = buffer.line_of_offset(span.end.saturating_sub(1).max(span.start));
            let inner = TextRange::new(buffer.line_start(first), buffer.line_end(last.max(first)));
            ctx.state.buffer_mut().delete(inner)?;
            inner.start
        }
        _ => {
            delete_ranges(ctx.state, &range)?;
            range.span().start
        }
    };
    ctx.state.enter_mode(Mode::Insert)?;
    ctx.state.insert_start = Some(start);
    ctx.state.set_caret(start);
    ctx.state.mark_change(TextRange::new(start, start));
    Ok(())
}

fn operator_yank(ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
    let register = register_text(ctx.state, &range);
    ctx.engine.registers.write().record_yank(ctx.register, register);

    let span = range.span();
    ctx.state.mark_change(span);
    let caret = ctx.state.caret();
    let target = match range.kind {
        RangeKind::Linewise => {
            let buffer = ctx.state.buffer();
            let first = buffer.line_of_offset(span.start);
            let first = if buffer.char_at(span.start) == Some('\n') && span.start > 0 {
                first + 1
            } else {
                first
            };
            let pos = buffer.offset_to_position(caret);
            if pos.line > first {
                buffer.position_to_offset(Position::new(first, pos.column))
            } else {
                caret
            }
        }
        _ => span.start,
    };
    ctx.state.set_caret(target);
    Ok(())
}

/// Visual width of leading whitespace
fn indent_width(line: &str, tabstop: usize) -> (usize, usize) {
    let mut width = 0;
    let mut chars = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += tabstop - width % tabstop,
            _ => break,
        }
        chars += 1;
    }
    (width, chars)
}

fn make_indent(width: usize, tabstop: usize, expandtab: bool) -> String {
    if expandtab {
        " ".repeat(width)
    } else {
        let mut s = "\t".repeat(width / tabstop);
        s.push_str(&" ".repeat(width % tabstop));
        s
    }
}

pub(super) fn text_too_long() -> EngineError {
    EngineError::new(ErrorType::Input, TEXT_TOO_LONG, "Resulting text too long")
}

fn shift(ctx: &mut HandlerContext<'_>, range: OperatorRange, right: bool) -> Result<()> {
    let tabstop = ctx.option_number("tabstop").max(1) as usize;
    let shiftwidth = match ctx.option_number("shiftwidth") {
        n if n > 0 => n as usize,
        _ => tabstop,
    };
    let expandtab = ctx.option_flag("expandtab");
    let amount = shiftwidth
        .checked_mul(ctx.count1())
        .filter(|&n| n <= MAX_INSERT_BYTES)
        .ok_or_else(text_too_long)?;

    let buffer = ctx.state.buffer();
    let span = range.span();
    let first = buffer.line_of_offset(span.start);
    let first = if buffer.char_at(span.start) == Some('\n') && range.kind == RangeKind::Linewise {
        first + 1
    } else {
        first
    };
    let last = buffer.line_of_offset(span.end.saturating_sub(1).max(span.start));

    for line in (first..=last.max(first)).rev() {
        let text = ctx.state.buffer().line_text(line);
        if right && text.is_empty() {
            continue;
        }
        let (width, chars) = indent_width(&text, tabstop);
        let new_width = if right {
            width
                .checked_add(amount)
                .filter(|&n| n <= MAX_INSERT_BYTES)
                .ok_or_else(text_too_long)?
        } else {
            width.saturating_sub(amount)
        };
        let start = ctx.state.buffer().line_start(line);
        let indent = make_indent(new_width, tabstop, expandtab);
        ctx.state
            .buffer_mut()
            .replace(TextRange::new(start, start + chars), &indent)?;
    }
    let start = ctx.state.buffer().line_start(first);
    let end = ctx.state.buffer().line_end(last.max(first));
    ctx.state.mark_change(TextRange::new(start, end));
    let caret = first_non_blank(ctx.state.buffer(), first);
    ctx.state.set_caret(caret);
    Ok(())
}

fn operator_shift_right(ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
    shift(ctx, range, true)
}

fn operator_shift_left(ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
    shift(ctx, range, false)
}

fn map_case(ctx: &mut HandlerContext<'_>, range: OperatorRange, f: fn(char) -> String) -> Result<()> {
    for r in range.ranges.iter().rev() {
        let text = ctx.state.buffer().slice(*r);
        let mapped: String = text.chars().map(f).collect();
        if mapped != text {
            ctx.state.buffer_mut().replace(*r, &mapped)?;
        }
    }
    let span = range.span();
    ctx.state.mark_change(span);
    let caret = match range.kind {
        RangeKind::Linewise if ctx.state.buffer().char_at(span.start) == Some('\n') => {
            span.start + 1
        }
        _ => span.start,
    };
    ctx.state.set_caret(caret);
    Ok(())
}

fn lower(c: char) -> String {
    c.to_lowercase().collect()
}

fn upper(c: char) -> String {
    c.to_uppercase().collect()
}

fn toggle(c: char) -> String {
    if c.is_uppercase() {
        lower(c)
    } else {
        upper(c)
    }
}

fn operator_lowercase(ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
    map_case(ctx, range, lower)
}

fn operator_uppercase(ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
    map_case(ctx, range, upper)
}

fn operator_toggle_case(ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
    map_case(ctx, range, toggle)
}

pub(super) fn register(registry: &mut HandlerRegistry) {
    let modes = MapModes::NORMAL | MapModes::VISUAL;
    registry.register(modes, "d", "delete", Handler::operator(operator_delete));
    registry.register(modes, "c", "change", Handler::operator(operator_change));
    registry.register(modes, "y", "yank", Handler::operator(operator_yank));
    registry.register(modes, ">", "shift-right", Handler::operator(operator_shift_right));
    registry.register(modes, "<lt>", "shift-left", Handler::operator(operator_shift_left));
    registry.register(modes, "gu", "lowercase", Handler::operator(operator_lowercase));
    registry.register(modes, "gU", "uppercase", Handler::operator(operator_uppercase));
    registry.register(modes, "g~", "toggle-case", Handler::operator(operator_toggle_case));
}
