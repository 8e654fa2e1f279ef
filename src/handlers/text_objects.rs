//! Built-in text objects

use super::motions::{classify, CharClass};
use super::{Handler, HandlerContext, HandlerRegistry, TextObjectRange};
use crate::buffer::{BufferView, TextRange};
use crate::error::Result;
use crate::keymap::MapModes;

/// End of the run of same-class characters starting at `pos`, limited to
/// `end`
fn run_end<B: BufferView + ?Sized>(buffer: &B, pos: usize, end: usize) -> usize {
    let Some(class) = buffer.char_at(pos).map(classify) else {
        return pos;
    };
    let mut p = pos;
    while p < end && buffer.char_at(p).map(classify) == Some(class) {
        p += 1;
    }
    p
}

fn run_start<B: BufferView + ?Sized>(buffer: &B, pos: usize, start: usize) -> usize {
    let Some(class) = buffer.char_at(pos).map(classify) else {
        return pos;
    };
    let mut p = pos;
    while p > start && buffer.char_at(p - 1).map(classify) == Some(class) {
        p -= 1;
    }
    p
}

/// `iw`: `count` runs of word or blank characters from the one under the
/// caret
pub fn inner_word<B: BufferView + ?Sized>(buffer: &B, caret: usize, count: usize) -> Option<TextRange> {
    let line = buffer.line_of_offset(caret);
    let (start, end) = (buffer.line_start(line), buffer.line_end(line));
    if start == end {
        return None;
    }
    let caret = caret.min(end - 1);
    let from = run_start(buffer, caret, start);
    let mut to = caret;
    for _ in 0..count.max(1) {
        if to >= end {
            break;
        }
        to = run_end(buffer, to, end);
    }
    Some(TextRange::new(from, to))
}

/// `aw`: words with their trailing blanks, or leading blanks at the end
/// of the line
pub fn a_word<B: BufferView + ?Sized>(buffer: &B, caret: usize, count: usize) -> Option<TextRange> {
    let line = buffer.line_of_offset(caret);
    let (start, end) = (buffer.line_start(line), buffer.line_end(line));
    if start == end {
        return None;
    }
    let caret = caret.min(end - 1);
    let is_blank = |p: usize| buffer.char_at(p).map(classify) == Some(CharClass::Whitespace);

    let mut from = run_start(buffer, caret, start);
    let mut to = caret;
    let started_on_blank = is_blank(caret);
    for _ in 0..count.max(1) {
        if to >= end {
            break;
        }
        if started_on_blank {
            // Blank run followed by a word
            to = run_end(buffer, to, end);
            if to < end {
                to = run_end(buffer, to, end);
            }
        } else {
            if is_blank(to) {
                to = run_end(buffer, to, end);
            }
            to = run_end(buffer, to, end);
            if to < end && is_blank(to) {
                to = run_end(buffer, to, end);
            }
        }
    }
    if !started_on_blank && (to == end || !is_blank(to - 1)) {
        // No trailing blanks: take the leading ones instead
        while from > start && is_blank(from - 1) {
            from -= 1;
        }
    }
    Some(TextRange::new(from, to))
}

fn object_inner_word(ctx: &mut HandlerContext<'_>) -> Result<Option<TextObjectRange>> {
    Ok(inner_word(ctx.buffer(), ctx.state.caret(), ctx.count1()).map(|range| TextObjectRange {
        range,
        linewise: false,
    }))
}

fn object_a_word(ctx: &mut HandlerContext<'_>) -> Result<Option<TextObjectRange>> {
    Ok(a_word(ctx.buffer(), ctx.state.caret(), ctx.count1()).map(|range| TextObjectRange {
        range,
        linewise: false,
    }))
}

fn search_match(ctx: &HandlerContext<'_>, forward: bool) -> Option<TextObjectRange> {
    let opts = ctx.search_options();
    ctx.engine
        .search
        .next_match_object(ctx.state.buffer(), ctx.state.caret(), ctx.count1(), forward, 0, &opts)
        .filter(|range| !range.is_empty())
        .map(|range| TextObjectRange {
            range,
            linewise: false,
        })
}

fn object_next_match(ctx: &mut HandlerContext<'_>) -> Result<Option<TextObjectRange>> {
    Ok(search_match(ctx, true))
}

fn object_prev_match(ctx: &mut HandlerContext<'_>) -> Result<Option<TextObjectRange>> {
    Ok(search_match(ctx, false))
}

pub(super) fn register(registry: &mut HandlerRegistry) {
    let modes = MapModes::VISUAL | MapModes::OP_PENDING;
    registry.register(modes, "iw", "inner-word", Handler::text_object(object_inner_word));
    registry.register(modes, "aw", "a-word", Handler::text_object(object_a_word));
    registry.register(modes, "gn", "next-match", Handler::text_object(object_next_match));
    registry.register(modes, "gN", "prev-match", Handler::text_object(object_prev_match));
}
