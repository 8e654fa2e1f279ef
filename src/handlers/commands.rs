//! Built-in commands for every mode

use super::motions::{first_non_blank, pattern_not_found, prev_word_start};
use super::operators::{operator_change, operator_delete, text_too_long};
use super::{Handler, HandlerContext, HandlerRegistry};
use crate::buffer::{BufferMut, BufferView, Position, TextRange};
use crate::constants::errors::{NOTHING_IN_REGISTER, NO_PREVIOUS_REGEX};
use crate::constants::limits::MAX_INSERT_BYTES;
use crate::dispatcher::combine_counts;
use crate::error::{EngineError, ErrorType, Result};
use crate::keymap::MapModes;
use crate::mode::{Mode, VisualSubMode};
use crate::registers::{self, Register};
use crate::search::SearchDirection;
use crate::state::{CommandLine, CommandLineKind, EditorState, OperatorRange, RangeKind};

// Normal mode: entering insert and replace

fn insert_before(ctx: &mut HandlerContext<'_>) -> Result<()> {
    ctx.state.enter_mode(Mode::Insert)
}

fn insert_after(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let caret = ctx.state.caret();
    let line = ctx.state.caret_line();
    let end = ctx.state.buffer().line_end(line);
    ctx.state.enter_mode(Mode::Insert)?;
    ctx.state.set_caret((caret + 1).min(end));
    ctx.state.insert_start = Some(ctx.state.caret());
    Ok(())
}

fn insert_line_start(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let line = ctx.state.caret_line();
    let target = first_non_blank(ctx.state.buffer(), line);
    ctx.state.enter_mode(Mode::Insert)?;
    ctx.state.set_caret(target);
    ctx.state.insert_start = Some(target);
    Ok(())
}

fn insert_line_end(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let line = ctx.state.caret_line();
    let target = ctx.state.buffer().line_end(line);
    ctx.state.enter_mode(Mode::Insert)?;
    ctx.state.set_caret(target);
    ctx.state.insert_start = Some(target);
    Ok(())
}

fn open_line(ctx: &mut HandlerContext<'_>, below: bool) -> Result<()> {
    let line = ctx.state.caret_line();
    let caret = if below {
        let end = ctx.state.buffer().line_end(line);
        ctx.state.buffer_mut().insert(end, "\n")?;
        end + 1
    } else {
        let start = ctx.state.buffer().line_start(line);
        ctx.state.buffer_mut().insert(start, "\n")?;
        start
    };
    ctx.state.enter_mode(Mode::Insert)?;
    ctx.state.set_caret(caret);
    ctx.state.insert_start = Some(caret);
    Ok(())
}

fn open_line_below(ctx: &mut HandlerContext<'_>) -> Result<()> {
    open_line(ctx, true)
}

fn open_line_above(ctx: &mut HandlerContext<'_>) -> Result<()> {
    open_line(ctx, false)
}

fn replace_mode(ctx: &mut HandlerContext<'_>) -> Result<()> {
    ctx.state.enter_mode(Mode::Replace)
}

// Visual and select mode entry

fn toggle_visual(ctx: &mut HandlerContext<'_>, sub: VisualSubMode) -> Result<()> {
    match ctx.state.mode() {
        Mode::Visual(current) if current == sub => ctx.state.enter_mode(Mode::Normal),
        Mode::Visual(_) | Mode::Select(_) => {
            let anchor = ctx.state.visual_anchor();
            ctx.state.enter_mode(Mode::Visual(sub))?;
            ctx.state.set_visual_anchor(anchor);
            Ok(())
        }
        _ => ctx.state.enter_mode(Mode::Visual(sub)),
    }
}

fn visual_char(ctx: &mut HandlerContext<'_>) -> Result<()> {
    toggle_visual(ctx, VisualSubMode::Character)
}

fn visual_line(ctx: &mut HandlerContext<'_>) -> Result<()> {
    toggle_visual(ctx, VisualSubMode::Line)
}

fn visual_block(ctx: &mut HandlerContext<'_>) -> Result<()> {
    toggle_visual(ctx, VisualSubMode::Block)
}

fn select_char(ctx: &mut HandlerContext<'_>) -> Result<()> {
    ctx.state.enter_mode(Mode::Select(VisualSubMode::Character))
}

fn select_line(ctx: &mut HandlerContext<'_>) -> Result<()> {
    ctx.state.enter_mode(Mode::Select(VisualSubMode::Line))
}

fn select_block(ctx: &mut HandlerContext<'_>) -> Result<()> {
    ctx.state.enter_mode(Mode::Select(VisualSubMode::Block))
}

fn reselect(ctx: &mut HandlerContext<'_>) -> Result<()> {
    ctx.state.restore_visual(false)?;
    Ok(())
}

/// `<C-g>` switches between visual and select keeping the selection
fn switch_visual_select(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let anchor = ctx.state.visual_anchor();
    let target = match ctx.state.mode() {
        Mode::Visual(sub) => Mode::Select(sub),
        Mode::Select(sub) => Mode::Visual(sub),
        _ => return Ok(()),
    };
    ctx.state.enter_mode(target)?;
    ctx.state.set_visual_anchor(anchor);
    Ok(())
}

/// `o` in visual: jump to the other end of the selection
fn swap_selection_end(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let anchor = ctx.state.visual_anchor();
    let caret = ctx.state.caret();
    ctx.state.set_visual_anchor(caret);
    ctx.state.set_caret(anchor);
    Ok(())
}

/// Selection adjustment for the `selection` option
fn selection_adjustment(ctx: &HandlerContext<'_>) -> usize {
    if ctx.exclusive_selection() {
        0
    } else {
        1
    }
}

/// `gn`/`gN` from normal mode select the match visually
fn select_match(ctx: &mut HandlerContext<'_>, forward: bool) -> Result<()> {
    let opts = ctx.search_options();
    let adjustment = selection_adjustment(ctx);
    let Some(range) = ctx.engine.search.next_match_object(
        ctx.state.buffer(),
        ctx.state.caret(),
        ctx.count1(),
        forward,
        adjustment,
        &opts,
    ) else {
        return Ok(());
    };
    ctx.state.enter_mode(Mode::Visual(VisualSubMode::Character))?;
    ctx.state.set_visual_anchor(range.start);
    ctx.state.set_caret(range.end.max(range.start));
    Ok(())
}

fn select_next_match(ctx: &mut HandlerContext<'_>) -> Result<()> {
    select_match(ctx, true)
}

fn select_prev_match(ctx: &mut HandlerContext<'_>) -> Result<()> {
    select_match(ctx, false)
}

// Command line

fn open_command_line(ctx: &mut HandlerContext<'_>, kind: CommandLineKind) -> Result<()> {
    let return_mode = ctx.state.mode();
    let mut line = CommandLine::new(kind, return_mode, ctx.state.caret());
    line.operator = ctx.operator.take();
    line.count = ctx.count;
    if kind == CommandLineKind::Ex {
        if return_mode.has_active_selection() {
            line.insert_str("'<,'>");
        } else if let Some(count) = ctx.count {
            if count > 1 {
                line.insert_str(&format!(".,.+{}", count - 1));
            } else {
                line.insert('.');
            }
        }
    }
    ctx.state.enter_mode(Mode::CommandLine)?;
    ctx.state.command_line = Some(line);
    Ok(())
}

fn ex_command(ctx: &mut HandlerContext<'_>) -> Result<()> {
    open_command_line(ctx, CommandLineKind::Ex)
}

fn search_forward(ctx: &mut HandlerContext<'_>) -> Result<()> {
    open_command_line(ctx, CommandLineKind::Search(SearchDirection::Forward))
}

fn search_backward(ctx: &mut HandlerContext<'_>) -> Result<()> {
    open_command_line(ctx, CommandLineKind::Search(SearchDirection::Backward))
}

/// Leave the command line for the mode it was opened from
fn close_command_line(state: &mut EditorState, line: &CommandLine) -> Result<()> {
    match line.return_mode {
        Mode::Visual(_) => {
            state.restore_visual(false)?;
        }
        Mode::Select(_) => {
            state.restore_visual(true)?;
        }
        _ => state.enter_mode(Mode::Normal)?,
    }
    Ok(())
}

fn cmdline_cancel(ctx: &mut HandlerContext<'_>) -> Result<()> {
    match ctx.state.command_line.take() {
        Some(line) => {
            close_command_line(ctx.state, &line)?;
            ctx.state.set_caret(line.origin);
            Ok(())
        }
        None => {
            ctx.state.reset_mode();
            Ok(())
        }
    }
}

fn cmdline_execute(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let Some(line) = ctx.state.command_line.take() else {
        ctx.state.reset_mode();
        return Ok(());
    };
    let text = line.text();
    match line.kind {
        CommandLineKind::Ex => {
            ctx.state.enter_mode(Mode::Normal)?;
            crate::ex::execute(ctx.engine, ctx.state, &text)
        }
        CommandLineKind::Search(direction) => {
            close_command_line(ctx.state, &line)?;
            run_search(ctx, line, &text, direction)
        }
    }
}

fn run_search(
    ctx: &mut HandlerContext<'_>,
    line: CommandLine,
    text: &str,
    direction: SearchDirection,
) -> Result<()> {
    let pattern = if text.is_empty() {
        ctx.engine.search.last_pattern().ok_or_else(|| {
            EngineError::new(
                ErrorType::Search,
                NO_PREVIOUS_REGEX,
                "No previous regular expression",
            )
        })?
    } else {
        text.to_string()
    };
    let opts = ctx.search_options();
    let count = combine_counts(line.count, line.operator.as_ref().and_then(|op| op.count))
        .unwrap_or(1)
        .max(1);
    let found = ctx.engine.search.find(
        ctx.state.buffer(),
        &pattern,
        line.origin,
        direction,
        count,
        &opts,
    )?;
    let Some(range) = found else {
        return Err(pattern_not_found(&pattern));
    };
    tracing::debug!(pattern = %pattern, start = range.start, "search hit");
    match line.operator {
        Some(op) => {
            let span = TextRange::between(line.origin, range.start);
            ctx.register = op.register;
            ctx.count = None;
            op.handler.apply(ctx, OperatorRange::charwise(span))
        }
        None => {
            ctx.state.mark_jump();
            ctx.state.set_caret(range.start);
            Ok(())
        }
    }
}

fn cmdline_backspace(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let Some(line) = ctx.state.command_line.as_mut() else {
        return Ok(());
    };
    if line.text.is_empty() {
        return cmdline_cancel(ctx);
    }
    if line.cursor > 0 {
        line.cursor -= 1;
        line.text.remove(line.cursor);
    }
    Ok(())
}

fn cmdline_delete(ctx: &mut HandlerContext<'_>) -> Result<()> {
    if let Some(line) = ctx.state.command_line.as_mut() {
        if line.cursor < line.text.len() {
            line.text.remove(line.cursor);
        } else if line.cursor > 0 {
            line.cursor -= 1;
            line.text.remove(line.cursor);
        }
    }
    Ok(())
}

fn cmdline_move(ctx: &mut HandlerContext<'_>, f: fn(&CommandLine) -> usize) -> Result<()> {
    if let Some(line) = ctx.state.command_line.as_mut() {
        line.cursor = f(line).min(line.text.len());
    }
    Ok(())
}

fn cmdline_left(ctx: &mut HandlerContext<'_>) -> Result<()> {
    cmdline_move(ctx, |l| l.cursor.saturating_sub(1))
}

fn cmdline_right(ctx: &mut HandlerContext<'_>) -> Result<()> {
    cmdline_move(ctx, |l| l.cursor + 1)
}

fn cmdline_home(ctx: &mut HandlerContext<'_>) -> Result<()> {
    cmdline_move(ctx, |_| 0)
}

fn cmdline_end(ctx: &mut HandlerContext<'_>) -> Result<()> {
    cmdline_move(ctx, |l| l.text.len())
}

fn cmdline_kill(ctx: &mut HandlerContext<'_>) -> Result<()> {
    if let Some(line) = ctx.state.command_line.as_mut() {
        line.text.drain(..line.cursor);
        line.cursor = 0;
    }
    Ok(())
}

// Normal mode edits

fn delete_chars(ctx: &mut HandlerContext<'_>, forward: bool) -> Result<()> {
    let caret = ctx.state.caret();
    let line = ctx.state.caret_line();
    let buffer = ctx.state.buffer();
    let range = if forward {
        TextRange::new(caret, caret.saturating_add(ctx.count1()).min(buffer.line_end(line)))
    } else {
        TextRange::new(caret.saturating_sub(ctx.count1()).max(buffer.line_start(line)), caret)
    };
    if range.is_empty() {
        return Ok(());
    }
    operator_delete(ctx, OperatorRange::charwise(range))
}

fn delete_char(ctx: &mut HandlerContext<'_>) -> Result<()> {
    delete_chars(ctx, true)
}

fn delete_char_before(ctx: &mut HandlerContext<'_>) -> Result<()> {
    delete_chars(ctx, false)
}

/// Caret to the end of the line `count - 1` lines down
fn to_line_end(ctx: &HandlerContext<'_>) -> OperatorRange {
    let buffer = ctx.state.buffer();
    let last = (ctx.state.caret_line().saturating_add(ctx.count1() - 1))
        .min(buffer.line_count().saturating_sub(1));
    OperatorRange::charwise(TextRange::new(ctx.state.caret(), buffer.line_end(last)))
}

fn delete_to_end(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let range = to_line_end(ctx);
    operator_delete(ctx, range)
}

fn change_to_end(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let range = to_line_end(ctx);
    operator_change(ctx, range)
}

fn register_contents(ctx: &HandlerContext<'_>) -> Result<Register> {
    let name = ctx.register.unwrap_or(registers::UNNAMED);
    ctx.engine
        .registers
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| {
            EngineError::new(
                ErrorType::Input,
                NOTHING_IN_REGISTER,
                format!("Nothing in register {name}"),
            )
        })
}

/// Register text `count` times, refusing results too large to insert
fn repeat_register(register: &Register, count: usize) -> Result<String> {
    match register.text.len().checked_mul(count) {
        Some(len) if len <= MAX_INSERT_BYTES => Ok(register.text.repeat(count)),
        _ => Err(text_too_long()),
    }
}

fn put(ctx: &mut HandlerContext<'_>, before: bool) -> Result<()> {
    let register = register_contents(ctx)?;
    let text = repeat_register(&register, ctx.count1())?;
    let line = ctx.state.caret_line();
    let buffer = ctx.state.buffer();
    if register.linewise {
        let (at, text) = if before {
            (buffer.line_start(line), text)
        } else if line + 1 < buffer.line_count() {
            (buffer.line_start(line + 1), text)
        } else {
            // No line after the last one: move the break to the front
            let body = text.strip_suffix('\n').unwrap_or(&text);
            (buffer.len(), format!("\n{body}"))
        };
        ctx.state.buffer_mut().insert(at, &text)?;
        let first = ctx.state.buffer().line_of_offset(at) + usize::from(text.starts_with('\n'));
        let len = text.chars().count();
        ctx.state.mark_change(TextRange::new(at, at + len));
        let caret = first_non_blank(ctx.state.buffer(), first);
        ctx.state.set_caret(caret);
    } else {
        let caret = ctx.state.caret();
        let at = if before || buffer.line_end(line) == buffer.line_start(line) {
            caret
        } else {
            caret + 1
        };
        ctx.state.buffer_mut().insert(at, &text)?;
        let len = text.chars().count();
        ctx.state.mark_change(TextRange::new(at, at + len));
        ctx.state.set_caret((at + len).saturating_sub(1).max(at));
    }
    Ok(())
}

fn put_after(ctx: &mut HandlerContext<'_>) -> Result<()> {
    put(ctx, false)
}

fn put_before(ctx: &mut HandlerContext<'_>) -> Result<()> {
    put(ctx, true)
}

/// `p` in visual: replace the selection with a register
fn put_over_selection(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let register = register_contents(ctx)?;
    let exclusive = ctx.exclusive_selection();
    let Some(selection) = ctx.state.selection_range(exclusive) else {
        return Ok(());
    };
    ctx.state.enter_mode(Mode::Normal)?;
    let span = selection.span();
    ctx.register = None;
    operator_delete(ctx, selection.clone())?;

    let mut text = repeat_register(&register, ctx.count1())?;
    let at = match selection.kind {
        RangeKind::Linewise => {
            let at = span.start.min(ctx.state.buffer().len());
            if ctx.state.buffer().char_at(at.saturating_sub(1)) == Some('\n') || at == 0 {
                if !register.linewise {
                    text.push('\n');
                }
                at
            } else {
                // Removed the last line: start a new one
                text = format!("\n{}", text.strip_suffix('\n').unwrap_or(&text));
                at
            }
        }
        _ => {
            if register.linewise {
                text = format!("\n{text}");
            }
            span.start
        }
    };
    ctx.state.buffer_mut().insert(at, &text)?;
    let len = text.chars().count();
    ctx.state.mark_change(TextRange::new(at, at + len));
    ctx.state.set_caret(at);
    Ok(())
}

fn set_mark(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let Some(name) = ctx.arg_char() else {
        return Ok(());
    };
    let pos = ctx.state.caret_position();
    ctx.state.marks.set_mark(pos, name)
}

fn replace_char(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let Some(c) = ctx.arg_char() else {
        return Ok(());
    };
    let caret = ctx.state.caret();
    let line = ctx.state.caret_line();
    let count = ctx.count1();
    if caret.saturating_add(count) > ctx.state.buffer().line_end(line) {
        return Ok(());
    }
    let text: String = std::iter::repeat(c).take(count).collect();
    let range = TextRange::new(caret, caret + count);
    ctx.state.buffer_mut().replace(range, &text)?;
    ctx.state.mark_change(range);
    ctx.state.set_caret(caret + count - 1);
    Ok(())
}

fn to_normal(ctx: &mut HandlerContext<'_>) -> Result<()> {
    if ctx.state.mode() != Mode::Normal {
        ctx.state.enter_mode(Mode::Normal)?;
    }
    Ok(())
}

// Select mode

fn select_delete(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let exclusive = ctx.exclusive_selection();
    let Some(selection) = ctx.state.selection_range(exclusive) else {
        return Ok(());
    };
    ctx.state.enter_mode(Mode::Normal)?;
    operator_delete(ctx, selection)
}

/// Printable key in select mode: the selection is replaced by the key
pub fn select_replace(ctx: &mut HandlerContext<'_>, c: char) -> Result<()> {
    let exclusive = ctx.exclusive_selection();
    let Some(mut selection) = ctx.state.selection_range(exclusive) else {
        return Ok(());
    };
    if selection.kind == RangeKind::Linewise {
        // Replace the lines' text but keep one line
        let buffer = ctx.state.buffer();
        let span = selection.span();
        let mut first = buffer.line_of_offset(span.start);
        if buffer.char_at(span.start) == Some('\n') && span.start > 0 {
            first += 1;
        }
        let last = buffer.line_of_offset(span.end.saturating_sub(1).max(span.start));
        selection = OperatorRange::charwise(TextRange::new(
            buffer.line_start(first),
            buffer.line_end(last.max(first)),
        ));
    }
    let start = selection.span().start;
    ctx.state.enter_mode(Mode::Normal)?;
    for r in selection.ranges.iter().rev() {
        ctx.state.buffer_mut().delete(*r)?;
    }
    ctx.state.enter_mode(Mode::Insert)?;
    ctx.state.set_caret(start);
    ctx.state.insert_start = Some(start);
    insert_text(ctx.state, &c.to_string())
}

// Insert and replace mode

/// Insert typed text at the caret, overwriting in replace mode
pub fn insert_text(state: &mut EditorState, text: &str) -> Result<()> {
    for c in text.chars() {
        let caret = state.caret();
        let overwrite = state.mode() == Mode::Replace
            && c != '\n'
            && state.buffer().char_at(caret).is_some_and(|ch| ch != '\n');
        let original = if overwrite {
            let original = state.buffer().char_at(caret);
            state
                .buffer_mut()
                .replace(TextRange::new(caret, caret + 1), &c.to_string())?;
            original
        } else {
            let mut buf = [0u8; 4];
            state.buffer_mut().insert(caret, c.encode_utf8(&mut buf))?;
            None
        };
        if state.mode() == Mode::Replace {
            state.replaced.push((caret, original));
        }
        state.set_caret_past_end(caret + 1);
    }
    Ok(())
}

fn insert_backspace(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let caret = ctx.state.caret();
    if caret == 0 {
        return Ok(());
    }
    if ctx.state.mode() == Mode::Replace {
        return replace_backspace(ctx.state, caret);
    }
    ctx.state
        .buffer_mut()
        .delete(TextRange::new(caret - 1, caret))?;
    ctx.state.set_caret(caret - 1);
    Ok(())
}

/// Undo the last replaced character, or only step back over text that was
/// there before REPLACE started
fn replace_backspace(state: &mut EditorState, caret: usize) -> Result<()> {
    match state.replaced.last() {
        Some(&(at, original)) if at + 1 == caret => {
            state.replaced.pop();
            let range = TextRange::new(at, caret);
            match original {
                Some(c) => state.buffer_mut().replace(range, &c.to_string())?,
                None => state.buffer_mut().delete(range)?,
            };
        }
        _ => state.replaced.clear(),
    }
    state.set_caret(caret - 1);
    Ok(())
}

fn insert_delete(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let caret = ctx.state.caret();
    if caret < ctx.state.buffer().len() {
        ctx.state
            .buffer_mut()
            .delete(TextRange::new(caret, caret + 1))?;
    }
    Ok(())
}

fn insert_newline(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let caret = ctx.state.caret();
    ctx.state.buffer_mut().insert(caret, "\n")?;
    ctx.state.set_caret(caret + 1);
    Ok(())
}

fn insert_tab(ctx: &mut HandlerContext<'_>) -> Result<()> {
    if ctx.option_flag("expandtab") {
        let tabstop = ctx.option_number("tabstop").max(1) as usize;
        let column = ctx.state.caret_position().column;
        let spaces = tabstop - column % tabstop;
        insert_text(ctx.state, &" ".repeat(spaces))
    } else {
        insert_text(ctx.state, "\t")
    }
}

fn insert_move(ctx: &mut HandlerContext<'_>, f: fn(&EditorState) -> usize) -> Result<()> {
    let target = f(ctx.state);
    ctx.state.set_caret(target);
    ctx.state.insert_start = Some(ctx.state.caret());
    Ok(())
}

fn insert_left(ctx: &mut HandlerContext<'_>) -> Result<()> {
    insert_move(ctx, |s| {
        let start = s.buffer().line_start(s.caret_line());
        s.caret().saturating_sub(1).max(start)
    })
}

fn insert_right(ctx: &mut HandlerContext<'_>) -> Result<()> {
    insert_move(ctx, |s| {
        let end = s.buffer().line_end(s.caret_line());
        (s.caret() + 1).min(end)
    })
}

fn insert_home(ctx: &mut HandlerContext<'_>) -> Result<()> {
    insert_move(ctx, |s| s.buffer().line_start(s.caret_line()))
}

fn insert_end(ctx: &mut HandlerContext<'_>) -> Result<()> {
    insert_move(ctx, |s| s.buffer().line_end(s.caret_line()))
}

fn insert_up(ctx: &mut HandlerContext<'_>) -> Result<()> {
    insert_move(ctx, |s| {
        let pos = s.caret_position();
        if pos.line == 0 {
            return s.caret();
        }
        s.buffer().position_to_offset(Position::new(pos.line - 1, pos.column))
    })
}

fn insert_down(ctx: &mut HandlerContext<'_>) -> Result<()> {
    insert_move(ctx, |s| {
        let pos = s.caret_position();
        s.buffer().position_to_offset(Position::new(pos.line + 1, pos.column))
    })
}

/// `<C-w>`: delete the word before the caret
fn insert_delete_word(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let caret = ctx.state.caret();
    let line_start = ctx.state.buffer().line_start(ctx.state.caret_line());
    let start = prev_word_start(ctx.state.buffer(), caret).max(line_start);
    let start = if start == caret { caret.saturating_sub(1) } else { start };
    if start < caret {
        ctx.state.buffer_mut().delete(TextRange::new(start, caret))?;
        ctx.state.set_caret(start);
    }
    Ok(())
}

/// `<C-u>`: delete what was typed on this line, or everything before the
/// caret when nothing was
fn insert_delete_line(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let caret = ctx.state.caret();
    let line_start = ctx.state.buffer().line_start(ctx.state.caret_line());
    let start = match ctx.state.insert_start {
        Some(s) if s > line_start && s < caret => s,
        _ => line_start,
    };
    if start < caret {
        ctx.state.buffer_mut().delete(TextRange::new(start, caret))?;
        ctx.state.set_caret(start);
    }
    Ok(())
}

/// `<C-r>{reg}`: insert a register's text
fn insert_register(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let Some(name) = ctx.arg_char() else {
        return Ok(());
    };
    registers::validate(name)?;
    let text = ctx
        .engine
        .registers
        .read()
        .get(name)
        .map(|r| r.text.clone())
        .unwrap_or_default();
    insert_text(ctx.state, &text)
}

fn toggle_replace(ctx: &mut HandlerContext<'_>) -> Result<()> {
    let target = if ctx.state.mode() == Mode::Replace {
        Mode::Insert
    } else {
        Mode::Replace
    };
    ctx.state.enter_mode(target)
}

pub(super) fn register(registry: &mut HandlerRegistry) {
    let n = MapModes::NORMAL;
    registry.register(n, "i", "insert", Handler::command(insert_before));
    registry.register(n, "<Insert>", "insert", Handler::command(insert_before));
    registry.register(n, "a", "append", Handler::command(insert_after));
    registry.register(n, "I", "insert-line-start", Handler::command(insert_line_start));
    registry.register(n, "A", "append-line-end", Handler::command(insert_line_end));
    registry.register(n, "o", "open-below", Handler::command(open_line_below));
    registry.register(n, "O", "open-above", Handler::command(open_line_above));
    registry.register(n, "R", "replace-mode", Handler::command(replace_mode));
    registry.register(n, "gh", "select", Handler::command(select_char));
    registry.register(n, "gH", "select-line", Handler::command(select_line));
    registry.register(n, "g<C-h>", "select-block", Handler::command(select_block));
    registry.register(n, "gv", "reselect", Handler::command(reselect));
    registry.register(n, "gn", "select-next-match", Handler::command(select_next_match));
    registry.register(n, "gN", "select-prev-match", Handler::command(select_prev_match));
    registry.register(n, "x", "delete-char", Handler::command(delete_char));
    registry.register(n, "<Del>", "delete-char", Handler::command(delete_char));
    registry.register(n, "X", "delete-char-before", Handler::command(delete_char_before));
    registry.register(n, "D", "delete-to-end", Handler::command(delete_to_end));
    registry.register(n, "C", "change-to-end", Handler::command(change_to_end));
    registry.register(n, "p", "put", Handler::command(put_after));
    registry.register(n, "P", "put-before", Handler::command(put_before));
    registry.register(n, "m", "set-mark", Handler::command_with_char(set_mark));
    registry.register(n, "r", "replace-char", Handler::command_with_char(replace_char));
    registry.register(n, "<Esc>", "normal", Handler::command(to_normal));

    let nx = MapModes::NORMAL | MapModes::VISUAL;
    registry.register(nx, "v", "visual", Handler::command(visual_char));
    registry.register(nx, "V", "visual-line", Handler::command(visual_line));
    registry.register(nx, "<C-v>", "visual-block", Handler::command(visual_block));
    registry.register(nx, ":", "ex", Handler::command(ex_command));

    let nxo = MapModes::NORMAL | MapModes::VISUAL | MapModes::OP_PENDING;
    registry.register(nxo, "/", "search-forward", Handler::command(search_forward));
    registry.register(nxo, "?", "search-backward", Handler::command(search_backward));

    let x = MapModes::VISUAL;
    registry.register(x, "<Esc>", "normal", Handler::command(to_normal));
    registry.register(x, "o", "swap-selection-end", Handler::command(swap_selection_end));
    registry.register(x, "<C-g>", "visual-select-toggle", Handler::command(switch_visual_select));
    registry.register(x, "p", "put-over-selection", Handler::command(put_over_selection));

    let s = MapModes::SELECT;
    registry.register(s, "<Esc>", "normal", Handler::command(to_normal));
    registry.register(s, "<C-g>", "visual-select-toggle", Handler::command(switch_visual_select));
    registry.register(s, "<BS>", "select-delete", Handler::command(select_delete));
    registry.register(s, "<Del>", "select-delete", Handler::command(select_delete));

    let i = MapModes::INSERT;
    registry.register(i, "<Esc>", "normal", Handler::command(to_normal));
    registry.register(i, "<BS>", "insert-backspace", Handler::command(insert_backspace));
    registry.register(i, "<Del>", "insert-delete", Handler::command(insert_delete));
    registry.register(i, "<CR>", "insert-newline", Handler::command(insert_newline));
    registry.register(i, "<Tab>", "insert-tab", Handler::command(insert_tab));
    registry.register(i, "<Left>", "insert-left", Handler::command(insert_left));
    registry.register(i, "<Right>", "insert-right", Handler::command(insert_right));
    registry.register(i, "<Up>", "insert-up", Handler::command(insert_up));
    registry.register(i, "<Down>", "insert-down", Handler::command(insert_down));
    registry.register(i, "<Home>", "insert-home", Handler::command(insert_home));
    registry.register(i, "<End>", "insert-end", Handler::command(insert_end));
    registry.register(i, "<C-w>", "insert-delete-word", Handler::command(insert_delete_word));
    registry.register(i, "<C-u>", "insert-delete-line", Handler::command(insert_delete_line));
    registry.register(i, "<C-r>", "insert-register", Handler::command_with_char(insert_register));
    registry.register(i, "<Insert>", "insert-replace-toggle", Handler::command(toggle_replace));

    let c = MapModes::CMDLINE;
    registry.register(c, "<Esc>", "cmdline-cancel", Handler::command(cmdline_cancel));
    registry.register(c, "<CR>", "cmdline-execute", Handler::command(cmdline_execute));
    registry.register(c, "<BS>", "cmdline-backspace", Handler::command(cmdline_backspace));
    registry.register(c, "<Del>", "cmdline-delete", Handler::command(cmdline_delete));
    registry.register(c, "<Left>", "cmdline-left", Handler::command(cmdline_left));
    registry.register(c, "<Right>", "cmdline-right", Handler::command(cmdline_right));
    registry.register(c, "<Home>", "cmdline-home", Handler::command(cmdline_home));
    registry.register(c, "<End>", "cmdline-end", Handler::command(cmdline_end));
    registry.register(c, "<C-u>", "cmdline-kill", Handler::command(cmdline_kill));
}
