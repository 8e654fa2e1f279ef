//! Key dispatcher
//!
//! ## dispatcher/ Invariants
//!
//! - Keys are processed one at a time; a handler runs to completion before
//!   the next key is looked at.
//! - Mapping resolution happens before the command grammar. Keys produced
//!   by a non-recursive mapping are never remapped.
//! - A key waiting on an ambiguous mapping prefix is held until the next
//!   key arrives or the deadline passes; the wait never blocks.
//! - Any error clears the pending command and the typeahead.
//! - Escape with a partial command discards it without touching the buffer.

pub mod pending;

pub use pending::{combine_counts, PendingCommand};

use crate::constants::errors::{RECURSIVE_MAPPING, UNKNOWN_COMMAND, UNKNOWN_HANDLER};
use crate::error::{EngineError, ErrorType, Result};
use crate::handlers::commands::{insert_text, select_replace};
use crate::handlers::operators::{lines_range, motion_range};
use crate::handlers::{
    Argument, Binding, Handler, HandlerContext, Lookup, PendingOperator,
};
use crate::key::{format_keys, Key, KeyEvent};
use crate::keymap::{MapModes, MappingEntry, MappingTarget, Resolution};
use crate::mode::Mode;
use crate::options::OptionScope;
use crate::registers;
use crate::session::Engine;
use crate::state::{EditorState, OperatorRange};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of handling one key, reported to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The engine used the key (or is holding it for a longer command)
    Consumed,
    /// The key produced an error; the message is also in the message log
    Error(String),
    /// The engine has no use for the key; the host may handle it
    PassThrough,
}

/// A key waiting to be dispatched
#[derive(Debug, Clone, Copy)]
struct Typed {
    event: KeyEvent,
    /// Whether mappings may still apply to this key
    remap: bool,
    /// Mapping expansions that produced this key
    depth: usize,
}

impl Typed {
    fn user(event: KeyEvent) -> Self {
        Self {
            event,
            remap: true,
            depth: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    typeahead: VecDeque<Typed>,
    /// Keys matching the prefix of a longer mapping
    held: Vec<Typed>,
    deadline: Option<Instant>,
    pending: PendingCommand,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &PendingCommand {
        &self.pending
    }

    /// Keys held for a mapping plus the partial command, for display
    pub fn pending_keys(&self) -> String {
        let held: Vec<KeyEvent> = self.held.iter().map(|t| t.event).collect();
        format!("{}{}", self.pending.display(), format_keys(&held))
    }

    /// When the held mapping prefix times out
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Forget all typeahead and partial input
    pub fn reset(&mut self) {
        self.typeahead.clear();
        self.held.clear();
        self.deadline = None;
        self.pending.clear();
    }

    /// Dispatch one key typed by the user at `now`
    pub fn handle(
        &mut self,
        state: &mut EditorState,
        engine: &Engine,
        event: KeyEvent,
        now: Instant,
    ) -> Outcome {
        tracing::debug!(key = %event, mode = %state.mode(), "key");
        self.typeahead.push_back(Typed::user(event));
        self.drain(state, engine, now)
    }

    /// Resolve a held mapping prefix whose deadline has passed
    pub fn tick(&mut self, state: &mut EditorState, engine: &Engine, now: Instant) -> Outcome {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                tracing::trace!("mapping timeout");
                self.commit_held(state, engine, now)
            }
            _ => Outcome::Consumed,
        }
    }

    /// Resolve held keys as if the timeout had expired
    pub fn commit_held(&mut self, state: &mut EditorState, engine: &Engine, now: Instant) -> Outcome {
        self.deadline = None;
        if self.held.is_empty() {
            return Outcome::Consumed;
        }
        let held = std::mem::take(&mut self.held);
        let keys: Vec<KeyEvent> = held.iter().map(|t| t.event).collect();
        let mode = self.map_mode(state);

        let resolution = engine.keymap.read().resolve(mode, &keys);
        let result = match resolution {
            Resolution::Prefix { exact: Some(entry) } | Resolution::Exact(entry) => {
                self.expand(state, engine, &entry, &held)
            }
            _ => {
                let prefix = engine.keymap.read().longest_exact_prefix(mode, &keys);
                match prefix {
                    Some((len, entry)) => {
                        self.requeue(&held[len..]);
                        self.expand(state, engine, &entry, &held[..len])
                    }
                    None => {
                        self.requeue(&held[1..]);
                        self.typeahead.push_front(Typed {
                            remap: false,
                            ..held[0]
                        });
                        Ok(())
                    }
                }
            }
        };
        if let Err(err) = result {
            return self.fail(state, err);
        }
        self.drain(state, engine, now)
    }

    fn map_mode(&self, state: &EditorState) -> MapModes {
        MapModes::for_mode(state.mode(), self.pending.operator.is_some())
    }

    fn requeue(&mut self, keys: &[Typed]) {
        for typed in keys.iter().rev() {
            self.typeahead.push_front(*typed);
        }
    }

    fn drain(&mut self, state: &mut EditorState, engine: &Engine, now: Instant) -> Outcome {
        let mut outcome = Outcome::Consumed;
        while let Some(typed) = self.typeahead.pop_front() {
            let mappable = typed.remap && !self.pending.awaits_literal();
            let step = if mappable {
                self.map_step(state, engine, typed, now)
            } else if !self.held.is_empty() {
                // A key that can't continue a mapping ends the wait
                self.typeahead.push_front(typed);
                return match self.commit_held(state, engine, now) {
                    Outcome::Consumed => outcome,
                    other => other,
                };
            } else {
                self.raw(state, engine, typed.event)
            };
            match step {
                Ok(Outcome::Consumed) => outcome = Outcome::Consumed,
                Ok(other) => outcome = other,
                Err(err) => return self.fail(state, err),
            }
        }
        outcome
    }

    /// Mapping resolution for one key
    fn map_step(
        &mut self,
        state: &mut EditorState,
        engine: &Engine,
        typed: Typed,
        now: Instant,
    ) -> Result<Outcome> {
        self.held.push(typed);
        let keys: Vec<KeyEvent> = self.held.iter().map(|t| t.event).collect();
        let mode = self.map_mode(state);
        let resolution = engine.keymap.read().resolve(mode, &keys);

        match resolution {
            Resolution::Exact(entry) => {
                let held = std::mem::take(&mut self.held);
                self.deadline = None;
                self.expand(state, engine, &entry, &held)?;
                Ok(Outcome::Consumed)
            }
            Resolution::Prefix { .. } => {
                let scope = OptionScope::Local(state.buffer_id());
                self.deadline = if engine.options.flag(scope, "timeout") {
                    let ms = engine.options.number(scope, "timeoutlen").max(0) as u64;
                    Some(now + Duration::from_millis(ms))
                } else {
                    None
                };
                tracing::trace!(keys = %format_keys(&keys), "waiting for mapping");
                Ok(Outcome::Consumed)
            }
            Resolution::NoMatch => {
                self.deadline = None;
                let held = std::mem::take(&mut self.held);
                if held.len() == 1 {
                    return self.raw(state, engine, held[0].event);
                }
                // Held keys diverged from every longer mapping
                let prefix = engine.keymap.read().longest_exact_prefix(mode, &keys);
                match prefix {
                    Some((len, entry)) => {
                        self.requeue(&held[len..]);
                        self.expand(state, engine, &entry, &held[..len])?;
                    }
                    None => {
                        self.requeue(&held[1..]);
                        self.typeahead.push_front(Typed {
                            remap: false,
                            ..held[0]
                        });
                    }
                }
                Ok(Outcome::Consumed)
            }
        }
    }

    /// Replace `consumed` keys by the mapping's target
    fn expand(
        &mut self,
        state: &mut EditorState,
        engine: &Engine,
        entry: &MappingEntry,
        consumed: &[Typed],
    ) -> Result<()> {
        let depth = consumed.iter().map(|t| t.depth).max().unwrap_or(0) + 1;
        let limit = engine.options.number(OptionScope::Global, "maxmapdepth").max(1) as usize;
        if depth > limit {
            return Err(EngineError::new(
                ErrorType::Mapping,
                RECURSIVE_MAPPING,
                "Recursive mapping",
            ));
        }
        tracing::debug!(from = %format_keys(&entry.from), to = %entry.target, depth, "expand mapping");
        match &entry.target {
            MappingTarget::Keys(keys) => {
                // The lhs at the start of a recursive rhs is not mapped again
                let guarded = if entry.recursive && keys.starts_with(&entry.from) {
                    entry.from.len()
                } else {
                    0
                };
                for (i, key) in keys.iter().enumerate().rev() {
                    self.typeahead.push_front(Typed {
                        event: *key,
                        remap: entry.recursive && i >= guarded,
                        depth,
                    });
                }
                Ok(())
            }
            MappingTarget::Handler(name) => {
                let binding = engine.handlers.read().by_name(name).ok_or_else(|| {
                    EngineError::new(
                        ErrorType::Mapping,
                        UNKNOWN_HANDLER,
                        format!("Unknown handler: {name}"),
                    )
                })?;
                if binding.handler.argument() == Argument::Char {
                    self.pending.awaiting_arg = Some(binding);
                } else {
                    self.run(state, engine, &binding, None)?;
                }
                Ok(())
            }
        }
    }

    fn fail(&mut self, state: &mut EditorState, err: EngineError) -> Outcome {
        tracing::warn!(code = %err.code, message = %err.message, "command failed");
        self.reset();
        state.report(&err);
        Outcome::Error(err.status_line())
    }

    /// Drop the partial command and return to NORMAL
    fn cancel(&mut self, state: &mut EditorState) {
        tracing::debug!(pending = %self.pending.display(), "cancel");
        self.pending.clear();
        if state.mode() == Mode::CommandLine {
            state.command_line = None;
        }
        if state.mode() != Mode::Normal && state.enter_mode(Mode::Normal).is_err() {
            state.reset_mode();
        }
    }

    /// Command grammar for one key after mapping
    fn raw(&mut self, state: &mut EditorState, engine: &Engine, event: KeyEvent) -> Result<Outcome> {
        let event = if event.is_escape() {
            KeyEvent::plain(Key::Escape)
        } else {
            event
        };
        let escape = event.key == Key::Escape;
        self.pending.typed.push(event);

        if self.pending.awaiting_register {
            self.pending.awaiting_register = false;
            if escape {
                self.cancel(state);
                return Ok(Outcome::Consumed);
            }
            let name = event.as_char().ok_or_else(|| invalid_register(&event))?;
            self.pending.register = Some(registers::validate(name)?);
            return Ok(Outcome::Consumed);
        }

        if let Some(binding) = self.pending.awaiting_arg.take() {
            if escape {
                self.cancel(state);
                return Ok(Outcome::Consumed);
            }
            return self.run(state, engine, &binding, Some(event));
        }

        if escape && !self.pending.is_empty() {
            self.cancel(state);
            return Ok(Outcome::Consumed);
        }

        let mode = state.mode();
        if self.pending.keys.is_empty() {
            if let (Mode::Select(_), Some(c)) = (mode, event.as_char()) {
                let mut ctx = HandlerContext::new(state, engine);
                select_replace(&mut ctx, c)?;
                self.pending.clear();
                return Ok(Outcome::Consumed);
            }
            if !mode.accepts_literal_text() {
                match event.as_char() {
                    Some(c @ '0'..='9') if c != '0' || self.pending.count.is_some() => {
                        self.pending.push_digit(c.to_digit(10).unwrap_or(0));
                        return Ok(Outcome::Consumed);
                    }
                    Some('"') => {
                        self.pending.awaiting_register = true;
                        return Ok(Outcome::Consumed);
                    }
                    _ => {}
                }
            }
        }

        self.pending.keys.push(event);
        let map_mode = self.map_mode(state);
        let lookup = engine.handlers.read().lookup(map_mode, &self.pending.keys);
        match lookup {
            Lookup::Prefix => Ok(Outcome::Consumed),
            Lookup::Found(binding) => {
                self.pending.keys.clear();
                if binding.handler.argument() == Argument::Char {
                    self.pending.awaiting_arg = Some(binding);
                    return Ok(Outcome::Consumed);
                }
                self.run(state, engine, &binding, None)
            }
            Lookup::None => self.unbound(state, engine, event),
        }
    }

    /// Keys that match no handler
    fn unbound(&mut self, state: &mut EditorState, engine: &Engine, event: KeyEvent) -> Result<Outcome> {
        let keys = std::mem::take(&mut self.pending.keys);

        if let Some(op) = &self.pending.operator {
            let trigger = &op.trigger;
            let doubled = keys == *trigger
                || (trigger.len() > 1 && keys.as_slice() == &trigger[trigger.len() - 1..]);
            if doubled {
                return self.apply_lines(state, engine);
            }
        }

        let mode = state.mode();
        if mode.accepts_literal_text() {
            let literal: Option<String> = keys.iter().map(KeyEvent::literal).collect();
            self.pending.clear();
            return match literal {
                Some(text) => {
                    if mode == Mode::CommandLine {
                        if let Some(line) = state.command_line.as_mut() {
                            line.insert_str(&text);
                        }
                    } else {
                        insert_text(state, &text)?;
                    }
                    Ok(Outcome::Consumed)
                }
                None => Ok(Outcome::PassThrough),
            };
        }

        if keys.len() == 1 && event.literal().is_none() && self.pending.is_empty() {
            self.pending.clear();
            return Ok(Outcome::PassThrough);
        }
        self.pending.clear();
        Err(EngineError::input(
            UNKNOWN_COMMAND,
            format!("Unknown command: {}", format_keys(&keys)),
        ))
    }

    /// `dd`, `3yy`, `gUU`: operator on whole lines
    fn apply_lines(&mut self, state: &mut EditorState, engine: &Engine) -> Result<Outcome> {
        let count = self.pending.count.take();
        let Some(op) = self.pending.operator.take() else {
            return Ok(Outcome::Consumed);
        };
        self.pending.clear();
        let lines = combine_counts(op.count, count).unwrap_or(1);
        let range = lines_range(state, lines);
        let mut ctx = HandlerContext::new(state, engine);
        ctx.register = op.register;
        op.handler.apply(&mut ctx, range)?;
        ctx.state.preferred_column = None;
        Ok(Outcome::Consumed)
    }

    /// Run a handler with everything gathered for it
    fn run(
        &mut self,
        state: &mut EditorState,
        engine: &Engine,
        binding: &Binding,
        arg: Option<KeyEvent>,
    ) -> Result<Outcome> {
        let count = self.pending.count.take();
        let register = self.pending.register.take();
        let operator = self.pending.operator.take();
        let typed = std::mem::take(&mut self.pending.typed);
        self.pending.clear();
        tracing::trace!(handler = %binding.name, ?count, ?register, "run handler");

        let mode = state.mode();
        let mut ctx = HandlerContext::new(state, engine);
        ctx.count = count;
        ctx.register = register;
        ctx.arg = arg;
        let mut keep_column = false;

        match &binding.handler {
            Handler::Motion(motion) => {
                if let Some(op) = &operator {
                    ctx.count = combine_counts(op.count, count);
                }
                ctx.operator = operator;
                let target = motion.target(&mut ctx)?;
                let Some(target) = target else {
                    return Ok(Outcome::Consumed);
                };
                match ctx.operator.take() {
                    Some(op) => {
                        let range = motion_range(ctx.state, target);
                        ctx.register = op.register;
                        ctx.count = None;
                        op.handler.apply(&mut ctx, range)?;
                    }
                    None => {
                        if motion.is_jump() {
                            ctx.state.mark_jump();
                        }
                        ctx.state.set_caret(target.offset);
                        keep_column = target.keep_column;
                    }
                }
            }
            Handler::TextObject(object) => {
                if let Some(op) = &operator {
                    ctx.count = combine_counts(op.count, count);
                }
                ctx.operator = operator;
                let Some(selected) = object.select(&mut ctx)? else {
                    return Ok(Outcome::Consumed);
                };
                match ctx.operator.take() {
                    Some(op) => {
                        let range = if selected.linewise {
                            let buffer = ctx.state.buffer();
                            let first = buffer.line_of_offset(selected.range.start);
                            let last = buffer.line_of_offset(
                                selected.range.end.saturating_sub(1).max(selected.range.start),
                            );
                            OperatorRange::linewise(ctx.state.line_span(first, last))
                        } else {
                            OperatorRange::charwise(selected.range)
                        };
                        ctx.register = op.register;
                        ctx.count = None;
                        op.handler.apply(&mut ctx, range)?;
                    }
                    None if mode.has_active_selection() => {
                        let adjustment = if ctx.exclusive_selection() { 0 } else { 1 };
                        let range = selected.range;
                        ctx.state.set_visual_anchor(range.start);
                        ctx.state
                            .set_caret(range.end.saturating_sub(adjustment).max(range.start));
                    }
                    None => {}
                }
            }
            Handler::Operator(handler) => {
                if mode.has_active_selection() {
                    let exclusive = ctx.exclusive_selection();
                    if let Some(range) = ctx.state.selection_range(exclusive) {
                        ctx.state.enter_mode(Mode::Normal)?;
                        handler.apply(&mut ctx, range)?;
                    }
                } else {
                    self.pending.operator = Some(PendingOperator {
                        name: binding.name.clone(),
                        trigger: binding.trigger.clone(),
                        handler: Arc::clone(handler),
                        count,
                        register,
                    });
                    self.pending.typed = typed;
                    return Ok(Outcome::Consumed);
                }
            }
            Handler::Command(command) => {
                ctx.operator = operator;
                command.execute(&mut ctx)?;
            }
        }
        if !keep_column {
            ctx.state.preferred_column = None;
        }
        Ok(Outcome::Consumed)
    }
}

fn invalid_register(event: &KeyEvent) -> EngineError {
    EngineError::input(
        crate::constants::errors::INVALID_REGISTER,
        format!("Invalid register name: {event}"),
    )
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
