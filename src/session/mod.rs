//! Engine and sessions
//!
//! [`Engine`] holds everything shared across buffers: options, mappings,
//! global marks, registers, the last search and the handler registry. It
//! is `Send + Sync` and lives behind an `Arc`. A [`Session`] is one buffer
//! being edited: its own mode, caret, local marks, pending command and
//! selection debouncer, driven one key at a time by the host.

use crate::buffer::{BufferMut, BufferView, TextBuffer, TextRange};
use crate::constants::errors::UNKNOWN_HANDLER;
use crate::dispatcher::{Dispatcher, Outcome};
use crate::error::{EngineError, ErrorType, MessageLog, Result};
use crate::handlers::{Handler, HandlerRegistry};
use crate::key::{parse_keys_with_leader, Key, KeyEvent};
use crate::keymap::{MapFlags, MapModes, MappingEntry, MappingTable, MappingTarget, Owner};
use crate::marks::SharedMarks;
use crate::mode::{Mode, SelectionDebouncer, VisualSubMode};
use crate::options::{
    default_registry, guicursor, CursorAttributes, CursorMode, OptionRegistry, OptionScope,
};
use crate::registers::Registers;
use crate::search::{SearchEngine, SearchOptions};
use crate::state::{CommandLine, EditorState};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Process-wide engine state
pub struct Engine {
    pub options: OptionRegistry,
    pub keymap: RwLock<MappingTable>,
    pub marks: SharedMarks,
    pub search: SearchEngine,
    pub registers: RwLock<Registers>,
    pub handlers: RwLock<HandlerRegistry>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("handlers", &*self.handlers.read())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with default options and the built-in handlers
    pub fn new() -> Self {
        Self {
            options: default_registry(),
            keymap: RwLock::new(MappingTable::new()),
            marks: SharedMarks::default(),
            search: SearchEngine::new(),
            registers: RwLock::new(Registers::new()),
            handlers: RwLock::new(HandlerRegistry::builtin()),
        }
    }

    /// Return every shared table to its initial state
    pub fn reset(&self) {
        self.options.reset_all();
        *self.keymap.write() = MappingTable::new();
        self.marks.write().clear();
        self.search.reset();
        self.registers.write().clear();
        *self.handlers.write() = HandlerRegistry::builtin();
    }

    /// Current `mapleader`
    pub fn leader(&self) -> String {
        self.options
            .get_string(OptionScope::Global, "mapleader")
            .unwrap_or_else(|_| "\\".to_string())
    }

    /// Define a mapping from key notation. `<Leader>` expands to the current
    /// leader, `<Nop>` keys are dropped and `<Action>(name)` targets a named
    /// handler.
    pub fn map(
        &self,
        modes: MapModes,
        lhs: &str,
        rhs: &str,
        owner: Owner,
        flags: MapFlags,
    ) -> Result<Arc<MappingEntry>> {
        let leader = self.leader();
        let from = parse_keys_with_leader(lhs, &leader);
        let target = match action_name(rhs) {
            Some(name) => {
                if self.handlers.read().by_name(name).is_none() {
                    return Err(EngineError::new(
                        ErrorType::Mapping,
                        UNKNOWN_HANDLER,
                        format!("Unknown handler: {name}"),
                    ));
                }
                MappingTarget::Handler(name.to_string())
            }
            None => MappingTarget::Keys(
                parse_keys_with_leader(rhs, &leader)
                    .into_iter()
                    .filter(|k| k.key != Key::Nop)
                    .collect(),
            ),
        };
        self.keymap.write().define(modes, from, target, owner, flags)
    }

    /// Remove `lhs` in `modes`, whoever defined it
    pub fn unmap(&self, modes: MapModes, lhs: &str) -> Result<()> {
        let from = parse_keys_with_leader(lhs, &self.leader());
        self.keymap.write().unmap_any(modes, &from)
    }

    /// Drop every mapping defined by `owner`
    pub fn remove_owner(&self, owner: &Owner) -> usize {
        self.keymap.write().remove(owner, None, None)
    }

    /// Search options as seen from `scope`
    pub fn search_options(&self, scope: OptionScope) -> SearchOptions {
        SearchOptions {
            ignorecase: self.options.flag(scope, "ignorecase"),
            smartcase: self.options.flag(scope, "smartcase"),
            wrapscan: self.options.flag(scope, "wrapscan"),
        }
    }

    /// Add a handler reachable from `<Action>(name)` mapping targets, and
    /// from `trigger` in `modes` when a trigger is given
    pub fn register_handler(
        &self,
        name: &str,
        modes: MapModes,
        trigger: Option<&str>,
        handler: Handler,
    ) {
        let mut handlers = self.handlers.write();
        match trigger {
            Some(trigger) => {
                handlers.register(modes, trigger, name, handler.clone());
                handlers.register_named(name, handler);
            }
            None => {
                handlers.register_named(name, handler);
            }
        }
    }
}

/// `<Action>(name)` in any case
fn action_name(rhs: &str) -> Option<&str> {
    const PREFIX: &str = "<action>(";
    let head = rhs.get(..PREFIX.len())?;
    if !head.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    rhs[PREFIX.len()..].strip_suffix(')')
}

/// One buffer being edited
pub struct Session {
    engine: Arc<Engine>,
    state: EditorState,
    dispatcher: Dispatcher,
    debouncer: SelectionDebouncer,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("dispatcher", &self.dispatcher)
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(engine: Arc<Engine>, buffer: Box<dyn BufferMut + Send>) -> Self {
        let state = EditorState::new(buffer, Arc::clone(&engine.marks));
        tracing::debug!(buffer = %state.buffer_id(), "open session");
        Self {
            engine,
            state,
            dispatcher: Dispatcher::new(),
            debouncer: SelectionDebouncer::new(),
        }
    }

    /// Session over an in-memory [`TextBuffer`]
    pub fn with_text(engine: Arc<Engine>, text: &str) -> Self {
        Self::new(engine, Box::new(TextBuffer::new(text)))
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    /// Handle one key typed now
    pub fn handle(&mut self, event: KeyEvent) -> Outcome {
        self.handle_at(event, Instant::now())
    }

    /// Handle one key typed at `now`. Expired mapping waits and settled
    /// selections are applied first. An error from that work is returned
    /// unless the key itself fails or passes through. A key that leaves
    /// Visual or Select drops any host selection change still settling.
    pub fn handle_at(&mut self, event: KeyEvent, now: Instant) -> Outcome {
        let due = self.tick(now);
        if let Outcome::Error(message) = &due {
            tracing::warn!(%message, "held keys failed before key");
        }
        let had_selection = self.state.mode().has_active_selection();
        let outcome = self
            .dispatcher
            .handle(&mut self.state, &self.engine, event, now);
        // A host change still settling would select again after the key left
        if had_selection && !self.state.mode().has_active_selection() && self.debouncer.is_pending() {
            tracing::debug!("dropping unsettled host selection");
            self.debouncer.cancel();
        }
        match (due, outcome) {
            (Outcome::Error(message), Outcome::Consumed) => Outcome::Error(message),
            (_, outcome) => outcome,
        }
    }

    /// Apply whatever is due at `now`: a settled host selection and an
    /// expired mapping wait
    pub fn tick(&mut self, now: Instant) -> Outcome {
        if let Some(selection) = self.debouncer.poll(now) {
            self.apply_selection(selection);
        }
        self.dispatcher.tick(&mut self.state, &self.engine, now)
    }

    /// Resolve held mapping keys as if the timeout had already expired
    pub fn commit_pending(&mut self) -> Outcome {
        self.dispatcher
            .commit_held(&mut self.state, &self.engine, Instant::now())
    }

    /// The host changed its native selection. An empty range means the
    /// selection was removed. The change applies after `selectiondelay`.
    pub fn on_selection_changed(&mut self, selection: TextRange, now: Instant) {
        let delay = self
            .engine
            .options
            .number(self.scope(), "selectiondelay")
            .max(0);
        self.debouncer
            .notify(selection, now, Duration::from_millis(delay as u64));
    }

    /// Earliest instant at which [`Session::tick`] has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.dispatcher.deadline(), self.debouncer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn apply_selection(&mut self, selection: TextRange) {
        let mode = self.state.mode();
        if mode == Mode::CommandLine {
            return;
        }
        if selection.is_empty() {
            if !mode.has_active_selection() {
                return;
            }
            self.state.demote();
            self.state.set_caret(selection.start);
            tracing::debug!(mode = %self.state.mode(), "host selection removed");
            return;
        }

        if !mode.has_active_selection() {
            let promoted = if self.engine.options.list_contains(self.scope(), "selectmode", "mouse") {
                Mode::Select(VisualSubMode::Character)
            } else {
                Mode::Visual(VisualSubMode::Character)
            };
            if let Err(err) = self.state.promote(promoted) {
                self.state.report(&err);
                return;
            }
            self.dispatcher.reset();
        }
        let exclusive = self.exclusive_selection();
        let caret = if exclusive {
            selection.end
        } else {
            selection.end.saturating_sub(1).max(selection.start)
        };
        self.state.set_visual_anchor(selection.start);
        self.state.set_caret(caret);
        tracing::debug!(mode = %self.state.mode(), start = selection.start, end = selection.end, "host selection applied");
    }

    fn scope(&self) -> OptionScope {
        OptionScope::Local(self.state.buffer_id())
    }

    fn exclusive_selection(&self) -> bool {
        self.engine
            .options
            .get_string(self.scope(), "selection")
            .is_ok_and(|s| s == "exclusive")
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn caret(&self) -> usize {
        self.state.caret()
    }

    /// Current selection in buffer offsets, end exclusive
    pub fn selection(&self) -> Option<TextRange> {
        self.state
            .selection_range(self.exclusive_selection())
            .map(|r| r.span())
    }

    pub fn text(&self) -> String {
        let buffer = self.state.buffer();
        buffer.slice(TextRange::new(0, buffer.len()))
    }

    /// Cursor shape for the current mode according to `guicursor`
    pub fn cursor_attributes(&self) -> CursorAttributes {
        let op_pending = self.dispatcher.pending().operator.is_some();
        let mode = CursorMode::for_mode(self.mode(), op_pending, self.exclusive_selection());
        let entries = self
            .engine
            .options
            .get_list(OptionScope::Global, "guicursor")
            .ok()
            .and_then(|items| guicursor::parse_items(&items).ok())
            .or_else(|| guicursor::parse(guicursor::DEFAULT).ok())
            .unwrap_or_default();
        guicursor::effective(&entries, mode)
    }

    pub fn messages(&self) -> &MessageLog {
        self.state.messages()
    }

    pub fn messages_mut(&mut self) -> &mut MessageLog {
        self.state.messages_mut()
    }

    /// Run an ex command line. Errors are also written to the message log.
    pub fn execute_ex(&mut self, line: &str) -> Result<()> {
        let result = crate::ex::execute(&self.engine, &mut self.state, line);
        if let Err(err) = &result {
            self.state.report(err);
        }
        result
    }

    /// Partial command and held mapping keys, for a `showcmd` area
    pub fn pending_keys(&self) -> String {
        self.dispatcher.pending_keys()
    }

    pub fn command_line(&self) -> Option<&CommandLine> {
        self.state.command_line.as_ref()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.engine.options.drop_buffer(self.state.buffer_id());
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
