//! Ex commands
//!
//! Parses and runs `:` command lines: the `:set` family, mapping commands,
//! mark commands and bare line ranges. Scripts run the same commands
//! without a session, in which case buffer-bound commands fail.

pub mod parser;
pub mod range;
pub mod registry;

use self::parser::{ExLine, ParsedCommand, SetScope};
use self::range::LineRange;
use crate::buffer::{BufferView, Position};
use crate::constants::errors::{
    ARGUMENT_REQUIRED, INVALID_ARGUMENT, INVALID_VALUE, MAPPING_EXISTS, NOT_EDITOR_COMMAND,
    NO_RANGE_ALLOWED, TRAILING_CHARACTERS,
};
use crate::error::{EngineError, ErrorType, Result};
use crate::handlers::motions::first_non_blank;
use crate::key::{format_keys, parse_keys_with_leader};
use crate::keymap::{MapFlags, MapModes, MappingEntry, MappingTarget, Owner};
use crate::options::{Locality, OptionScope, OptionType, OptionValue};
use crate::session::Engine;
use crate::state::EditorState;
use std::sync::Arc;

/// Execution environment of one command line
pub struct ExContext<'a> {
    pub engine: &'a Engine,
    /// Absent while running init scripts
    pub state: Option<&'a mut EditorState>,
    /// Owner recorded on mappings defined by this context
    pub owner: Owner,
    /// Lines produced by listing commands
    pub output: Vec<String>,
}

/// Run a command line typed in a session
pub fn execute(engine: &Engine, state: &mut EditorState, line: &str) -> Result<()> {
    let mut ctx = ExContext::new(engine, Some(&mut *state), Owner::User);
    let result = ctx.run(line);
    let output = std::mem::take(&mut ctx.output);
    drop(ctx);
    for text in output {
        state.messages_mut().info(text);
    }
    result
}

impl<'a> ExContext<'a> {
    pub fn new(engine: &'a Engine, state: Option<&'a mut EditorState>, owner: Owner) -> Self {
        Self {
            engine,
            state,
            owner,
            output: Vec::new(),
        }
    }

    /// Parse and run one command line
    pub fn run(&mut self, line: &str) -> Result<()> {
        let trimmed = line.trim_start_matches([':', ' ', '\t']);
        if trimmed.is_empty() || trimmed.starts_with('"') {
            return Ok(());
        }
        let parsed = parser::parse(trimmed, self.state.as_deref())?;
        tracing::debug!(line = trimmed, command = ?parsed.command, "ex command");
        self.dispatch(parsed, trimmed)
    }

    fn dispatch(&mut self, line: ExLine, text: &str) -> Result<()> {
        let ExLine { range, command } = line;
        if range.is_some() && !matches!(command, ParsedCommand::Goto | ParsedCommand::Mark { .. }) {
            return Err(EngineError::new(
                ErrorType::Parse,
                NO_RANGE_ALLOWED,
                "No range allowed",
            ));
        }
        match command {
            ParsedCommand::Goto => match range {
                Some(range) => self.goto_line(range),
                None => Ok(()),
            },
            ParsedCommand::Set { scope, args } => self.set(scope, &args),
            ParsedCommand::Map {
                modes,
                recursive,
                args,
            } => self.map(modes, recursive, &args),
            ParsedCommand::Unmap { modes, args } => self.unmap(modes, &args),
            ParsedCommand::MapClear { modes } => {
                self.engine.keymap.write().clear(modes);
                Ok(())
            }
            ParsedCommand::Mark { args } => self.mark(range, &args),
            ParsedCommand::DelMarks { args, bang } => self.delmarks(&args, bang),
            ParsedCommand::Marks { args } => self.marks(&args),
            ParsedCommand::NoHlSearch => {
                self.engine.search.clear_highlight();
                Ok(())
            }
            ParsedCommand::Unknown { .. } | ParsedCommand::Ambiguous { .. } => {
                Err(not_editor_command(text))
            }
        }
    }

    fn state_mut(&mut self) -> Result<&mut EditorState> {
        self.state.as_deref_mut().ok_or_else(|| {
            EngineError::new(
                ErrorType::Script,
                INVALID_ARGUMENT,
                "Invalid argument: command needs a buffer",
            )
        })
    }

    fn goto_line(&mut self, range: LineRange) -> Result<()> {
        let state = self.state_mut()?;
        state.mark_jump();
        let target = first_non_blank(state.buffer(), range.end);
        state.set_caret(target);
        Ok(())
    }

    // :set

    fn set(&mut self, scope: SetScope, args: &str) -> Result<()> {
        let args = split_args(args);
        if args.is_empty() {
            let changed = self.engine.options.changed(self.read_scope(scope));
            self.output.push("--- Options ---".to_string());
            for (name, value) in changed {
                self.output.push(show_option(name, &value));
            }
            return Ok(());
        }
        for arg in args {
            self.set_one(scope, &arg)?;
        }
        Ok(())
    }

    fn read_scope(&self, scope: SetScope) -> OptionScope {
        match (scope, self.state.as_deref()) {
            (SetScope::Global, _) | (_, None) => OptionScope::Global,
            (_, Some(state)) => OptionScope::Local(state.buffer_id()),
        }
    }

    /// Scopes written by an assignment, in order
    fn write_scopes(&self, scope: SetScope, name: &str) -> Result<Vec<OptionScope>> {
        let local = self.engine.options.descriptor(name)?.locality == Locality::Buffer;
        let buffer = self.state.as_deref().map(EditorState::buffer_id);
        Ok(match (scope, buffer) {
            (SetScope::Both, Some(buffer)) if local => {
                vec![OptionScope::Local(buffer), OptionScope::Global]
            }
            (SetScope::Local, Some(buffer)) => vec![OptionScope::Local(buffer)],
            _ => vec![OptionScope::Global],
        })
    }

    fn set_one(&mut self, scope: SetScope, arg: &str) -> Result<()> {
        let engine = self.engine;
        let options = &engine.options;
        match arg {
            "all" => {
                let read = self.read_scope(scope);
                self.output.push("--- Options ---".to_string());
                for desc in options.descriptors() {
                    if let Ok(value) = options.get(read, desc.name) {
                        self.output.push(show_option(desc.name, &value));
                    }
                }
                return Ok(());
            }
            "all&" => {
                options.reset_all();
                return Ok(());
            }
            _ => {}
        }

        if let Some(pos) = arg.find(['=', ':']) {
            let (lhs, value) = (&arg[..pos], &arg[pos + 1..]);
            let (name, op) = match lhs.chars().last() {
                Some(c @ ('+' | '-' | '^')) => (&lhs[..lhs.len() - 1], Some(c)),
                _ => (lhs, None),
            };
            for scope in self.write_scopes(scope, name)? {
                match op {
                    Some('+') => options.append(scope, name, value)?,
                    Some('-') => options.remove(scope, name, value)?,
                    Some('^') => options.prepend(scope, name, value)?,
                    _ => options.set_from_str(scope, name, value)?,
                }
            }
            return Ok(());
        }

        if let Some(name) = arg.strip_suffix('?') {
            let value = options.get(self.read_scope(scope), name)?;
            let canonical = options.resolve_name(name)?;
            self.output.push(show_option(canonical, &value));
            return Ok(());
        }
        if let Some(name) = arg.strip_suffix('&') {
            for scope in self.write_scopes(scope, name)? {
                options.reset(scope, name)?;
            }
            return Ok(());
        }
        if let Some(name) = arg.strip_suffix('!') {
            return self.toggle(scope, name);
        }
        if options.resolve_name(arg).is_err() {
            if let Some(name) = arg.strip_prefix("inv") {
                return self.toggle(scope, name);
            }
            if let Some(name) = arg.strip_prefix("no") {
                return self.assign_bool(scope, name, false, arg);
            }
        }

        let desc = options.descriptor(arg)?;
        if matches!(desc.ty, OptionType::Boolean) {
            self.assign_bool(scope, arg, true, arg)
        } else {
            let value = options.get(self.read_scope(scope), arg)?;
            self.output.push(show_option(desc.name, &value));
            Ok(())
        }
    }

    fn assign_bool(&self, scope: SetScope, name: &str, value: bool, arg: &str) -> Result<()> {
        let engine = self.engine;
        let options = &engine.options;
        if !matches!(options.descriptor(name)?.ty, OptionType::Boolean) {
            return Err(EngineError::new(
                ErrorType::Options,
                INVALID_ARGUMENT,
                format!("Invalid argument: {arg}"),
            ));
        }
        for scope in self.write_scopes(scope, name)? {
            options.set(scope, name, OptionValue::Bool(value))?;
        }
        Ok(())
    }

    fn toggle(&self, scope: SetScope, name: &str) -> Result<()> {
        let engine = self.engine;
        let options = &engine.options;
        let value = !options.get_bool(self.read_scope(scope), name)?;
        for scope in self.write_scopes(scope, name)? {
            options.set(scope, name, OptionValue::Bool(value))?;
        }
        Ok(())
    }

    // :map family

    fn map(&mut self, modes: MapModes, recursive: bool, args: &str) -> Result<()> {
        let (special, rest) = map_arguments(args);
        let (lhs, rhs) = match rest.split_once([' ', '\t']) {
            Some((lhs, rhs)) => (lhs, rhs.trim_start()),
            None => (rest, ""),
        };
        if lhs.is_empty() {
            self.list_mappings(modes, None);
            return Ok(());
        }
        if rhs.is_empty() {
            self.list_mappings(modes, Some(lhs));
            return Ok(());
        }

        if special.unique {
            let from = parse_keys_with_leader(lhs, &self.engine.leader());
            let exists = self
                .engine
                .keymap
                .read()
                .entries(modes)
                .iter()
                .any(|e| e.from == from);
            if exists {
                return Err(EngineError::new(
                    ErrorType::Mapping,
                    MAPPING_EXISTS,
                    format!("Mapping already exists for {lhs}"),
                ));
            }
        }

        let mut flags = if recursive {
            MapFlags::RECURSIVE
        } else {
            MapFlags::NOREMAP
        };
        if special.nowait {
            flags = flags.nowait();
        }
        self.engine
            .map(modes, lhs, rhs, self.owner.clone(), flags)
            .map(|_| ())
    }

    fn unmap(&mut self, modes: MapModes, args: &str) -> Result<()> {
        let (_, lhs) = map_arguments(args.trim_end());
        if lhs.is_empty() {
            return Err(EngineError::new(
                ErrorType::Parse,
                ARGUMENT_REQUIRED,
                "Argument required",
            ));
        }
        self.engine.unmap(modes, lhs)
    }

    fn list_mappings(&mut self, modes: MapModes, prefix: Option<&str>) {
        let prefix = prefix.map(|p| parse_keys_with_leader(p, &self.engine.leader()));
        let entries: Vec<Arc<MappingEntry>> = self
            .engine
            .keymap
            .read()
            .entries(modes)
            .into_iter()
            .filter(|e| prefix.as_ref().map_or(true, |p| e.from.starts_with(p)))
            .collect();
        if entries.is_empty() {
            self.output.push("No mapping found".to_string());
            return;
        }
        for entry in entries {
            self.output.push(format_mapping(&entry));
        }
    }

    // marks

    fn mark(&mut self, range: Option<LineRange>, args: &str) -> Result<()> {
        let args = args.trim_end();
        let mut chars = args.chars();
        let Some(name) = chars.next() else {
            return Err(EngineError::new(
                ErrorType::Parse,
                ARGUMENT_REQUIRED,
                "Argument required",
            ));
        };
        if chars.next().is_some() {
            return Err(EngineError::new(
                ErrorType::Parse,
                TRAILING_CHARACTERS,
                format!("Trailing characters: {args}"),
            ));
        }
        let state = self.state_mut()?;
        let line = range.map_or_else(|| state.caret_line(), |r| r.start);
        state.marks.set_mark(Position::new(line, 0), name)
    }

    fn delmarks(&mut self, args: &str, bang: bool) -> Result<()> {
        let args = args.trim_end();
        let state = self.state_mut()?;
        if bang {
            if !args.is_empty() {
                return Err(EngineError::new(
                    ErrorType::Parse,
                    INVALID_ARGUMENT,
                    format!("Invalid argument: {args}"),
                ));
            }
            state.marks.delete_local_marks();
            return Ok(());
        }
        if args.is_empty() {
            return Err(EngineError::new(
                ErrorType::Parse,
                ARGUMENT_REQUIRED,
                "Argument required",
            ));
        }
        for name in expand_mark_names(args)? {
            state.marks.delete_mark(name)?;
        }
        Ok(())
    }

    fn marks(&mut self, args: &str) -> Result<()> {
        let state = self.state_mut()?;
        let wanted: Vec<char> = args.chars().filter(|c| !c.is_whitespace()).collect();
        let current = state.buffer_id();
        let mut lines = vec!["mark line  col file/text".to_string()];
        for mark in state.marks.list() {
            if !wanted.is_empty() && !wanted.contains(&mark.name) {
                continue;
            }
            let text = if mark.buffer == current {
                state.buffer().line_text(mark.position.line)
            } else {
                mark.buffer.to_string()
            };
            lines.push(format!(
                " {}  {:>5} {:>4} {}",
                mark.name,
                mark.position.line + 1,
                mark.position.column,
                text.trim_end_matches('\n')
            ));
        }
        self.output.extend(lines);
        Ok(())
    }
}

fn not_editor_command(text: &str) -> EngineError {
    EngineError::new(
        ErrorType::Parse,
        NOT_EDITOR_COMMAND,
        format!("Not an editor command: {text}"),
    )
}

/// Split `:set` arguments on unescaped blanks, removing the backslashes
fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = args.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ' ' | '\t' => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn show_option(name: &str, value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(true) => format!("  {name}"),
        OptionValue::Bool(false) => format!("no{name}"),
        other => format!("  {name}={other}"),
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MapArguments {
    nowait: bool,
    unique: bool,
}

/// Strip leading `<nowait>`, `<silent>`, `<unique>` in any order
fn map_arguments(args: &str) -> (MapArguments, &str) {
    let mut special = MapArguments::default();
    let mut rest = args.trim_start();
    loop {
        let lower = rest.get(..8).map(str::to_ascii_lowercase);
        match lower.as_deref() {
            Some("<nowait>") => special.nowait = true,
            Some("<silent>") => {}
            Some("<unique>") => special.unique = true,
            _ => return (special, rest),
        }
        rest = rest[8..].trim_start();
    }
}

fn format_mapping(entry: &MappingEntry) -> String {
    let star = match (&entry.target, entry.recursive) {
        (MappingTarget::Keys(_), false) => "*",
        _ => " ",
    };
    format!(
        "{:<3}{:<12} {}{}",
        entry.modes.to_string(),
        format_keys(&entry.from),
        star,
        entry.target
    )
}

/// `ab`, `a-d`, `A B` style mark lists
fn expand_mark_names(args: &str) -> Result<Vec<char>> {
    let chars: Vec<char> = args.chars().filter(|c| !c.is_whitespace()).collect();
    let mut names = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if chars.get(i + 1) == Some(&'-') {
            let Some(&end) = chars.get(i + 2) else {
                return Err(invalid_marks(args));
            };
            let same_class = (c.is_ascii_lowercase() && end.is_ascii_lowercase())
                || (c.is_ascii_uppercase() && end.is_ascii_uppercase())
                || (c.is_ascii_digit() && end.is_ascii_digit());
            if !same_class || end < c {
                return Err(invalid_marks(args));
            }
            names.extend(c..=end);
            i += 3;
        } else {
            names.push(c);
            i += 1;
        }
    }
    Ok(names)
}

fn invalid_marks(args: &str) -> EngineError {
    EngineError::new(
        ErrorType::Parse,
        INVALID_VALUE,
        format!("Invalid argument: {args}"),
    )
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
