//! Mark store
//!
//! Lowercase and special marks belong to one buffer and live in the
//! session's store. Uppercase and digit marks are global: every session
//! shares one table through [`SharedMarks`].

use crate::buffer::{BufferId, Position};
use crate::constants::errors::ILLEGAL_MARK;
use crate::error::{EngineError, ErrorType, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Position before the latest jump (also spelled `` ` ``)
pub const JUMP: char = '\'';
pub const CHANGE_START: char = '[';
pub const CHANGE_END: char = ']';
pub const VISUAL_START: char = '<';
pub const VISUAL_END: char = '>';
pub const LAST_CHANGE: char = '.';
pub const LAST_INSERT: char = '^';

const SPECIAL: &[char] = &[
    JUMP,
    CHANGE_START,
    CHANGE_END,
    VISUAL_START,
    VISUAL_END,
    LAST_CHANGE,
    LAST_INSERT,
];

/// Where a mark name is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkScope {
    Local,
    Global,
}

impl MarkScope {
    /// Scope for a mark name, or `None` when the name is not a mark
    pub fn of(name: char) -> Option<MarkScope> {
        match name {
            'a'..='z' => Some(MarkScope::Local),
            'A'..='Z' | '0'..='9' => Some(MarkScope::Global),
            '`' => Some(MarkScope::Local),
            c if SPECIAL.contains(&c) => Some(MarkScope::Local),
            _ => None,
        }
    }
}

/// A saved position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub name: char,
    pub buffer: BufferId,
    pub position: Position,
}

/// Process-wide table of global marks
pub type SharedMarks = Arc<RwLock<BTreeMap<char, Mark>>>;

#[derive(Debug, Clone)]
pub struct MarkStore {
    buffer: BufferId,
    local: BTreeMap<char, Position>,
    global: SharedMarks,
}

fn canonical(name: char) -> char {
    if name == '`' {
        JUMP
    } else {
        name
    }
}

fn illegal(name: char) -> EngineError {
    EngineError::new(
        ErrorType::Input,
        ILLEGAL_MARK,
        format!("Argument must be a letter or forward/backward quote: {name}"),
    )
}

impl MarkStore {
    pub fn new(buffer: BufferId, global: SharedMarks) -> Self {
        Self {
            buffer,
            local: BTreeMap::new(),
            global,
        }
    }

    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Record `caret` under `name`, overwriting any previous value
    pub fn set_mark(&mut self, caret: Position, name: char) -> Result<()> {
        let scope = MarkScope::of(name).ok_or_else(|| illegal(name))?;
        let name = canonical(name);
        tracing::trace!(mark = %name, line = caret.line, column = caret.column, "set mark");
        match scope {
            MarkScope::Local => {
                self.local.insert(name, caret);
            }
            MarkScope::Global => {
                self.global.write().insert(
                    name,
                    Mark {
                        name,
                        buffer: self.buffer,
                        position: caret,
                    },
                );
            }
        }
        Ok(())
    }

    /// Record one of the special marks (`[`, `<`, `^` ...) the engine keeps
    /// up to date itself. These are always local, so this cannot fail.
    pub fn set_special(&mut self, caret: Position, name: char) {
        debug_assert!(SPECIAL.contains(&name), "not a special mark: {name}");
        tracing::trace!(mark = %name, line = caret.line, column = caret.column, "set mark");
        self.local.insert(name, caret);
    }

    /// Look up a mark. Unset and unknown names are simply absent.
    pub fn get_mark(&self, name: char) -> Option<Mark> {
        let name = canonical(name);
        match MarkScope::of(name)? {
            MarkScope::Local => self.local.get(&name).map(|&position| Mark {
                name,
                buffer: self.buffer,
                position,
            }),
            MarkScope::Global => self.global.read().get(&name).copied(),
        }
    }

    pub fn delete_mark(&mut self, name: char) -> Result<bool> {
        let scope = MarkScope::of(name).ok_or_else(|| illegal(name))?;
        let name = canonical(name);
        Ok(match scope {
            MarkScope::Local => self.local.remove(&name).is_some(),
            MarkScope::Global => self.global.write().remove(&name).is_some(),
        })
    }

    /// `:delmarks!` removes the lowercase marks of this buffer
    pub fn delete_local_marks(&mut self) {
        self.local.retain(|name, _| !name.is_ascii_lowercase());
    }

    /// Local marks of this buffer followed by all global marks
    pub fn list(&self) -> Vec<Mark> {
        let mut marks: Vec<Mark> = self
            .local
            .iter()
            .map(|(&name, &position)| Mark {
                name,
                buffer: self.buffer,
                position,
            })
            .collect();
        marks.extend(self.global.read().values().copied());
        marks
    }
}
