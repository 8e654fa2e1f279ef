//! Mapping table
//!
//! Stores `from -> to` key remappings per map mode. Each mode has its own
//! trie; a trie node holds one entry per owner so a collaborator's
//! mappings can be dropped in bulk without touching anyone else's. When
//! several owners map the same sequence the most recent definition wins.

pub mod trie;

pub use self::trie::{MatchResult, TrieNode};

use crate::constants::errors::{INVALID_ARGUMENT, NO_SUCH_MAPPING};
use crate::error::{EngineError, ErrorType, Result};
use crate::key::{format_keys, KeyEvent};
use crate::mode::Mode;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

/// Set of map modes an entry applies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MapModes(u8);

impl MapModes {
    pub const NONE: MapModes = MapModes(0);
    pub const NORMAL: MapModes = MapModes(1);
    pub const VISUAL: MapModes = MapModes(1 << 1);
    pub const SELECT: MapModes = MapModes(1 << 2);
    pub const OP_PENDING: MapModes = MapModes(1 << 3);
    pub const INSERT: MapModes = MapModes(1 << 4);
    pub const CMDLINE: MapModes = MapModes(1 << 5);

    /// `:map` without a mode letter
    pub const NVO: MapModes = MapModes(0b1111);
    pub const ALL: MapModes = MapModes(0b11_1111);

    const SINGLE: [(MapModes, char); 6] = [
        (MapModes::NORMAL, 'n'),
        (MapModes::VISUAL, 'x'),
        (MapModes::SELECT, 's'),
        (MapModes::OP_PENDING, 'o'),
        (MapModes::INSERT, 'i'),
        (MapModes::CMDLINE, 'c'),
    ];

    /// Parse a mode specifier as used in `nmap`, `vmap`, `map!`...
    pub fn from_spec(spec: &str) -> Option<MapModes> {
        Some(match spec {
            "" => MapModes::NVO,
            "n" => MapModes::NORMAL,
            "v" => MapModes::VISUAL | MapModes::SELECT,
            "x" => MapModes::VISUAL,
            "s" => MapModes::SELECT,
            "o" => MapModes::OP_PENDING,
            "i" => MapModes::INSERT,
            "c" => MapModes::CMDLINE,
            "!" => MapModes::INSERT | MapModes::CMDLINE,
            _ => return None,
        })
    }

    /// Map mode consulted for keys typed in `mode`
    pub fn for_mode(mode: Mode, operator_pending: bool) -> MapModes {
        match mode {
            Mode::Normal if operator_pending => MapModes::OP_PENDING,
            Mode::Normal => MapModes::NORMAL,
            Mode::Visual(_) => MapModes::VISUAL,
            Mode::Select(_) => MapModes::SELECT,
            Mode::Insert | Mode::Replace => MapModes::INSERT,
            Mode::CommandLine => MapModes::CMDLINE,
        }
    }

    pub const fn contains(self, other: MapModes) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: MapModes) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn without(self, other: MapModes) -> MapModes {
        MapModes(self.0 & !other.0)
    }

    /// Individual modes contained in this set
    pub fn iter(self) -> impl Iterator<Item = MapModes> {
        Self::SINGLE
            .into_iter()
            .map(|(m, _)| m)
            .filter(move |m| self.contains(*m))
    }

    /// Slot of a single mode in per-mode tables
    pub(crate) fn index(self) -> Option<usize> {
        Self::SINGLE.iter().position(|(m, _)| *m == self)
    }
}

impl BitOr for MapModes {
    type Output = MapModes;

    fn bitor(self, rhs: MapModes) -> MapModes {
        MapModes(self.0 | rhs.0)
    }
}

impl fmt::Display for MapModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == MapModes::NVO {
            return f.write_str(" ");
        }
        if *self == MapModes::VISUAL | MapModes::SELECT {
            return f.write_str("v");
        }
        if *self == MapModes::INSERT | MapModes::CMDLINE {
            return f.write_str("!");
        }
        for (mode, letter) in Self::SINGLE {
            if self.contains(mode) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Who defined a mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Interactive `:map` commands
    User,
    /// Init scripts run before the first key
    InitScript,
    /// A named plugin or host integration
    Plugin(String),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::User => f.write_str("user"),
            Owner::InitScript => f.write_str("init"),
            Owner::Plugin(name) => write!(f, "plugin:{name}"),
        }
    }
}

/// What a mapping expands to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingTarget {
    /// Replacement keys spliced into the input
    Keys(Vec<KeyEvent>),
    /// Named handler invoked directly
    Handler(String),
}

impl fmt::Display for MappingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingTarget::Keys(keys) => f.write_str(&format_keys(keys)),
            MappingTarget::Handler(name) => write!(f, "<Action>({name})"),
        }
    }
}

/// Definition flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapFlags {
    /// Re-run mapping resolution on the replacement keys
    pub recursive: bool,
    /// Apply immediately even when longer mappings exist
    pub nowait: bool,
}

impl MapFlags {
    pub const RECURSIVE: MapFlags = MapFlags {
        recursive: true,
        nowait: false,
    };
    pub const NOREMAP: MapFlags = MapFlags {
        recursive: false,
        nowait: false,
    };

    #[must_use]
    pub fn nowait(mut self) -> Self {
        self.nowait = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub modes: MapModes,
    pub from: Vec<KeyEvent>,
    pub target: MappingTarget,
    pub owner: Owner,
    pub recursive: bool,
    pub nowait: bool,
    /// Definition order; higher is newer
    pub seq: u64,
}

/// Outcome of resolving pending keys against the table
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    NoMatch,
    /// Pending keys are a strict prefix of a longer mapping. `exact` is the
    /// mapping to commit to if the wait times out.
    Prefix { exact: Option<Arc<MappingEntry>> },
    Exact(Arc<MappingEntry>),
}

type Slot = Vec<Arc<MappingEntry>>;

fn newest(slot: &Slot) -> Option<&Arc<MappingEntry>> {
    slot.iter().max_by_key(|e| e.seq)
}

/// Key-sequence remapping table
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    tries: [TrieNode<Slot>; 6],
    next_seq: u64,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a mapping in every mode of `modes`. A previous entry with the
    /// same mode, owner and `from` is overwritten.
    pub fn define(
        &mut self,
        modes: MapModes,
        from: Vec<KeyEvent>,
        target: MappingTarget,
        owner: Owner,
        flags: MapFlags,
    ) -> Result<Arc<MappingEntry>> {
        if from.is_empty() {
            return Err(EngineError::new(
                ErrorType::Mapping,
                INVALID_ARGUMENT,
                "Invalid argument: empty mapping",
            ));
        }
        if modes.is_empty() {
            return Err(EngineError::new(
                ErrorType::Mapping,
                INVALID_ARGUMENT,
                "Invalid argument: no map mode",
            ));
        }

        self.next_seq += 1;
        let entry = Arc::new(MappingEntry {
            modes,
            from,
            target,
            owner,
            recursive: flags.recursive,
            nowait: flags.nowait,
            seq: self.next_seq,
        });
        tracing::debug!(
            modes = %entry.modes,
            from = %format_keys(&entry.from),
            to = %entry.target,
            owner = %entry.owner,
            "define mapping"
        );

        for mode in modes.iter() {
            let Some(trie) = self.trie_mut(mode) else {
                continue;
            };
            let node = trie.node_mut(&entry.from);
            if node.value().is_none() {
                node.insert(&[], Vec::new());
            }
            if let Some(slot) = node.value_mut() {
                slot.retain(|e| e.owner != entry.owner);
                slot.push(Arc::clone(&entry));
            }
        }
        Ok(entry)
    }

    /// Remove mappings of `owner`, optionally restricted to `modes` and to
    /// one `from` sequence. Returns how many per-mode entries were dropped.
    pub fn remove(
        &mut self,
        owner: &Owner,
        modes: Option<MapModes>,
        from: Option<&[KeyEvent]>,
    ) -> usize {
        let modes = modes.unwrap_or(MapModes::ALL);
        let mut removed = 0;
        for mode in modes.iter() {
            let Some(trie) = self.trie_mut(mode) else {
                continue;
            };
            let mut drop_owned = |slot: &mut Slot| {
                let before = slot.len();
                slot.retain(|e| &e.owner != owner);
                removed += before - slot.len();
                !slot.is_empty()
            };
            match from {
                Some(keys) => {
                    let node = trie.node_mut(keys);
                    if let Some(slot) = node.value_mut() {
                        if !drop_owned(slot) {
                            node.take_value();
                        }
                    }
                    trie.prune(keys);
                }
                None => trie.retain(&mut drop_owned),
            }
        }
        tracing::debug!(owner = %owner, removed, "remove mappings");
        removed
    }

    /// `:unmap` semantics: remove `from` in `modes` for `owner`, failing
    /// with E31 when nothing matched.
    pub fn unmap(&mut self, owner: &Owner, modes: MapModes, from: &[KeyEvent]) -> Result<()> {
        if self.remove(owner, Some(modes), Some(from)) == 0 {
            return Err(EngineError::new(
                ErrorType::Mapping,
                NO_SUCH_MAPPING,
                "No such mapping",
            ));
        }
        Ok(())
    }

    /// `:unmap` from the command line: remove `from` in `modes` whoever
    /// defined it, failing with E31 when nothing matched.
    pub fn unmap_any(&mut self, modes: MapModes, from: &[KeyEvent]) -> Result<()> {
        let mut removed = 0;
        loop {
            let mut owners: Vec<Owner> = self
                .entries(modes)
                .into_iter()
                .filter(|e| e.from == from)
                .map(|e| e.owner.clone())
                .collect();
            owners.dedup();
            if owners.is_empty() {
                break;
            }
            for owner in &owners {
                removed += self.remove(owner, Some(modes), Some(from));
            }
        }
        if removed == 0 {
            return Err(EngineError::new(
                ErrorType::Mapping,
                NO_SUCH_MAPPING,
                "No such mapping",
            ));
        }
        Ok(())
    }

    /// Drop every mapping in `modes`, regardless of owner
    pub fn clear(&mut self, modes: MapModes) {
        for mode in modes.iter() {
            if let Some(trie) = self.trie_mut(mode) {
                *trie = TrieNode::new();
            }
        }
    }

    /// Resolve pending keys typed in a single map mode
    pub fn resolve(&self, mode: MapModes, pending: &[KeyEvent]) -> Resolution {
        let Some(trie) = self.trie(mode) else {
            return Resolution::NoMatch;
        };
        let resolution = match trie.lookup(pending) {
            MatchResult::None => Resolution::NoMatch,
            MatchResult::Prefix => Resolution::Prefix { exact: None },
            MatchResult::Exact(slot) => match newest(slot) {
                Some(entry) => Resolution::Exact(Arc::clone(entry)),
                None => Resolution::NoMatch,
            },
            MatchResult::Ambiguous(slot) => match newest(slot) {
                Some(entry) if entry.nowait => Resolution::Exact(Arc::clone(entry)),
                exact => Resolution::Prefix {
                    exact: exact.cloned(),
                },
            },
        };
        tracing::trace!(keys = %format_keys(pending), ?resolution, "resolve mapping");
        resolution
    }

    /// Longest mapping that is a prefix of `keys`, with its length
    pub fn longest_exact_prefix(
        &self,
        mode: MapModes,
        keys: &[KeyEvent],
    ) -> Option<(usize, Arc<MappingEntry>)> {
        let (len, slot) = self.trie(mode)?.longest_prefix(keys)?;
        newest(slot).map(|entry| (len, Arc::clone(entry)))
    }

    /// Winning entries in any of `modes`, ordered by `from`
    pub fn entries(&self, modes: MapModes) -> Vec<Arc<MappingEntry>> {
        let mut out: Vec<Arc<MappingEntry>> = Vec::new();
        for mode in modes.iter() {
            let Some(trie) = self.trie(mode) else {
                continue;
            };
            trie.for_each(&mut |_, slot| {
                if let Some(entry) = newest(slot) {
                    if !out.iter().any(|e| e.seq == entry.seq) {
                        out.push(Arc::clone(entry));
                    }
                }
            });
        }
        out.sort_by_cached_key(|e| (format_keys(&e.from), e.seq));
        out
    }

    pub fn is_empty(&self) -> bool {
        self.tries.iter().all(TrieNode::is_empty)
    }

    fn trie(&self, mode: MapModes) -> Option<&TrieNode<Slot>> {
        mode.index().map(|i| &self.tries[i])
    }

    fn trie_mut(&mut self, mode: MapModes) -> Option<&mut TrieNode<Slot>> {
        mode.index().map(|i| &mut self.tries[i])
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
