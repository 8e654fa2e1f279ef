use crate::key::KeyEvent;
use std::collections::HashMap;

/// Result of looking up a key sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<'a, T> {
    /// Exact match found and nothing longer starts with it
    Exact(&'a T),
    /// Sequence is a valid prefix of longer bindings but has no value itself
    Prefix,
    /// Sequence is a valid prefix AND has a value itself (e.g. 'd')
    Ambiguous(&'a T),
    /// No match found
    None,
}

/// A node in the key sequence trie
#[derive(Debug, Clone)]
pub struct TrieNode<T> {
    /// Children nodes mapped by key
    children: HashMap<KeyEvent, TrieNode<T>>,
    /// Value stored at this sequence (if any)
    value: Option<T>,
}

impl<T> Default for TrieNode<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }
}

impl<T> TrieNode<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sequence into the trie, replacing any previous value
    pub fn insert(&mut self, keys: &[KeyEvent], value: T) -> Option<T> {
        self.node_mut(keys).value.replace(value)
    }

    /// Node for `keys`, creating intermediate nodes as needed
    pub fn node_mut(&mut self, keys: &[KeyEvent]) -> &mut TrieNode<T> {
        match keys.split_first() {
            None => self,
            Some((key, rest)) => self.children.entry(*key).or_default().node_mut(rest),
        }
    }

    pub fn get(&self, keys: &[KeyEvent]) -> Option<&TrieNode<T>> {
        match keys.split_first() {
            None => Some(self),
            Some((key, rest)) => self.children.get(key)?.get(rest),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn take_value(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    /// Look up a sequence
    pub fn lookup(&self, keys: &[KeyEvent]) -> MatchResult<'_, T> {
        let Some(node) = self.get(keys) else {
            return MatchResult::None;
        };
        match (&node.value, node.children.is_empty()) {
            (Some(value), true) => MatchResult::Exact(value),
            (Some(value), false) => MatchResult::Ambiguous(value),
            (None, false) => MatchResult::Prefix,
            (None, true) => MatchResult::None,
        }
    }

    /// Longest prefix of `keys` that carries a value, with its length
    pub fn longest_prefix(&self, keys: &[KeyEvent]) -> Option<(usize, &T)> {
        let mut node = self;
        let mut best = None;
        for (i, key) in keys.iter().enumerate() {
            match node.children.get(key) {
                Some(child) => node = child,
                None => break,
            }
            if let Some(value) = &node.value {
                best = Some((i + 1, value));
            }
        }
        best
    }

    /// Visit every stored value together with its key sequence
    pub fn for_each<F: FnMut(&[KeyEvent], &T)>(&self, f: &mut F) {
        let mut path = Vec::new();
        self.walk(&mut path, f);
    }

    fn walk<F: FnMut(&[KeyEvent], &T)>(&self, path: &mut Vec<KeyEvent>, f: &mut F) {
        if let Some(value) = &self.value {
            f(path, value);
        }
        for (key, child) in &self.children {
            path.push(*key);
            child.walk(path, f);
            path.pop();
        }
    }

    /// Apply `f` to every value; values for which it returns false are
    /// dropped and empty branches pruned.
    pub fn retain<F: FnMut(&mut T) -> bool>(&mut self, f: &mut F) {
        if let Some(value) = self.value.as_mut() {
            if !f(value) {
                self.value = None;
            }
        }
        for child in self.children.values_mut() {
            child.retain(f);
        }
        self.children.retain(|_, child| !child.is_empty());
    }

    /// Remove empty branches along `keys`
    pub fn prune(&mut self, keys: &[KeyEvent]) {
        if let Some((key, rest)) = keys.split_first() {
            if let Some(child) = self.children.get_mut(key) {
                child.prune(rest);
                if child.is_empty() {
                    self.children.remove(key);
                }
            }
        }
    }
}
