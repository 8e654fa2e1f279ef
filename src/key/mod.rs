//! Key representation for engine input
//!
//! A [`KeyEvent`] is a key plus modifier flags. Events are normalized on
//! construction so that equality is exact: shift is folded into printable
//! characters and control letters are lowercase.
//!
//! Mappings and scripts spell key sequences in angle-bracket notation
//! (`<Esc>`, `<C-w>`, `<lt>`); [`parse_keys`] and [`format_keys`] convert
//! between the two forms.

pub mod crossterm;

use std::fmt;
use std::ops::BitOr;

/// A physical or symbolic key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character
    Char(char),
    Escape,
    Enter,
    Backspace,
    Tab,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key F1..F12
    F(u8),
    /// Does nothing; used as a mapping target to disable a key
    Nop,
}

/// Modifier flags held while a key was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(1);
    pub const ALT: Modifiers = Modifiers(1 << 1);
    pub const SHIFT: Modifiers = Modifiers(1 << 2);
    pub const META: Modifiers = Modifiers(1 << 3);

    #[must_use]
    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn without(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 & !other.0)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

/// A key press: key plus modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a normalized key event
    #[must_use]
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        let mut key = key;
        let mut modifiers = modifiers;
        if let Key::Char(c) = key {
            if modifiers.contains(Modifiers::SHIFT) {
                modifiers = modifiers.without(Modifiers::SHIFT);
                key = Key::Char(c.to_ascii_uppercase());
            }
            if modifiers.contains(Modifiers::CTRL) {
                key = Key::Char(c.to_ascii_lowercase());
            }
        }
        Self { key, modifiers }
    }

    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    #[must_use]
    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::NONE)
    }

    #[must_use]
    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::CTRL)
    }

    #[must_use]
    pub fn alt(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::ALT)
    }

    /// The typed character when this is an unmodified printable key
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if self.modifiers.is_empty() => Some(c),
            _ => None,
        }
    }

    /// `<Esc>`, `<C-[>` and `<C-c>` all cancel
    #[must_use]
    pub fn is_escape(&self) -> bool {
        match self.key {
            Key::Escape => true,
            Key::Char('[') | Key::Char('c') => self.modifiers == Modifiers::CTRL,
            _ => false,
        }
    }

    /// Character that should be inserted literally for this key, if any
    #[must_use]
    pub fn literal(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if self.modifiers.is_empty() => Some(c),
            Key::Char(c) if self.modifiers == Modifiers::CTRL && c.is_ascii_alphabetic() => {
                // Control characters insert as their ASCII code
                char::from_u32(c as u32 & 0x1f)
            }
            Key::Tab if self.modifiers.is_empty() => Some('\t'),
            _ => None,
        }
    }
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        KeyEvent::char(c)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_key(self))
    }
}

/// Parse angle-bracket key notation into key events
///
/// Unknown or unterminated `<...>` groups are taken literally, so `<foo`
/// is the four keys `<`, `f`, `o`, `o`.
#[must_use]
pub fn parse_keys(input: &str) -> Vec<KeyEvent> {
    parse_keys_with_leader(input, "\\")
}

/// Parse key notation, expanding `<Leader>` to `leader`
#[must_use]
pub fn parse_keys_with_leader(input: &str, leader: &str) -> Vec<KeyEvent> {
    let chars: Vec<char> = input.chars().collect();
    let mut keys = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '<' {
            if let Some(len) = chars[i + 1..].iter().position(|&c| c == '>') {
                let inner: String = chars[i + 1..i + 1 + len].iter().collect();
                if let Some(special) = parse_special(&inner, leader) {
                    keys.extend(special);
                    i += len + 2;
                    continue;
                }
            }
        }
        keys.push(KeyEvent::char(chars[i]));
        i += 1;
    }

    keys
}

fn parse_special(inner: &str, leader: &str) -> Option<Vec<KeyEvent>> {
    if inner.is_empty() {
        return None;
    }

    let mut rest = inner;
    let mut modifiers = Modifiers::NONE;
    loop {
        let mut it = rest.chars();
        let (Some(m), Some('-')) = (it.next(), it.next()) else {
            break;
        };
        if rest.len() <= 2 {
            break;
        }
        modifiers = modifiers
            | match m.to_ascii_lowercase() {
                'c' => Modifiers::CTRL,
                'a' => Modifiers::ALT,
                'm' => Modifiers::META,
                's' => Modifiers::SHIFT,
                _ => return None,
            };
        rest = &rest[2..];
    }

    let mut single = rest.chars();
    if let (Some(c), None) = (single.next(), single.next()) {
        if modifiers.is_empty() {
            // `<x>` is not notation
            return None;
        }
        return Some(vec![KeyEvent::new(Key::Char(c), modifiers)]);
    }

    let lower = rest.to_ascii_lowercase();
    let key = match lower.as_str() {
        "esc" => Key::Escape,
        "cr" | "enter" | "return" => Key::Enter,
        "bs" | "backspace" => Key::Backspace,
        "tab" => Key::Tab,
        "del" | "delete" => Key::Delete,
        "insert" | "ins" => Key::Insert,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "nop" => Key::Nop,
        "space" => Key::Char(' '),
        "bar" => Key::Char('|'),
        "bslash" => Key::Char('\\'),
        "lt" => Key::Char('<'),
        "leader" if modifiers.is_empty() => {
            return Some(leader.chars().map(KeyEvent::char).collect());
        }
        _ => {
            let n = lower.strip_prefix('f')?.parse::<u8>().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            Key::F(n)
        }
    };

    Some(vec![KeyEvent::new(key, modifiers)])
}

/// Format one key event in angle-bracket notation
#[must_use]
pub fn format_key(event: &KeyEvent) -> String {
    let name = match event.key {
        Key::Char('<') => "lt".to_string(),
        Key::Char(' ') => "Space".to_string(),
        Key::Char('|') => "Bar".to_string(),
        Key::Char(c) if event.modifiers.is_empty() => return c.to_string(),
        Key::Char(c) => c.to_string(),
        Key::Escape => "Esc".to_string(),
        Key::Enter => "CR".to_string(),
        Key::Backspace => "BS".to_string(),
        Key::Tab => "Tab".to_string(),
        Key::Delete => "Del".to_string(),
        Key::Insert => "Insert".to_string(),
        Key::Up => "Up".to_string(),
        Key::Down => "Down".to_string(),
        Key::Left => "Left".to_string(),
        Key::Right => "Right".to_string(),
        Key::Home => "Home".to_string(),
        Key::End => "End".to_string(),
        Key::PageUp => "PageUp".to_string(),
        Key::PageDown => "PageDown".to_string(),
        Key::F(n) => format!("F{n}"),
        Key::Nop => "Nop".to_string(),
    };

    let mut prefix = String::new();
    if event.modifiers.contains(Modifiers::CTRL) {
        prefix.push_str("C-");
    }
    if event.modifiers.contains(Modifiers::ALT) {
        prefix.push_str("A-");
    }
    if event.modifiers.contains(Modifiers::META) {
        prefix.push_str("M-");
    }
    if event.modifiers.contains(Modifiers::SHIFT) {
        prefix.push_str("S-");
    }
    format!("<{prefix}{name}>")
}

/// Format a key sequence in angle-bracket notation
#[must_use]
pub fn format_keys(keys: &[KeyEvent]) -> String {
    keys.iter().map(format_key).collect()
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
