//! `guicursor` option parsing
//!
//! The value is a comma-separated list of `modelist:argumentlist` tokens.
//! Modes in the list are separated by `-`; arguments are separated by `-`
//! and are a shape (`block`, `ver{N}`, `hor{N}`), a blink timing
//! (`blinkwait{N}`, `blinkon{N}`, `blinkoff{N}`) or a highlight group
//! (`group` or `group/lmapgroup`).
//!
//! Effective attributes for a mode are found by scanning tokens in order;
//! every token listing the mode overrides each field it sets.

use super::descriptor::{OptionError, OptionValue};
use crate::mode::Mode;
use std::fmt;

/// Cursor-shape mode names understood by `guicursor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorMode {
    Normal,
    Visual,
    VisualExclusive,
    OpPending,
    Insert,
    Replace,
    CmdLine,
    CmdInsert,
    CmdReplace,
    ShowMatch,
}

impl CursorMode {
    pub const ALL: [CursorMode; 10] = [
        CursorMode::Normal,
        CursorMode::Visual,
        CursorMode::VisualExclusive,
        CursorMode::OpPending,
        CursorMode::Insert,
        CursorMode::Replace,
        CursorMode::CmdLine,
        CursorMode::CmdInsert,
        CursorMode::CmdReplace,
        CursorMode::ShowMatch,
    ];

    pub fn abbrev(self) -> &'static str {
        match self {
            CursorMode::Normal => "n",
            CursorMode::Visual => "v",
            CursorMode::VisualExclusive => "ve",
            CursorMode::OpPending => "o",
            CursorMode::Insert => "i",
            CursorMode::Replace => "r",
            CursorMode::CmdLine => "c",
            CursorMode::CmdInsert => "ci",
            CursorMode::CmdReplace => "cr",
            CursorMode::ShowMatch => "sm",
        }
    }

    pub fn from_abbrev(s: &str) -> Option<CursorMode> {
        Self::ALL.into_iter().find(|m| m.abbrev() == s)
    }

    /// Cursor mode shown for an engine mode
    pub fn for_mode(mode: Mode, operator_pending: bool, exclusive_selection: bool) -> CursorMode {
        match mode {
            Mode::Normal if operator_pending => CursorMode::OpPending,
            Mode::Normal => CursorMode::Normal,
            Mode::Visual(_) if exclusive_selection => CursorMode::VisualExclusive,
            Mode::Visual(_) | Mode::Select(_) => CursorMode::Visual,
            Mode::Insert => CursorMode::Insert,
            Mode::Replace => CursorMode::Replace,
            Mode::CommandLine => CursorMode::CmdLine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Block,
    Vertical,
    Horizontal,
}

impl fmt::Display for CursorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorShape::Block => f.write_str("block"),
            CursorShape::Vertical => f.write_str("ver"),
            CursorShape::Horizontal => f.write_str("hor"),
        }
    }
}

/// One parsed `modelist:arguments` token. Fields left `None` do not
/// override earlier tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuiCursorEntry {
    pub modes: Vec<CursorMode>,
    pub shape: Option<CursorShape>,
    pub thickness: Option<u8>,
    pub group: Option<String>,
    pub lmap_group: Option<String>,
    pub blink_wait: Option<u32>,
    pub blink_on: Option<u32>,
    pub blink_off: Option<u32>,
}

/// Effective cursor attributes for one mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CursorAttributes {
    pub shape: CursorShape,
    /// Percentage of the cell for `ver`/`hor`; 0 when never set
    pub thickness: u8,
    pub group: String,
    pub lmap_group: Option<String>,
    pub blink_wait: u32,
    pub blink_on: u32,
    pub blink_off: u32,
}

/// Canonical default value
pub const DEFAULT: &str = "n-v-c:block-Cursor/lCursor,ve:ver35-Cursor,o:hor50-Cursor,\
i-ci:ver25-Cursor/lCursor,r-cr:hor20-Cursor/lCursor,\
sm:block-Cursor-blinkwait175-blinkoff150-blinkon175";

/// Parse a full option value
pub fn parse(value: &str) -> Result<Vec<GuiCursorEntry>, OptionError> {
    value
        .split(',')
        .filter(|token| !token.is_empty())
        .map(parse_entry)
        .collect()
}

/// Parse the items of a list-typed option value
pub fn parse_items(items: &[String]) -> Result<Vec<GuiCursorEntry>, OptionError> {
    items
        .iter()
        .filter(|token| !token.is_empty())
        .map(|token| parse_entry(token))
        .collect()
}

/// Validator used by the option registry
pub fn validate(value: &OptionValue) -> Result<(), OptionError> {
    match value {
        OptionValue::List(items) => parse_items(items).map(|_| ()),
        OptionValue::String(s) => parse(s).map(|_| ()),
        other => Err(OptionError::InvalidArgument(other.to_string())),
    }
}

fn parse_entry(token: &str) -> Result<GuiCursorEntry, OptionError> {
    let Some((mode_list, args)) = token.split_once(':') else {
        return Err(OptionError::MissingColon(token.to_string()));
    };

    let mut entry = GuiCursorEntry::default();
    for name in mode_list.split('-') {
        if name == "a" {
            entry.modes.extend(CursorMode::ALL);
            continue;
        }
        match CursorMode::from_abbrev(name) {
            Some(mode) => entry.modes.push(mode),
            None => return Err(OptionError::IllegalMode(token.to_string())),
        }
    }

    for arg in args.split('-').filter(|a| !a.is_empty()) {
        if arg == "block" {
            entry.shape = Some(CursorShape::Block);
        } else if let Some(digits) = arg.strip_prefix("ver") {
            entry.shape = Some(CursorShape::Vertical);
            entry.thickness = Some(parse_percentage(digits, token)?);
        } else if let Some(digits) = arg.strip_prefix("hor") {
            entry.shape = Some(CursorShape::Horizontal);
            entry.thickness = Some(parse_percentage(digits, token)?);
        } else if let Some(digits) = arg.strip_prefix("blinkwait") {
            entry.blink_wait = Some(parse_number(digits, token)?);
        } else if let Some(digits) = arg.strip_prefix("blinkon") {
            entry.blink_on = Some(parse_number(digits, token)?);
        } else if let Some(digits) = arg.strip_prefix("blinkoff") {
            entry.blink_off = Some(parse_number(digits, token)?);
        } else {
            match arg.split_once('/') {
                Some((group, lmap)) => {
                    entry.group = Some(group.to_string());
                    entry.lmap_group = Some(lmap.to_string());
                }
                None => entry.group = Some(arg.to_string()),
            }
        }
    }
    Ok(entry)
}

fn parse_number(digits: &str, token: &str) -> Result<u32, OptionError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OptionError::DigitExpected(token.to_string()));
    }
    digits
        .parse()
        .map_err(|_| OptionError::InvalidArgument(token.to_string()))
}

fn parse_percentage(digits: &str, token: &str) -> Result<u8, OptionError> {
    let n = match parse_number(digits, token) {
        Err(OptionError::InvalidArgument(_)) => {
            return Err(OptionError::IllegalPercentage(token.to_string()))
        }
        other => other?,
    };
    if !(1..=100).contains(&n) {
        return Err(OptionError::IllegalPercentage(token.to_string()));
    }
    Ok(n as u8)
}

/// Effective attributes for `mode`: last applicable token wins per field
pub fn effective(entries: &[GuiCursorEntry], mode: CursorMode) -> CursorAttributes {
    let mut attrs = CursorAttributes::default();
    for entry in entries.iter().filter(|e| e.modes.contains(&mode)) {
        if let Some(shape) = entry.shape {
            attrs.shape = shape;
        }
        if let Some(thickness) = entry.thickness {
            attrs.thickness = thickness;
        }
        if let Some(group) = &entry.group {
            attrs.group = group.clone();
        }
        if let Some(lmap) = &entry.lmap_group {
            attrs.lmap_group = Some(lmap.clone());
        }
        if let Some(n) = entry.blink_wait {
            attrs.blink_wait = n;
        }
        if let Some(n) = entry.blink_on {
            attrs.blink_on = n;
        }
        if let Some(n) = entry.blink_off {
            attrs.blink_off = n;
        }
    }
    attrs
}
