//! Ex command parser
//! Parses command line input into structured command data

use super::range::{parse_range, LineRange};
use super::registry::{CommandDef, CommandRegistry, MatchResult};
use crate::error::Result;
use crate::keymap::MapModes;
use crate::state::EditorState;
use std::sync::OnceLock;

/// Which values `:set` style commands touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetScope {
    /// `:set`: buffer value and global default
    Both,
    Local,
    Global,
}

/// Parsed command representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Range without a command: go to its last line
    Goto,
    Set { scope: SetScope, args: String },
    Map {
        modes: MapModes,
        recursive: bool,
        args: String,
    },
    Unmap { modes: MapModes, args: String },
    MapClear { modes: MapModes },
    Mark { args: String },
    DelMarks { args: String, bang: bool },
    Marks { args: String },
    NoHlSearch,
    Unknown { name: String },
    Ambiguous { prefix: String, matches: Vec<String> },
}

/// A command with the range typed before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExLine {
    pub range: Option<LineRange>,
    pub command: ParsedCommand,
}

/// Abbreviation rules as `name` plus the shortest accepted prefix
const COMMANDS: &[(&str, usize)] = &[
    ("set", 2),
    ("setlocal", 4),
    ("setglobal", 4),
    ("map", 3),
    ("nmap", 2),
    ("vmap", 2),
    ("xmap", 2),
    ("smap", 4),
    ("omap", 2),
    ("imap", 2),
    ("cmap", 2),
    ("noremap", 2),
    ("nnoremap", 2),
    ("vnoremap", 2),
    ("xnoremap", 2),
    ("snoremap", 4),
    ("onoremap", 3),
    ("inoremap", 3),
    ("cnoremap", 3),
    ("unmap", 3),
    ("nunmap", 3),
    ("vunmap", 2),
    ("xunmap", 2),
    ("sunmap", 4),
    ("ounmap", 2),
    ("iunmap", 2),
    ("cunmap", 2),
    ("mapclear", 4),
    ("nmapclear", 5),
    ("vmapclear", 5),
    ("xmapclear", 5),
    ("smapclear", 5),
    ("omapclear", 5),
    ("imapclear", 5),
    ("cmapclear", 5),
    ("mark", 2),
    ("k", 1),
    ("delmarks", 4),
    ("marks", 5),
    ("nohlsearch", 3),
];

/// Registry of ex command names with vim-style abbreviations
pub fn command_registry() -> &'static CommandRegistry {
    static REGISTRY: OnceLock<CommandRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        COMMANDS.iter().fold(CommandRegistry::new(), |registry, &(name, min)| {
            let aliases = (min..name.len()).map(|n| &name[..n]);
            registry.register(CommandDef::new(name).with_aliases(aliases))
        })
    })
}

/// Mode letter in front of a map command (`n` of `nmap`)
fn map_modes(prefix: &str, bang: bool) -> Option<MapModes> {
    if bang {
        return (prefix.is_empty()).then_some(MapModes::INSERT | MapModes::CMDLINE);
    }
    MapModes::from_spec(prefix)
}

fn classify(name: &str, bang: bool, args: &str) -> ParsedCommand {
    let args = args.to_string();
    match name {
        "set" => ParsedCommand::Set {
            scope: SetScope::Both,
            args,
        },
        "setlocal" => ParsedCommand::Set {
            scope: SetScope::Local,
            args,
        },
        "setglobal" => ParsedCommand::Set {
            scope: SetScope::Global,
            args,
        },
        "mark" | "k" => ParsedCommand::Mark { args },
        "delmarks" => ParsedCommand::DelMarks { args, bang },
        "marks" => ParsedCommand::Marks { args },
        "nohlsearch" => ParsedCommand::NoHlSearch,
        _ => {
            let parsed = if let Some(prefix) = name.strip_suffix("mapclear") {
                map_modes(prefix, bang).map(|modes| ParsedCommand::MapClear { modes })
            } else if let Some(prefix) = name.strip_suffix("unmap") {
                map_modes(prefix, bang).map(|modes| ParsedCommand::Unmap { modes, args })
            } else if let Some(prefix) = name.strip_suffix("noremap") {
                map_modes(prefix, bang).map(|modes| ParsedCommand::Map {
                    modes,
                    recursive: false,
                    args,
                })
            } else if let Some(prefix) = name.strip_suffix("map") {
                map_modes(prefix, bang).map(|modes| ParsedCommand::Map {
                    modes,
                    recursive: true,
                    args,
                })
            } else {
                None
            };
            parsed.unwrap_or_else(|| ParsedCommand::Unknown {
                name: format!("{name}{}", if bang { "!" } else { "" }),
            })
        }
    }
}

/// Parse a command line string
///
/// Input format: `:[range]command[!] [args...]`. The leading colon is
/// optional.
pub fn parse(input: &str, state: Option<&EditorState>) -> Result<ExLine> {
    let input = input.trim_start_matches([':', ' ', '\t']);
    let (range, rest) = parse_range(input, state)?;
    let rest = rest.trim_start();

    if rest.is_empty() {
        let command = if range.is_some() {
            ParsedCommand::Goto
        } else {
            ParsedCommand::Unknown {
                name: String::new(),
            }
        };
        return Ok(ExLine { range, command });
    }

    let name_len = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphabetic())
        .map_or(rest.len(), |(i, _)| i);
    let mut name = &rest[..name_len];
    let mut after = &rest[name_len..];

    // `:ka` is `:k a`
    if name.len() > 1
        && name.starts_with('k')
        && matches!(command_registry().match_command(name), MatchResult::Unknown(_))
    {
        after = &rest[1..];
        name = "k";
    }
    if name.is_empty() {
        return Ok(ExLine {
            range,
            command: ParsedCommand::Unknown {
                name: rest.to_string(),
            },
        });
    }

    let bang = after.starts_with('!');
    if bang {
        after = &after[1..];
    }
    // Trailing blanks can be escaped values of `:set`
    let args = after.trim_start();

    let command = match command_registry().match_command(name) {
        MatchResult::Exact(full) | MatchResult::Prefix(full) => classify(&full, bang, args),
        MatchResult::Ambiguous { prefix, matches } => ParsedCommand::Ambiguous { prefix, matches },
        MatchResult::Unknown(name) => ParsedCommand::Unknown { name },
    };
    Ok(ExLine { range, command })
}
