//! Option definitions
//! Declarative table of every option the engine understands

use super::descriptor::{Locality, OptionDescriptor, OptionError, OptionType, OptionValue};
use super::guicursor;

const SELECTION_VALUES: &[&str] = &["inclusive", "exclusive", "old"];
const SELECTMODE_ITEMS: &[&str] = &["mouse", "key", "cmd"];
const WHICHWRAP_ITEMS: &[&str] = &["b", "s", "h", "l", "<", ">", "~", "[", "]"];

fn validate_leader(value: &OptionValue) -> Result<(), OptionError> {
    match value {
        OptionValue::String(s) if s.is_empty() => {
            Err(OptionError::InvalidValue("mapleader=".to_string()))
        }
        _ => Ok(()),
    }
}

pub const OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor {
        name: "timeout",
        aliases: &["to"],
        ty: OptionType::Boolean,
        locality: Locality::Global,
        default: "on",
        validate: None,
    },
    OptionDescriptor {
        name: "timeoutlen",
        aliases: &["tm"],
        ty: OptionType::Number {
            min: Some(0),
            max: None,
        },
        locality: Locality::Global,
        default: "1000",
        validate: None,
    },
    OptionDescriptor {
        name: "maxmapdepth",
        aliases: &["mmd"],
        ty: OptionType::Number {
            min: Some(1),
            max: None,
        },
        locality: Locality::Global,
        default: "1000",
        validate: None,
    },
    OptionDescriptor {
        name: "ignorecase",
        aliases: &["ic"],
        ty: OptionType::Boolean,
        locality: Locality::Global,
        default: "off",
        validate: None,
    },
    OptionDescriptor {
        name: "smartcase",
        aliases: &["scs"],
        ty: OptionType::Boolean,
        locality: Locality::Global,
        default: "off",
        validate: None,
    },
    OptionDescriptor {
        name: "wrapscan",
        aliases: &["ws"],
        ty: OptionType::Boolean,
        locality: Locality::Global,
        default: "on",
        validate: None,
    },
    OptionDescriptor {
        name: "hlsearch",
        aliases: &["hls"],
        ty: OptionType::Boolean,
        locality: Locality::Global,
        default: "off",
        validate: None,
    },
    OptionDescriptor {
        name: "selection",
        aliases: &["sel"],
        ty: OptionType::String {
            allowed: Some(SELECTION_VALUES),
        },
        locality: Locality::Global,
        default: "inclusive",
        validate: None,
    },
    OptionDescriptor {
        name: "selectmode",
        aliases: &["slm"],
        ty: OptionType::List {
            allowed: Some(SELECTMODE_ITEMS),
            dedup: true,
        },
        locality: Locality::Global,
        default: "",
        validate: None,
    },
    OptionDescriptor {
        name: "whichwrap",
        aliases: &["ww"],
        ty: OptionType::List {
            allowed: Some(WHICHWRAP_ITEMS),
            dedup: true,
        },
        locality: Locality::Global,
        default: "b,s",
        validate: None,
    },
    OptionDescriptor {
        name: "guicursor",
        aliases: &["gcr"],
        ty: OptionType::List {
            allowed: None,
            dedup: false,
        },
        locality: Locality::Global,
        default: guicursor::DEFAULT,
        validate: Some(guicursor::validate),
    },
    OptionDescriptor {
        name: "mapleader",
        aliases: &[],
        ty: OptionType::String { allowed: None },
        locality: Locality::Global,
        default: "\\",
        validate: Some(validate_leader),
    },
    OptionDescriptor {
        name: "selectiondelay",
        aliases: &["sdl"],
        ty: OptionType::Number {
            min: Some(0),
            max: Some(10_000),
        },
        locality: Locality::Global,
        default: "100",
        validate: None,
    },
    OptionDescriptor {
        name: "shiftwidth",
        aliases: &["sw"],
        ty: OptionType::Number {
            min: Some(0),
            max: None,
        },
        locality: Locality::Buffer,
        default: "8",
        validate: None,
    },
    OptionDescriptor {
        name: "expandtab",
        aliases: &["et"],
        ty: OptionType::Boolean,
        locality: Locality::Buffer,
        default: "off",
        validate: None,
    },
    OptionDescriptor {
        name: "tabstop",
        aliases: &["ts"],
        ty: OptionType::Number {
            min: Some(1),
            max: None,
        },
        locality: Locality::Buffer,
        default: "8",
        validate: None,
    },
];
