//! Global constants for the engine

pub mod errors {
    // Error Codes
    pub const UNKNOWN_COMMAND: &str = "E_UNKNOWN_COMMAND";
    pub const INVALID_REGISTER: &str = "E_INVALID_REGISTER";
    pub const ILLEGAL_TRANSITION: &str = "E_ILLEGAL_TRANSITION";
    pub const BUFFER_RANGE: &str = "E_BUFFER_RANGE";
    pub const UNKNOWN_HANDLER: &str = "E_UNKNOWN_HANDLER";
    pub const SCRIPT_ERROR: &str = "E_SCRIPT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const REGEX_PARSE_ERROR: &str = "REGEX_PARSE_ERROR";
    pub const REGEX_COMPILE_ERROR: &str = "REGEX_COMPILE_ERROR";

    // Vim-compatible codes surfaced to users
    pub const INVALID_RANGE: &str = "E16";
    pub const MARK_NOT_SET: &str = "E20";
    pub const NO_SUCH_MAPPING: &str = "E31";
    pub const NO_PREVIOUS_REGEX: &str = "E35";
    pub const UNKNOWN_MARK: &str = "E78";
    pub const ILLEGAL_MARK: &str = "E191";
    pub const RECURSIVE_MAPPING: &str = "E223";
    pub const MAPPING_EXISTS: &str = "E227";
    pub const ARGUMENT_REQUIRED: &str = "E471";
    pub const NO_RANGE_ALLOWED: &str = "E481";
    pub const TRAILING_CHARACTERS: &str = "E488";
    pub const INVALID_ARGUMENT: &str = "E474";
    pub const INVALID_VALUE: &str = "E475";
    pub const PATTERN_NOT_FOUND: &str = "E486";
    pub const NOT_EDITOR_COMMAND: &str = "E492";
    pub const NOTHING_IN_REGISTER: &str = "E353";
    pub const UNKNOWN_OPTION: &str = "E518";
    pub const MISSING_COLON: &str = "E545";
    pub const ILLEGAL_MODE: &str = "E546";
    pub const DIGIT_EXPECTED: &str = "E548";
    pub const ILLEGAL_PERCENTAGE: &str = "E549";
    pub const TEXT_TOO_LONG: &str = "E1240";
}

pub mod timing {
    /// Default `timeoutlen` in milliseconds
    pub const MAPPING_TIMEOUT_MS: i64 = 1000;
    /// Default `selectiondelay` in milliseconds
    pub const SELECTION_SETTLE_MS: i64 = 100;
    /// Default `maxmapdepth`
    pub const MAX_MAP_DEPTH: i64 = 1000;
}

pub mod limits {
    /// Largest count a command accepts; longer digit runs stop growing
    pub const MAX_COUNT: usize = 999_999_999;
    /// Largest text one put or shift may insert, in bytes
    pub const MAX_INSERT_BYTES: usize = 1 << 26;
}

pub mod modes {
    pub const NORMAL: &str = "NORMAL";
    pub const INSERT: &str = "INSERT";
    pub const REPLACE: &str = "REPLACE";
    pub const VISUAL: &str = "VISUAL";
    pub const VISUAL_LINE: &str = "VISUAL LINE";
    pub const VISUAL_BLOCK: &str = "VISUAL BLOCK";
    pub const SELECT: &str = "SELECT";
    pub const SELECT_LINE: &str = "SELECT LINE";
    pub const SELECT_BLOCK: &str = "SELECT BLOCK";
    pub const COMMAND_LINE: &str = "COMMAND";
}

pub mod env {
    /// Log filter, takes priority over `RUST_LOG`
    pub const LOG: &str = "RIFT_LOG";
    /// Init script used by the binary when `--init` is absent
    pub const INIT: &str = "RIFT_INIT";
}
