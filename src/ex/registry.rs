//! Name registry
//! Resolves typed names to canonical command or option names through
//! exact names, explicit aliases and unambiguous prefixes

/// Result of matching a typed name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// Exact match found (canonical name or explicit alias)
    Exact(String),
    /// Unambiguous prefix match
    Prefix(String),
    /// Ambiguous - multiple names match
    Ambiguous { prefix: String, matches: Vec<String> },
    /// No match found
    Unknown(String),
}

impl MatchResult {
    /// Canonical name for exact and prefix matches
    pub fn resolved(&self) -> Option<&str> {
        match self {
            MatchResult::Exact(name) | MatchResult::Prefix(name) => Some(name),
            _ => None,
        }
    }
}

/// Command definition
#[derive(Debug, Clone)]
pub struct CommandDef {
    /// Canonical command name
    pub name: String,
    /// Explicit aliases for this command
    pub aliases: Vec<String>,
}

impl CommandDef {
    pub fn new(name: impl Into<String>) -> Self {
        CommandDef {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// Add an explicit alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add multiple explicit aliases
    pub fn with_aliases<S: Into<String>>(mut self, aliases: impl IntoIterator<Item = S>) -> Self {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }
}

/// Command registry
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command
    #[must_use]
    pub fn register(mut self, cmd: CommandDef) -> Self {
        self.commands.push(cmd);
        self
    }

    /// Match an input string to a command
    ///
    /// Matching order:
    /// 1. Exact match against a command name or explicit alias
    /// 2. Single command whose name or alias starts with the input
    /// 3. Ambiguous if several commands match, unknown if none do
    pub fn match_command(&self, input: &str) -> MatchResult {
        let input = input.trim();
        if input.is_empty() {
            return MatchResult::Unknown(String::new());
        }

        for cmd in &self.commands {
            if cmd.name == input || cmd.aliases.iter().any(|a| a == input) {
                return MatchResult::Exact(cmd.name.clone());
            }
        }

        let mut matches: Vec<String> = Vec::new();
        for cmd in &self.commands {
            let hit = cmd.name.starts_with(input)
                || cmd.aliases.iter().any(|a| a.starts_with(input));
            if hit && !matches.contains(&cmd.name) {
                matches.push(cmd.name.clone());
            }
        }

        match matches.len() {
            0 => MatchResult::Unknown(input.to_string()),
            1 => MatchResult::Prefix(matches.remove(0)),
            _ => MatchResult::Ambiguous {
                prefix: input.to_string(),
                matches,
            },
        }
    }

    /// All registered command names
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }
}
