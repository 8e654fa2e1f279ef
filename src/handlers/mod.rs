//! Pluggable command handlers
//!
//! ## handlers/ Invariants
//!
//! - Handlers are looked up by (map mode, trigger keys), never by type.
//! - A handler declares the argument it needs; the dispatcher gathers it
//!   before the handler runs.
//! - Motions only compute targets. Moving the caret or building an
//!   operator range is the dispatcher's job.
//! - Operators receive a finished range and never look at the motion.

pub mod commands;
pub mod motions;
pub mod operators;
pub mod text_objects;

use crate::buffer::{BufferMut, TextRange};
use crate::constants::limits::MAX_COUNT;
use crate::error::Result;
use crate::key::{format_keys, parse_keys, KeyEvent};
use crate::keymap::{MapModes, MatchResult, TrieNode};
use crate::options::OptionScope;
use crate::search::SearchOptions;
use crate::session::Engine;
use crate::state::{EditorState, OperatorRange};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a handler needs after its trigger keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Argument {
    #[default]
    None,
    /// One more key, taken literally (`f{char}`, `m{char}`)
    Char,
}

/// How an operator treats the span between caret and motion target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Exclusive,
    Inclusive,
    Linewise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTarget {
    pub offset: usize,
    pub kind: MotionKind,
    /// Vertical motions keep the preferred column
    pub keep_column: bool,
}

impl MotionTarget {
    pub fn new(offset: usize, kind: MotionKind) -> Self {
        Self {
            offset,
            kind,
            keep_column: false,
        }
    }

    pub fn exclusive(offset: usize) -> Self {
        Self::new(offset, MotionKind::Exclusive)
    }

    pub fn inclusive(offset: usize) -> Self {
        Self::new(offset, MotionKind::Inclusive)
    }

    pub fn linewise(offset: usize) -> Self {
        Self::new(offset, MotionKind::Linewise)
    }

    pub fn vertical(offset: usize) -> Self {
        Self {
            keep_column: true,
            ..Self::linewise(offset)
        }
    }
}

/// Range selected by a text object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextObjectRange {
    pub range: TextRange,
    pub linewise: bool,
}

/// Operator typed but still waiting for its motion
#[derive(Clone)]
pub struct PendingOperator {
    pub name: String,
    pub trigger: Vec<KeyEvent>,
    pub handler: Arc<dyn OperatorHandler>,
    pub count: Option<usize>,
    pub register: Option<char>,
}

impl fmt::Debug for PendingOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperator")
            .field("name", &self.name)
            .field("trigger", &format_keys(&self.trigger))
            .field("count", &self.count)
            .field("register", &self.register)
            .finish()
    }
}

/// Everything a handler may read or change while it runs
pub struct HandlerContext<'a> {
    pub state: &'a mut EditorState,
    pub engine: &'a Engine,
    pub count: Option<usize>,
    pub register: Option<char>,
    /// Key gathered for [`Argument::Char`]
    pub arg: Option<KeyEvent>,
    /// Operator waiting for this motion or text object
    pub operator: Option<PendingOperator>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(state: &'a mut EditorState, engine: &'a Engine) -> Self {
        Self {
            state,
            engine,
            count: None,
            register: None,
            arg: None,
            operator: None,
        }
    }

    /// Count defaulting to 1
    pub fn count1(&self) -> usize {
        self.count.unwrap_or(1).clamp(1, MAX_COUNT)
    }

    pub fn arg_char(&self) -> Option<char> {
        self.arg.and_then(|k| k.literal())
    }

    pub fn operator_pending(&self) -> bool {
        self.operator.is_some()
    }

    pub fn scope(&self) -> OptionScope {
        OptionScope::Local(self.state.buffer_id())
    }

    pub fn option_flag(&self, name: &str) -> bool {
        self.engine.options.flag(self.scope(), name)
    }

    pub fn option_number(&self, name: &str) -> i64 {
        self.engine.options.number(self.scope(), name)
    }

    /// `selection=exclusive`
    pub fn exclusive_selection(&self) -> bool {
        self.engine
            .options
            .get_string(self.scope(), "selection")
            .is_ok_and(|s| s == "exclusive")
    }

    pub fn search_options(&self) -> SearchOptions {
        self.engine.search_options(self.scope())
    }

    pub fn buffer(&self) -> &(dyn BufferMut + Send) {
        self.state.buffer()
    }
}

pub trait MotionHandler: Send + Sync {
    fn argument(&self) -> Argument {
        Argument::None
    }

    /// Target of the motion from the caret. `None` means the motion failed
    /// and nothing should happen.
    fn target(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>>;

    /// Jumps record the `'` mark before moving
    fn is_jump(&self) -> bool {
        false
    }
}

pub trait TextObjectHandler: Send + Sync {
    fn select(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<TextObjectRange>>;
}

pub trait OperatorHandler: Send + Sync {
    fn apply(&self, ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()>;
}

pub trait CommandHandler: Send + Sync {
    fn argument(&self) -> Argument {
        Argument::None
    }

    fn execute(&self, ctx: &mut HandlerContext<'_>) -> Result<()>;
}

pub type MotionFn = fn(&mut HandlerContext<'_>) -> Result<Option<MotionTarget>>;
pub type TextObjectFn = fn(&mut HandlerContext<'_>) -> Result<Option<TextObjectRange>>;
pub type OperatorFn = fn(&mut HandlerContext<'_>, OperatorRange) -> Result<()>;
pub type CommandFn = fn(&mut HandlerContext<'_>) -> Result<()>;

/// Motion backed by a plain function
pub struct FnMotion {
    pub func: MotionFn,
    pub argument: Argument,
    pub jump: bool,
}

impl MotionHandler for FnMotion {
    fn argument(&self) -> Argument {
        self.argument
    }

    fn target(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<MotionTarget>> {
        (self.func)(ctx)
    }

    fn is_jump(&self) -> bool {
        self.jump
    }
}

pub struct FnTextObject(pub TextObjectFn);

impl TextObjectHandler for FnTextObject {
    fn select(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<TextObjectRange>> {
        (self.0)(ctx)
    }
}

pub struct FnOperator(pub OperatorFn);

impl OperatorHandler for FnOperator {
    fn apply(&self, ctx: &mut HandlerContext<'_>, range: OperatorRange) -> Result<()> {
        (self.0)(ctx, range)
    }
}

pub struct FnCommand {
    pub func: CommandFn,
    pub argument: Argument,
}

impl CommandHandler for FnCommand {
    fn argument(&self) -> Argument {
        self.argument
    }

    fn execute(&self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        (self.func)(ctx)
    }
}

#[derive(Clone)]
pub enum Handler {
    Motion(Arc<dyn MotionHandler>),
    TextObject(Arc<dyn TextObjectHandler>),
    Operator(Arc<dyn OperatorHandler>),
    Command(Arc<dyn CommandHandler>),
}

impl Handler {
    pub fn motion(func: MotionFn) -> Self {
        Handler::Motion(Arc::new(FnMotion {
            func,
            argument: Argument::None,
            jump: false,
        }))
    }

    pub fn motion_with_char(func: MotionFn) -> Self {
        Handler::Motion(Arc::new(FnMotion {
            func,
            argument: Argument::Char,
            jump: false,
        }))
    }

    pub fn jump(func: MotionFn, argument: Argument) -> Self {
        Handler::Motion(Arc::new(FnMotion {
            func,
            argument,
            jump: true,
        }))
    }

    pub fn text_object(func: TextObjectFn) -> Self {
        Handler::TextObject(Arc::new(FnTextObject(func)))
    }

    pub fn operator(func: OperatorFn) -> Self {
        Handler::Operator(Arc::new(FnOperator(func)))
    }

    pub fn command(func: CommandFn) -> Self {
        Handler::Command(Arc::new(FnCommand {
            func,
            argument: Argument::None,
        }))
    }

    pub fn command_with_char(func: CommandFn) -> Self {
        Handler::Command(Arc::new(FnCommand {
            func,
            argument: Argument::Char,
        }))
    }

    pub fn argument(&self) -> Argument {
        match self {
            Handler::Motion(h) => h.argument(),
            Handler::Command(h) => h.argument(),
            Handler::TextObject(_) | Handler::Operator(_) => Argument::None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Motion(_) => "motion",
            Handler::TextObject(_) => "text object",
            Handler::Operator(_) => "operator",
            Handler::Command(_) => "command",
        }
    }
}

/// A handler registered under a name and trigger
pub struct Binding {
    pub name: String,
    pub trigger: Vec<KeyEvent>,
    pub handler: Handler,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("trigger", &format_keys(&self.trigger))
            .field("kind", &self.handler.kind())
            .finish()
    }
}

/// Owned result of a trigger lookup
#[derive(Debug, Clone)]
pub enum Lookup {
    None,
    Prefix,
    Found(Arc<Binding>),
}

/// Handlers keyed by (map mode, trigger)
#[derive(Default)]
pub struct HandlerRegistry {
    tries: [TrieNode<Arc<Binding>>; 6],
    by_name: HashMap<String, Arc<Binding>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.by_name.len())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in motions, text objects, operators and
    /// commands
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        motions::register(&mut registry);
        text_objects::register(&mut registry);
        operators::register(&mut registry);
        commands::register(&mut registry);
        registry
    }

    /// Bind `handler` to `trigger` (key notation) in every mode of `modes`.
    /// The same name may be bound to several triggers.
    pub fn register(
        &mut self,
        modes: MapModes,
        trigger: &str,
        name: &str,
        handler: Handler,
    ) -> Arc<Binding> {
        let keys = parse_keys(trigger);
        let binding = Arc::new(Binding {
            name: name.to_string(),
            trigger: keys.clone(),
            handler,
        });
        for mode in modes.iter() {
            if let Some(trie) = self.trie_mut(mode) {
                trie.insert(&keys, Arc::clone(&binding));
            }
        }
        self.by_name
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&binding));
        binding
    }

    /// Register a handler reachable only by name (mapping targets)
    pub fn register_named(&mut self, name: &str, handler: Handler) -> Arc<Binding> {
        let binding = Arc::new(Binding {
            name: name.to_string(),
            trigger: Vec::new(),
            handler,
        });
        self.by_name.insert(name.to_string(), Arc::clone(&binding));
        binding
    }

    /// A bare prefix of longer triggers reports `Prefix`; a trigger that is
    /// also the prefix of another is treated as complete.
    pub fn lookup(&self, mode: MapModes, keys: &[KeyEvent]) -> Lookup {
        let Some(trie) = self.trie(mode) else {
            return Lookup::None;
        };
        match trie.lookup(keys) {
            MatchResult::None => Lookup::None,
            MatchResult::Prefix => Lookup::Prefix,
            MatchResult::Exact(binding) | MatchResult::Ambiguous(binding) => {
                Lookup::Found(Arc::clone(binding))
            }
        }
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<Binding>> {
        self.by_name.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn trie(&self, mode: MapModes) -> Option<&TrieNode<Arc<Binding>>> {
        mode.index().map(|i| &self.tries[i])
    }

    fn trie_mut(&mut self, mode: MapModes) -> Option<&mut TrieNode<Arc<Binding>>> {
        mode.index().map(|i| &mut self.tries[i])
    }
}
