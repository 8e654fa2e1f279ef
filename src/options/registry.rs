//! Option registry
//!
//! Holds the current value of every option. Global values live in one
//! table; buffer-local options keep per-buffer overrides that fall back to
//! the global value. Writes are validated before anything is stored, so a
//! failed assignment leaves the previous value in place.

use super::descriptor::{Locality, OptionDescriptor, OptionError, OptionType, OptionValue};
use crate::buffer::BufferId;
use crate::ex::registry::{CommandDef, CommandRegistry, MatchResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Which value an operation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionScope {
    Global,
    /// The value seen from one buffer
    Local(BufferId),
}

/// Notification sent to listeners after a value changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChange {
    pub name: &'static str,
    pub scope: OptionScope,
    pub old: OptionValue,
    pub new: OptionValue,
}

pub type OptionListener = Arc<dyn Fn(&OptionChange) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct Values {
    globals: HashMap<&'static str, OptionValue>,
    locals: HashMap<BufferId, HashMap<&'static str, OptionValue>>,
}

pub struct OptionRegistry {
    descriptors: &'static [OptionDescriptor],
    names: CommandRegistry,
    defaults: HashMap<&'static str, OptionValue>,
    values: RwLock<Values>,
    listeners: RwLock<Vec<(ListenerId, OptionListener)>>,
    next_listener: AtomicU64,
}

impl fmt::Debug for OptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionRegistry")
            .field("options", &self.descriptors.len())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl OptionRegistry {
    /// Create a registry over static descriptors with every value at its default
    pub fn new(descriptors: &'static [OptionDescriptor]) -> Self {
        let mut names = CommandRegistry::new();
        let mut defaults = HashMap::new();
        for desc in descriptors {
            names = names.register(CommandDef::new(desc.name).with_aliases(desc.aliases.iter().copied()));
            match parse_value(&desc.ty, desc.default) {
                Ok(value) => {
                    defaults.insert(desc.name, value);
                }
                Err(err) => {
                    tracing::error!(option = desc.name, %err, "invalid option default");
                }
            }
        }
        let registry = OptionRegistry {
            descriptors,
            names,
            defaults,
            values: RwLock::new(Values::default()),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        };
        registry.reset_all();
        registry
    }

    pub fn descriptors(&self) -> &'static [OptionDescriptor] {
        self.descriptors
    }

    /// Resolve a typed name (exact, alias or unambiguous prefix)
    pub fn resolve_name(&self, name: &str) -> Result<&'static str, OptionError> {
        match self.names.match_command(name) {
            MatchResult::Exact(found) | MatchResult::Prefix(found) => self
                .descriptors
                .iter()
                .find(|d| d.name == found)
                .map(|d| d.name)
                .ok_or(OptionError::UnknownOption(found)),
            MatchResult::Ambiguous { prefix, matches } => {
                Err(OptionError::Ambiguous { prefix, matches })
            }
            MatchResult::Unknown(_) => Err(OptionError::UnknownOption(name.to_string())),
        }
    }

    pub fn descriptor(&self, name: &str) -> Result<&'static OptionDescriptor, OptionError> {
        let canonical = self.resolve_name(name)?;
        self.descriptors
            .iter()
            .find(|d| d.name == canonical)
            .ok_or_else(|| OptionError::UnknownOption(name.to_string()))
    }

    pub fn get(&self, scope: OptionScope, name: &str) -> Result<OptionValue, OptionError> {
        let desc = self.descriptor(name)?;
        Ok(self.read(scope, desc))
    }

    pub fn get_bool(&self, scope: OptionScope, name: &str) -> Result<bool, OptionError> {
        let value = self.get(scope, name)?;
        value
            .as_bool()
            .ok_or(OptionError::InvalidArgument(name.to_string()))
    }

    pub fn get_number(&self, scope: OptionScope, name: &str) -> Result<i64, OptionError> {
        let value = self.get(scope, name)?;
        value
            .as_number()
            .ok_or(OptionError::InvalidArgument(name.to_string()))
    }

    pub fn get_string(&self, scope: OptionScope, name: &str) -> Result<String, OptionError> {
        match self.get(scope, name)? {
            OptionValue::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    pub fn get_list(&self, scope: OptionScope, name: &str) -> Result<Vec<String>, OptionError> {
        match self.get(scope, name)? {
            OptionValue::List(items) => Ok(items),
            _ => Err(OptionError::InvalidArgument(name.to_string())),
        }
    }

    /// Boolean flag for engine-internal reads of known options
    pub fn flag(&self, scope: OptionScope, name: &str) -> bool {
        self.get_bool(scope, name).unwrap_or(false)
    }

    /// Number for engine-internal reads of known options
    pub fn number(&self, scope: OptionScope, name: &str) -> i64 {
        self.get_number(scope, name).unwrap_or(0)
    }

    /// Whether a list option contains `item`
    pub fn list_contains(&self, scope: OptionScope, name: &str, item: &str) -> bool {
        self.get_list(scope, name)
            .map(|items| items.iter().any(|i| i == item))
            .unwrap_or(false)
    }

    /// Assign a typed value. Validation failures leave the option untouched.
    pub fn set(
        &self,
        scope: OptionScope,
        name: &str,
        value: OptionValue,
    ) -> Result<(), OptionError> {
        let desc = self.descriptor(name)?;
        let value = validate(desc, value)?;
        self.write(scope, desc, value);
        Ok(())
    }

    /// Parse `value` according to the option type, then assign it
    pub fn set_from_str(&self, scope: OptionScope, name: &str, value: &str) -> Result<(), OptionError> {
        let desc = self.descriptor(name)?;
        let parsed = parse_value(&desc.ty, value)?;
        let parsed = validate(desc, parsed)?;
        self.write(scope, desc, parsed);
        Ok(())
    }

    /// Restore the default value
    pub fn reset(&self, scope: OptionScope, name: &str) -> Result<(), OptionError> {
        let desc = self.descriptor(name)?;
        let default = self.default_of(desc);
        self.write(scope, desc, default);
        Ok(())
    }

    /// `+=`: add a number, append to a string, append list items
    pub fn append(&self, scope: OptionScope, name: &str, value: &str) -> Result<(), OptionError> {
        self.modify(scope, name, value, |desc, current, arg| match (current, desc.ty) {
            (OptionValue::Number(n), _) => n
                .checked_add(parse_number(arg)?)
                .map(OptionValue::Number)
                .ok_or_else(|| out_of_range(desc, "+=", arg)),
            (OptionValue::String(s), _) => Ok(OptionValue::String(s + arg)),
            (OptionValue::List(mut items), OptionType::List { dedup, .. }) => {
                for item in split_list(arg) {
                    if !(dedup && items.contains(&item)) {
                        items.push(item);
                    }
                }
                Ok(OptionValue::List(items))
            }
            (other, _) => Err(OptionError::InvalidArgument(format!("{}+={arg}", other))),
        })
    }

    /// `^=`: multiply a number, prepend to a string, prepend list items
    pub fn prepend(&self, scope: OptionScope, name: &str, value: &str) -> Result<(), OptionError> {
        self.modify(scope, name, value, |desc, current, arg| match (current, desc.ty) {
            (OptionValue::Number(n), _) => n
                .checked_mul(parse_number(arg)?)
                .map(OptionValue::Number)
                .ok_or_else(|| out_of_range(desc, "^=", arg)),
            (OptionValue::String(s), _) => Ok(OptionValue::String(format!("{arg}{s}"))),
            (OptionValue::List(items), OptionType::List { dedup, .. }) => {
                let mut out = split_list(arg);
                for item in items {
                    if !(dedup && out.contains(&item)) {
                        out.push(item);
                    }
                }
                Ok(OptionValue::List(out))
            }
            (other, _) => Err(OptionError::InvalidArgument(format!("{}^={arg}", other))),
        })
    }

    /// `-=`: subtract a number, remove a substring, remove list items
    pub fn remove(&self, scope: OptionScope, name: &str, value: &str) -> Result<(), OptionError> {
        self.modify(scope, name, value, |desc, current, arg| match current {
            OptionValue::Number(n) => n
                .checked_sub(parse_number(arg)?)
                .map(OptionValue::Number)
                .ok_or_else(|| out_of_range(desc, "-=", arg)),
            OptionValue::String(s) => Ok(OptionValue::String(s.replacen(arg, "", 1))),
            OptionValue::List(mut items) => {
                for item in split_list(arg) {
                    items.retain(|i| *i != item);
                }
                Ok(OptionValue::List(items))
            }
            other => Err(OptionError::InvalidArgument(format!("{other}-={arg}"))),
        })
    }

    /// Invert a boolean option
    pub fn toggle(&self, scope: OptionScope, name: &str) -> Result<bool, OptionError> {
        let desc = self.descriptor(name)?;
        let (flag, change) = {
            let mut values = self.values.write();
            match self.lookup(&values, scope, desc) {
                OptionValue::Bool(b) => (!b, self.store(&mut values, scope, desc, OptionValue::Bool(!b))),
                _ => return Err(OptionError::InvalidArgument(format!("inv{}", desc.name))),
            }
        };
        if let Some(change) = change {
            self.notify(&change);
        }
        Ok(flag)
    }

    pub fn is_default(&self, scope: OptionScope, name: &str) -> Result<bool, OptionError> {
        let desc = self.descriptor(name)?;
        Ok(self.read(scope, desc) == self.default_of(desc))
    }

    /// Options whose value differs from the default, for `:set` listings
    pub fn changed(&self, scope: OptionScope) -> Vec<(&'static str, OptionValue)> {
        self.descriptors
            .iter()
            .map(|desc| (desc.name, self.read(scope, desc)))
            .filter(|(name, value)| self.defaults.get(name) != Some(value))
            .collect()
    }

    pub fn subscribe(&self, listener: OptionListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Restore every option to its default and forget buffer overrides
    pub fn reset_all(&self) {
        let mut values = self.values.write();
        values.locals.clear();
        values.globals = self.defaults.clone();
    }

    /// Forget local values of a closed buffer
    pub fn drop_buffer(&self, buffer: BufferId) {
        self.values.write().locals.remove(&buffer);
    }

    fn default_of(&self, desc: &OptionDescriptor) -> OptionValue {
        self.defaults
            .get(desc.name)
            .cloned()
            .unwrap_or_else(|| zero_value(&desc.ty))
    }

    fn read(&self, scope: OptionScope, desc: &OptionDescriptor) -> OptionValue {
        self.lookup(&self.values.read(), scope, desc)
    }

    fn lookup(&self, values: &Values, scope: OptionScope, desc: &OptionDescriptor) -> OptionValue {
        if let (OptionScope::Local(buffer), Locality::Buffer) = (scope, desc.locality) {
            if let Some(value) = values.locals.get(&buffer).and_then(|m| m.get(desc.name)) {
                return value.clone();
            }
        }
        values
            .globals
            .get(desc.name)
            .cloned()
            .unwrap_or_else(|| self.default_of(desc))
    }

    /// Listeners run after the lock is released
    fn write(&self, scope: OptionScope, desc: &'static OptionDescriptor, value: OptionValue) {
        let change = self.store(&mut self.values.write(), scope, desc, value);
        if let Some(change) = change {
            self.notify(&change);
        }
    }

    fn store(
        &self,
        values: &mut Values,
        scope: OptionScope,
        desc: &'static OptionDescriptor,
        value: OptionValue,
    ) -> Option<OptionChange> {
        let effective_scope = match (scope, desc.locality) {
            (OptionScope::Local(buffer), Locality::Buffer) => OptionScope::Local(buffer),
            _ => OptionScope::Global,
        };
        let slot = match effective_scope {
            OptionScope::Local(buffer) => values
                .locals
                .entry(buffer)
                .or_default()
                .insert(desc.name, value.clone()),
            OptionScope::Global => values.globals.insert(desc.name, value.clone()),
        };
        let old = slot.unwrap_or_else(|| self.default_of(desc));
        tracing::debug!(option = desc.name, scope = ?effective_scope, %value, "set option");
        (old != value).then(|| OptionChange {
            name: desc.name,
            scope: effective_scope,
            old,
            new: value,
        })
    }

    fn notify(&self, change: &OptionChange) {
        let listeners: Vec<OptionListener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }

    fn modify<F>(&self, scope: OptionScope, name: &str, arg: &str, op: F) -> Result<(), OptionError>
    where
        F: FnOnce(&OptionDescriptor, OptionValue, &str) -> Result<OptionValue, OptionError>,
    {
        let desc = self.descriptor(name)?;
        let change = {
            let mut values = self.values.write();
            let current = self.lookup(&values, scope, desc);
            let next = validate(desc, op(desc, current, arg)?)?;
            self.store(&mut values, scope, desc, next)
        };
        if let Some(change) = change {
            self.notify(&change);
        }
        Ok(())
    }
}

fn zero_value(ty: &OptionType) -> OptionValue {
    match ty {
        OptionType::Boolean => OptionValue::Bool(false),
        OptionType::Number { .. } => OptionValue::Number(0),
        OptionType::String { .. } => OptionValue::String(String::new()),
        OptionType::List { .. } => OptionValue::List(Vec::new()),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn out_of_range(desc: &OptionDescriptor, op: &str, arg: &str) -> OptionError {
    OptionError::InvalidValue(format!("{}{op}{arg}", desc.name))
}

fn parse_number(value: &str) -> Result<i64, OptionError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| OptionError::InvalidArgument(value.to_string()))
}

/// Parse a string value according to `ty`
pub(crate) fn parse_value(ty: &OptionType, value: &str) -> Result<OptionValue, OptionError> {
    match ty {
        OptionType::Boolean => match value.to_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Ok(OptionValue::Bool(true)),
            "false" | "0" | "off" | "no" => Ok(OptionValue::Bool(false)),
            _ => Err(OptionError::InvalidArgument(value.to_string())),
        },
        OptionType::Number { .. } => parse_number(value).map(OptionValue::Number),
        OptionType::String { .. } => Ok(OptionValue::String(value.to_string())),
        OptionType::List { dedup, .. } => {
            let mut items = split_list(value);
            if *dedup {
                let mut seen: Vec<String> = Vec::with_capacity(items.len());
                items.retain(|item| {
                    if seen.contains(item) {
                        false
                    } else {
                        seen.push(item.clone());
                        true
                    }
                });
            }
            Ok(OptionValue::List(items))
        }
    }
}

/// Check a typed value against the descriptor
fn validate(desc: &OptionDescriptor, value: OptionValue) -> Result<OptionValue, OptionError> {
    if !desc.ty.accepts(&value) {
        return Err(OptionError::InvalidArgument(format!(
            "{}: expected {}, got {}",
            desc.name,
            desc.ty.name(),
            value.type_name()
        )));
    }
    match (&desc.ty, &value) {
        (OptionType::Number { min, max }, OptionValue::Number(n)) => {
            if min.is_some_and(|m| *n < m) || max.is_some_and(|m| *n > m) {
                return Err(OptionError::InvalidValue(format!("{}={n}", desc.name)));
            }
        }
        (OptionType::String { allowed: Some(allowed) }, OptionValue::String(s)) => {
            if !allowed.contains(&s.as_str()) {
                return Err(OptionError::InvalidValue(format!("{}={s}", desc.name)));
            }
        }
        (OptionType::List { allowed: Some(allowed), .. }, OptionValue::List(items)) => {
            if let Some(bad) = items.iter().find(|i| !allowed.contains(&i.as_str())) {
                return Err(OptionError::InvalidValue(format!("{}={bad}", desc.name)));
            }
        }
        _ => {}
    }
    if let Some(check) = desc.validate {
        check(&value)?;
    }
    Ok(value)
}
