use std::collections::HashMap;

use crate::value::{FromValue, Value};

/**
A read-only view of everything parsed so far.

Conditions see a view of the arguments parsed *before* the one they guard,
along with every flag and key-value (those are extracted before any
positional argument is parsed). Cross-argument validators see a view of the
complete set of values.
*/
#[derive(Debug, Clone, Copy)]
pub struct ContextView<'a> {
    values: &'a HashMap<String, Value>,
    flags: &'a HashMap<String, bool>,
    key_values: &'a HashMap<String, Value>,
    multi_values: &'a HashMap<String, Vec<Value>>,
}

impl<'a> ContextView<'a> {
    pub(crate) fn new(
        values: &'a HashMap<String, Value>,
        flags: &'a HashMap<String, bool>,
        key_values: &'a HashMap<String, Value>,
        multi_values: &'a HashMap<String, Vec<Value>>,
    ) -> Self {
        Self {
            values,
            flags,
            key_values,
            multi_values,
        }
    }

    /// Get a positional value, if it was parsed and is of the requested type
    #[must_use]
    pub fn get<T: FromValue<'a>>(&self, name: &str) -> Option<T> {
        self.values.get(name).and_then(T::from_value)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The value of a flag. Absent and undeclared flags are `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn key_value<T: FromValue<'a>>(&self, name: &str) -> Option<T> {
        self.key_values.get(name).and_then(T::from_value)
    }

    #[must_use]
    pub fn multi_value(&self, name: &str) -> &'a [Value] {
        self.multi_values.get(name).map_or(&[], Vec::as_slice)
    }
}

/**
The result of a successful parse.

A [`CommandContext`] is created once, when parsing succeeds, and never
changes afterwards. Everything in it is owned, so it can be freely sent to
(or shared with) whatever thread ends up executing the command.

Positional values can be looked up by an argument's name or by any of its
aliases.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct CommandContext {
    pub(crate) label: String,
    pub(crate) path: Vec<String>,
    pub(crate) values: HashMap<String, Value>,
    pub(crate) flags: HashMap<String, bool>,
    pub(crate) key_values: HashMap<String, Value>,
    pub(crate) multi_values: HashMap<String, Vec<Value>>,
    pub(crate) raw: Vec<String>,
    pub(crate) aliases: HashMap<String, String>,
}

impl CommandContext {
    /// The label the command was invoked with. This might be an alias of the
    /// command's name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The names of the command and every subcommand that was routed
    /// through, starting with the root.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The raw tokens the command was invoked with, before routing,
    /// tokenization or extraction.
    #[must_use]
    pub fn raw_tokens(&self) -> &[String] {
        &self.raw
    }

    /// Resolve an argument alias to the argument's name. Names resolve to
    /// themselves.
    #[must_use]
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(self.resolve(name))
    }

    /// Get a positional value of a particular type, by name or alias
    #[must_use]
    pub fn get<'a, T: FromValue<'a>>(&'a self, name: &str) -> Option<T> {
        self.value(name).and_then(T::from_value)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// The value of a flag. Absent and undeclared flags are `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn key_value<'a, T: FromValue<'a>>(&'a self, name: &str) -> Option<T> {
        self.key_values.get(name).and_then(T::from_value)
    }

    /// The list given for a key as comma separated values. Empty if the key
    /// wasn't given as a list.
    #[must_use]
    pub fn multi_value(&self, name: &str) -> &[Value] {
        self.multi_values.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    #[must_use]
    pub fn flags(&self) -> &HashMap<String, bool> {
        &self.flags
    }

    #[must_use]
    pub fn key_values(&self) -> &HashMap<String, Value> {
        &self.key_values
    }

    #[must_use]
    pub fn multi_values(&self) -> &HashMap<String, Vec<Value>> {
        &self.multi_values
    }

    /// A [`ContextView`] over the finished context, the same kind of view
    /// that conditions and cross validators receive.
    #[must_use]
    pub fn view(&self) -> ContextView<'_> {
        ContextView::new(
            &self.values,
            &self.flags,
            &self.key_values,
            &self.multi_values,
        )
    }
}
