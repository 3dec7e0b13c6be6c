/*!
Flag and key-value extraction.

The extractor makes one pass over the tokens, pulling out every flag and
key-value it recognizes and leaving everything else, in its original order,
for the positional argument pipeline. Recognition uses an [`OptionTable`]
built once when the command is defined.
*/

use std::collections::HashMap;

use rostrum_parser::{Form, Token, classify, strip_inline_quotes};
use tracing::trace;

use crate::{
    definition::{Flag, KeyValueSpec},
    errors::{CommandParseError, DefinitionError},
    invoker::Invoker,
    value::{Value, run_parser},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Flag(usize),
    Key(usize),
}

/// Lookup table from tags and keys to the flags and key-values of a command
#[derive(Debug, Clone, Default)]
pub(crate) struct OptionTable {
    shorts: HashMap<char, usize>,
    longs: HashMap<String, Target>,
    keys: HashMap<String, usize>,
}

impl OptionTable {
    pub(crate) fn build(
        command: &str,
        flags: &[Flag],
        key_values: &[KeyValueSpec],
    ) -> Result<Self, DefinitionError> {
        let mut table = Self::default();
        let mut names: HashMap<&str, ()> = HashMap::new();

        let duplicate_tag = |tag: String| DefinitionError::DuplicateTag {
            command: command.to_owned(),
            tag,
        };

        let duplicate_name = |name: &str| DefinitionError::DuplicateOption {
            command: command.to_owned(),
            name: name.to_owned(),
        };

        for (index, flag) in flags.iter().enumerate() {
            if names.insert(&flag.name, ()).is_some() {
                return Err(duplicate_name(&flag.name));
            }

            if flag.tags().is_none() {
                return Err(DefinitionError::UntaggedFlag {
                    command: command.to_owned(),
                    name: flag.name.clone(),
                });
            }

            if let Some(short) = flag.short {
                if table.shorts.insert(short, index).is_some() {
                    return Err(duplicate_tag(format!("-{short}")));
                }
            }

            if let Some(ref long) = flag.long {
                if table
                    .longs
                    .insert(long.clone(), Target::Flag(index))
                    .is_some()
                {
                    return Err(duplicate_tag(format!("--{long}")));
                }
            }
        }

        for (index, key_value) in key_values.iter().enumerate() {
            if names.insert(&key_value.name, ()).is_some() {
                return Err(duplicate_name(&key_value.name));
            }

            if table
                .longs
                .insert(key_value.key.clone(), Target::Key(index))
                .is_some()
            {
                return Err(duplicate_tag(format!("--{}", key_value.key)));
            }

            table.keys.insert(key_value.key.clone(), index);
        }

        Ok(table)
    }
}

/// Everything the extractor found, plus the leftover positional tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Extracted {
    pub flags: HashMap<String, bool>,
    pub key_values: HashMap<String, Value>,
    pub multi_values: HashMap<String, Vec<Value>>,
    pub positionals: Vec<Token>,
}

struct Extractor<'c> {
    flags: &'c [Flag],
    key_values: &'c [KeyValueSpec],
    invoker: &'c dyn Invoker,

    flag_values: Vec<Option<bool>>,
    keys_seen: Vec<bool>,
    denied: Vec<bool>,
    extracted: Extracted,
    errors: Vec<CommandParseError>,
}

impl<'c> Extractor<'c> {
    fn permitted(&mut self, permission: Option<&str>, name: &str, denied: usize) -> bool {
        match permission {
            Some(node) if !self.invoker.has_permission(node) => {
                // Only report each denied option once
                if !self.denied[denied] {
                    self.denied[denied] = true;
                    self.errors.push(CommandParseError::ArgumentPermission {
                        argument: name.to_owned(),
                        permission: node.to_owned(),
                    });
                }
                false
            }
            _ => true,
        }
    }

    fn set_flag(&mut self, index: usize, value: bool) {
        let flag = &self.flags[index];

        if !self.permitted(flag.permission.as_deref(), &flag.name, index) {
            return;
        }

        match self.flag_values[index] {
            Some(previous) if previous != value => {
                self.errors.push(CommandParseError::usage_for(
                    &flag.name,
                    format_args!("flag <{}> was both set and unset", flag.name),
                ));
            }
            _ => {
                trace!(flag = %flag.name, value, "extracted flag");
                self.flag_values[index] = Some(value);
            }
        }
    }

    /// `literal` values are never split on commas
    fn set_key(&mut self, index: usize, raw: &str, literal: bool) {
        let spec = &self.key_values[index];

        if !self.permitted(
            spec.permission.as_deref(),
            &spec.name,
            self.flags.len() + index,
        ) {
            return;
        }

        if self.keys_seen[index] {
            self.errors.push(CommandParseError::usage_for(
                &spec.name,
                format_args!("option {} was given more than once", spec.key),
            ));
            return;
        }
        self.keys_seen[index] = true;

        if !literal && memchr::memchr(b',', raw.as_bytes()).is_some() {
            let mut values = Vec::new();

            for piece in raw.split(',') {
                match run_parser(&*spec.parser, &spec.name, piece) {
                    Ok(value) => values.push(value),
                    Err(error) => self.errors.push(error),
                }
            }

            trace!(key = %spec.key, count = values.len(), "extracted multi-value");
            self.extracted.multi_values.insert(spec.name.clone(), values);
        } else {
            match run_parser(&*spec.parser, &spec.name, raw) {
                Ok(value) => {
                    trace!(key = %spec.key, %value, "extracted key-value");
                    self.extracted.key_values.insert(spec.name.clone(), value);
                }
                Err(error) => self.errors.push(error),
            }
        }
    }

    /// Set a key from a value that was part of the same token as the key,
    /// like `key="a,b"`. Values wrapped entirely in quotes are literal.
    fn set_key_inline(&mut self, index: usize, raw: &str) {
        match strip_inline_quotes(raw) {
            Some(unquoted) => self.set_key(index, &unquoted, true),
            None => self.set_key(index, raw, false),
        }
    }

    fn missing_value(&mut self, index: usize) {
        let spec = &self.key_values[index];

        self.errors.push(CommandParseError::usage_for(
            &spec.name,
            format_args!("option --{} needs a value", spec.key),
        ));
    }

    fn finish(mut self) -> (Extracted, Vec<CommandParseError>) {
        for (index, spec) in self.key_values.iter().enumerate() {
            if self.keys_seen[index] {
                continue;
            }

            match spec.default {
                Some(ref default) => {
                    self.extracted
                        .key_values
                        .insert(spec.name.clone(), default.clone());
                }
                None if !spec.optional && !self.denied[self.flags.len() + index] => {
                    self.errors.push(CommandParseError::usage_for(
                        &spec.name,
                        format_args!("missing required option {}=<{}>", spec.key, spec.name),
                    ));
                }
                None => {}
            }
        }

        self.extracted.flags = self
            .flags
            .iter()
            .zip(&self.flag_values)
            .map(|(flag, value)| (flag.name.clone(), value.unwrap_or(false)))
            .collect();

        (self.extracted, self.errors)
    }
}

/**
Pull every recognized flag and key-value out of `tokens`.

Every error found is returned alongside whatever could be extracted, in the
order it was found; callers that stop at the first error just keep the first
one. Tokens that look like options but
don't match anything declared are left as positionals, so commands that
declare no options see their tokens untouched.
*/
pub(crate) fn extract(
    table: &OptionTable,
    flags: &[Flag],
    key_values: &[KeyValueSpec],
    tokens: Vec<Token>,
    invoker: &dyn Invoker,
) -> (Extracted, Vec<CommandParseError>) {
    let mut extractor = Extractor {
        flags,
        key_values,
        invoker,
        flag_values: vec![None; flags.len()],
        keys_seen: vec![false; key_values.len()],
        denied: vec![false; flags.len() + key_values.len()],
        extracted: Extracted::default(),
        errors: Vec::new(),
    };

    let mut positionals = Vec::with_capacity(tokens.len());
    let mut positional_only = false;
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        if positional_only || token.quoted {
            positionals.push(token);
            continue;
        }

        let form = classify(&token.text);

        let positional = match form {
            Form::Separator => {
                positional_only = true;
                false
            }
            Form::Long { name } => match table.longs.get(name) {
                Some(&Target::Flag(index)) => {
                    extractor.set_flag(index, true);
                    false
                }
                Some(&Target::Key(index)) => {
                    match tokens.next() {
                        Some(value) if !value.quoted && value.text == "--" => {
                            positional_only = true;
                            extractor.missing_value(index);
                        }
                        Some(value) => extractor.set_key(index, &value.text, value.quoted),
                        None => extractor.missing_value(index),
                    }
                    false
                }
                None => match form.negated().and_then(|name| table.longs.get(name)) {
                    Some(&Target::Flag(index)) => {
                        extractor.set_flag(index, false);
                        false
                    }
                    _ => true,
                },
            },
            Form::LongValue { name, value } => match table.longs.get(name) {
                Some(&Target::Key(index)) => {
                    extractor.set_key_inline(index, value);
                    false
                }
                Some(&Target::Flag(index)) => {
                    let flag = &flags[index];
                    extractor.errors.push(CommandParseError::usage_for(
                        &flag.name,
                        format_args!("flag --{name} doesn't take a value"),
                    ));
                    false
                }
                None => true,
            },
            Form::Shorts(cluster) => {
                let indexes: Option<Vec<usize>> = cluster
                    .chars()
                    .map(|short| table.shorts.get(&short).copied())
                    .collect();

                match indexes {
                    Some(indexes) => {
                        indexes
                            .into_iter()
                            .for_each(|index| extractor.set_flag(index, true));
                        false
                    }
                    None => true,
                }
            }
            Form::Pair { key, value } => match table.keys.get(key) {
                Some(&index) => {
                    extractor.set_key_inline(index, value);
                    false
                }
                None => true,
            },
            Form::Positional(_) => true,
        };

        if positional {
            positionals.push(token);
        }
    }

    let (mut extracted, errors) = extractor.finish();
    extracted.positionals = positionals;
    (extracted, errors)
}
