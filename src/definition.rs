/*!
The parts a command is defined from: positional arguments, flags, key-value
options and guards.

Definitions are built once, when the command is defined, and are immutable
afterwards. A single definition is shared by every invocation of its command,
so everything attached to it (parsers, conditions, transformers, rules) must
be `Send + Sync` and must behave as a pure function of its inputs.
*/

use std::{fmt, sync::Arc};

use crate::{
    context::ContextView,
    invoker::Invoker,
    rules::Rules,
    value::{Value, ValueParser},
};

/// The set of tags that identify a particular flag (`-short`, `--long`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tags<'a> {
    /// This flag uses only a long tag
    Long { long: &'a str },

    /// This flag uses only a short tag
    Short { short: char },

    /// This flag uses both a long and short tag
    LongShort { long: &'a str, short: char },
}

impl fmt::Display for Tags<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Tags::Long { long } => write!(f, "--{long}"),
            Tags::Short { short } => write!(f, "-{short}"),
            Tags::LongShort { long, short } => write!(f, "-{short}, --{long}"),
        }
    }
}

pub(crate) type Condition = Arc<dyn Fn(&ContextView<'_>) -> bool + Send + Sync>;
pub(crate) type Transformer = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/**
A positional argument.

Arguments are required unless marked [`optional`][Self::optional] (or given a
[`default`][Self::default]). Within a command, no required argument may
follow an optional one, and at most one argument may be
[`greedy`][Self::greedy]: it must be the last argument and must use a textual
parser.
*/
#[derive(Clone)]
pub struct ArgumentSpec {
    pub(crate) name: String,
    pub(crate) optional: bool,
    pub(crate) greedy: bool,
    pub(crate) parser: Arc<dyn ValueParser>,
    pub(crate) aliases: Vec<String>,
    pub(crate) permission: Option<String>,
    pub(crate) condition: Option<Condition>,
    pub(crate) transform: Option<Transformer>,
    pub(crate) rules: Rules,
    pub(crate) default: Option<Value>,
    pub(crate) completions: Option<Vec<String>>,
    pub(crate) description: Option<String>,
}

impl ArgumentSpec {
    /// A new required argument
    pub fn new(name: impl Into<String>, parser: impl ValueParser + 'static) -> Self {
        Self {
            name: name.into(),
            optional: false,
            greedy: false,
            parser: Arc::new(parser),
            aliases: Vec::new(),
            permission: None,
            condition: None,
            transform: None,
            rules: Rules::default(),
            default: None,
            completions: None,
            description: None,
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Capture every remaining token, joined with single spaces, when this is
    /// the last argument to be parsed.
    #[must_use]
    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /**
    Require a permission to use this argument. A required argument that the
    invoker lacks the permission for fails the whole parse; an optional one
    is silently skipped, without consuming a token.
    */
    #[must_use]
    pub fn permission(mut self, node: impl Into<String>) -> Self {
        self.permission = Some(node.into());
        self
    }

    /// Only parse this argument when `condition` holds for the values parsed
    /// before it. Skipped arguments never consume a token and are never
    /// present in the result.
    #[must_use]
    pub fn condition(
        mut self,
        condition: impl Fn(&ContextView<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Transform the parsed (and sanitized) value before it's validated. An
    /// `Err` from the transformer is reported as an internal error.
    #[must_use]
    pub fn transform(
        mut self,
        transform: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    #[must_use]
    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// A value to use when this argument is absent. Implies `optional`.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.optional = true;
        self
    }

    /// Words to suggest ("did you mean ...?") when this argument fails to
    /// parse.
    #[must_use]
    pub fn completions<I>(mut self, completions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.completions = Some(completions.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    #[must_use]
    pub fn parser(&self) -> &dyn ValueParser {
        &*self.parser
    }

    /// Would this argument be skipped by its condition, given these values?
    pub(crate) fn skipped_by_condition(&self, view: &ContextView<'_>) -> bool {
        self.condition
            .as_ref()
            .is_some_and(|condition| !condition(view))
    }

    /// Does the invoker lack this argument's permission?
    pub(crate) fn lacks_permission(&self, invoker: &dyn Invoker) -> bool {
        self.permission
            .as_deref()
            .is_some_and(|node| !invoker.has_permission(node))
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("greedy", &self.greedy)
            .field("parser", &self.parser)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .field("rules", &self.rules)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// A boolean flag, like `-s` or `--silent`. Absent flags are `false`;
/// `--no-silent` explicitly sets a flag to `false`.
#[derive(Debug, Clone)]
pub struct Flag {
    pub(crate) name: String,
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) permission: Option<String>,
    pub(crate) description: Option<String>,
}

impl Flag {
    /// A flag with a long tag that's the same as its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();

        Self {
            long: Some(name.clone()),
            name,
            short: None,
            permission: None,
            description: None,
        }
    }

    #[must_use]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    #[must_use]
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    /// Remove the long tag, leaving only the short one
    #[must_use]
    pub fn short_only(mut self, short: char) -> Self {
        self.short = Some(short);
        self.long = None;
        self
    }

    #[must_use]
    pub fn permission(mut self, node: impl Into<String>) -> Self {
        self.permission = Some(node.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tags of this flag. `None` for a flag with neither tag, which
    /// [`build`][crate::CommandBuilder::build] rejects.
    #[must_use]
    pub fn tags(&self) -> Option<Tags<'_>> {
        match (self.long.as_deref(), self.short) {
            (Some(long), Some(short)) => Some(Tags::LongShort { long, short }),
            (Some(long), None) => Some(Tags::Long { long }),
            (None, Some(short)) => Some(Tags::Short { short }),
            (None, None) => None,
        }
    }
}

/**
A key-value option, given as `key=value`, `key:value`, `--key value` or
`--key=value`. An unquoted value containing commas is a list, stored
separately as a multi-value.
*/
#[derive(Clone)]
pub struct KeyValueSpec {
    pub(crate) name: String,
    pub(crate) key: String,
    pub(crate) parser: Arc<dyn ValueParser>,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
    pub(crate) permission: Option<String>,
    pub(crate) description: Option<String>,
}

impl KeyValueSpec {
    /// A new required key-value, whose key is its name
    pub fn new(name: impl Into<String>, parser: impl ValueParser + 'static) -> Self {
        let name = name.into();

        Self {
            key: name.clone(),
            name,
            parser: Arc::new(parser),
            optional: false,
            default: None,
            permission: None,
            description: None,
        }
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// A value to use when this key is absent. Implies `optional`.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.optional = true;
        self
    }

    #[must_use]
    pub fn permission(mut self, node: impl Into<String>) -> Self {
        self.permission = Some(node.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn key_token(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for KeyValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueSpec")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("parser", &self.parser)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

type GuardCheck = Arc<dyn Fn(&dyn Invoker) -> bool + Send + Sync>;

/// A check on the invoker that runs before any token is looked at, such as
/// "must be in a world" or "must not be frozen".
#[derive(Clone)]
pub struct Guard {
    pub(crate) message: String,
    pub(crate) check: GuardCheck,
}

impl Guard {
    pub fn new(
        message: impl Into<String>,
        check: impl Fn(&dyn Invoker) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            check: Arc::new(check),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
