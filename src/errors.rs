/*!
Error types for [`rostrum`][crate].

There are two channels. Everything that can go wrong because of what a user
typed is a [`CommandParseError`], returned in a [`ParseErrors`] list and never
raised. Mistakes in a command's *definition* (a greedy argument that isn't
last, two flags sharing a short tag, and so on) are [`DefinitionError`]s,
reported once by [`CommandBuilder::build`][crate::CommandBuilder::build].
 */

use std::{fmt, time::Duration};

use joinery::JoinableIterator;
use lazy_format::lazy_format;

use crate::invoker::SenderKind;

/// Which cooldown timer rejected an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownScope {
    /// The timer for this particular invoker
    Invoker,

    /// The timer shared by everyone using the command
    Global,
}

/// The data-free tag of a [`CommandParseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Permission,
    SenderKind,
    GuardFailed,
    Usage,
    Parsing,
    Validation,
    CrossValidation,
    ArgumentPermission,
    Internal,
    Cooldown,
    ConfirmationRequired,
    SubcommandNotFound,
}

/**
Something the user typed (or who the user is) prevented a command from being
parsed.

Cooldown and confirmation errors are deliberately distinct from the rest, so
hosts can treat them differently: they're a "try again later" or "say it
again" rather than a rejection. See [`CommandParseError::is_retryable`].
*/
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum CommandParseError {
    /// The invoker lacks the command's permission
    #[error("you don't have permission to use this command")]
    Permission { permission: String },

    /// The command only accepts a particular kind of sender
    #[error("this command can only be used by {expected}")]
    SenderKind {
        expected: SenderKind,
        actual: SenderKind,
    },

    /// One of the command's guards rejected the invoker
    #[error("{message}")]
    GuardFailed { message: String },

    /// The shape of the command line was wrong: missing or extra arguments,
    /// malformed options, unclosed quotes.
    #[error("{message}")]
    Usage {
        message: String,
        argument: Option<String>,
    },

    /// A value parser rejected a token
    #[error("invalid {type_name} for <{argument}>: {message}")]
    Parsing {
        argument: String,
        type_name: String,
        input: String,
        message: String,
        suggestions: Vec<String>,
    },

    /// A value parsed, but failed one of its argument's rules
    #[error("<{argument}>: {message}")]
    Validation {
        argument: String,
        input: String,
        message: String,
    },

    /// The values parsed, but a cross-argument validator rejected them
    #[error("{message}")]
    CrossValidation { message: String },

    /// The invoker lacks the permission to use a required argument, flag or
    /// option
    #[error("you don't have permission to use <{argument}>")]
    ArgumentPermission {
        argument: String,
        permission: String,
    },

    /// A parser, transformer or validator misbehaved. Cross-argument
    /// validators aren't tied to one argument, so they leave `argument` empty.
    #[error("internal error{}: {message}", internal_subject(.argument))]
    Internal {
        argument: Option<String>,
        message: String,
    },

    #[error("this command is on cooldown for another {}", display_duration(.remaining))]
    Cooldown {
        remaining: Duration,
        scope: CooldownScope,
    },

    #[error(
        "this command needs confirmation: run it again within {} to confirm",
        display_duration(.timeout)
    )]
    ConfirmationRequired { timeout: Duration },

    #[error("unknown subcommand {input:?}")]
    SubcommandNotFound {
        input: String,
        suggestions: Vec<String>,
    },
}

impl CommandParseError {
    pub(crate) fn usage(message: impl fmt::Display) -> Self {
        Self::Usage {
            message: message.to_string(),
            argument: None,
        }
    }

    pub(crate) fn usage_for(argument: &str, message: impl fmt::Display) -> Self {
        Self::Usage {
            message: message.to_string(),
            argument: Some(argument.to_owned()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Permission { .. } => ErrorKind::Permission,
            Self::SenderKind { .. } => ErrorKind::SenderKind,
            Self::GuardFailed { .. } => ErrorKind::GuardFailed,
            Self::Usage { .. } => ErrorKind::Usage,
            Self::Parsing { .. } => ErrorKind::Parsing,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::CrossValidation { .. } => ErrorKind::CrossValidation,
            Self::ArgumentPermission { .. } => ErrorKind::ArgumentPermission,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Cooldown { .. } => ErrorKind::Cooldown,
            Self::ConfirmationRequired { .. } => ErrorKind::ConfirmationRequired,
            Self::SubcommandNotFound { .. } => ErrorKind::SubcommandNotFound,
        }
    }

    /// The argument, flag or option this error is about, if any
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::Usage { argument, .. } | Self::Internal { argument, .. } => argument.as_deref(),
            Self::Parsing { argument, .. }
            | Self::Validation { argument, .. }
            | Self::ArgumentPermission { argument, .. } => Some(argument),
            _ => None,
        }
    }

    /// The raw text the user typed that caused this error, if any
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        match self {
            Self::Parsing { input, .. }
            | Self::Validation { input, .. }
            | Self::SubcommandNotFound { input, .. } => Some(input),
            _ => None,
        }
    }

    /// "Did you mean" suggestions, best first
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::Parsing { suggestions, .. } | Self::SubcommandNotFound { suggestions, .. } => {
                suggestions
            }
            _ => &[],
        }
    }

    /// Cooldowns and confirmations aren't rejections; the same command will
    /// work if the user tries again (later, or right away).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Cooldown { .. } | Self::ConfirmationRequired { .. }
        )
    }
}

fn internal_subject(argument: &Option<String>) -> impl fmt::Display + '_ {
    lazy_format!(match (argument) {
        Some(name) => " while handling <{name}>",
        None => "",
    })
}

fn display_duration(duration: &Duration) -> DisplayDuration {
    DisplayDuration(*duration)
}

/// Human-friendly duration formatting, rounded to the largest sensible unit
#[derive(Debug, Clone, Copy)]
pub struct DisplayDuration(pub Duration);

impl fmt::Display for DisplayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();

        match secs {
            0 => write!(f, "{}ms", self.0.as_millis().max(1)),
            1..60 => write!(f, "{secs}s"),
            60..3600 => match secs % 60 {
                0 => write!(f, "{}m", secs / 60),
                rem => write!(f, "{}m{rem}s", secs / 60),
            },
            _ => match (secs % 3600) / 60 {
                0 => write!(f, "{}h", secs / 3600),
                rem => write!(f, "{}h{rem}m", secs / 3600),
            },
        }
    }
}

/**
A non-empty, ordered list of [`CommandParseError`]s.

In the default fail-fast mode this always contains exactly one error. In
collect-all mode it contains every error found, in the order the pipeline
found them.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrors {
    first: CommandParseError,
    rest: Vec<CommandParseError>,
}

impl ParseErrors {
    #[must_use]
    pub fn new(error: CommandParseError) -> Self {
        Self {
            first: error,
            rest: Vec::new(),
        }
    }

    /// Build from a list of errors, if the list isn't empty
    #[must_use]
    pub fn from_vec(errors: Vec<CommandParseError>) -> Option<Self> {
        let mut errors = errors.into_iter();
        let first = errors.next()?;

        Some(Self {
            first,
            rest: errors.collect(),
        })
    }

    pub fn push(&mut self, error: CommandParseError) {
        self.rest.push(error);
    }

    #[must_use]
    pub fn first(&self) -> &CommandParseError {
        &self.first
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandParseError> + Clone {
        std::iter::once(&self.first).chain(&self.rest)
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.iter().map(CommandParseError::kind).collect()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<CommandParseError> {
        let mut errors = Vec::with_capacity(self.len());
        errors.push(self.first);
        errors.extend(self.rest);
        errors
    }
}

impl From<CommandParseError> for ParseErrors {
    fn from(error: CommandParseError) -> Self {
        Self::new(error)
    }
}

impl IntoIterator for ParseErrors {
    type Item = CommandParseError;
    type IntoIter = std::vec::IntoIter<CommandParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().join_with("; "))
    }
}

impl std::error::Error for ParseErrors {}

/// A command was defined incorrectly. These are programming mistakes, found
/// once when the command is built rather than every time it's parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum DefinitionError {
    #[error("command {command:?}: argument name {name:?} is used more than once")]
    DuplicateArgument { command: String, name: String },

    #[error("command {command:?}: greedy argument {name:?} must be the last argument")]
    GreedyNotLast { command: String, name: String },

    #[error("command {command:?}: greedy argument {name:?} must use a textual parser")]
    GreedyNotTextual { command: String, name: String },

    #[error(
        "command {command:?}: required argument {name:?} can't follow optional argument {after:?}"
    )]
    RequiredAfterOptional {
        command: String,
        name: String,
        after: String,
    },

    #[error("command {command:?}: option tag {tag:?} is used more than once")]
    DuplicateTag { command: String, tag: String },

    #[error("command {command:?}: option name {name:?} is used more than once")]
    DuplicateOption { command: String, name: String },

    #[error("command {command:?}: subcommand name or alias {name:?} is used more than once")]
    DuplicateSubcommand { command: String, name: String },

    #[error("command {command:?}: flag {name:?} has neither a short nor a long tag")]
    UntaggedFlag { command: String, name: String },

    #[error("command {command:?}: invalid fuzzy threshold {threshold}; it must be within 0..1")]
    InvalidThreshold { command: String, threshold: f64 },
}
