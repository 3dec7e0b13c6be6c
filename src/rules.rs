/*!
Validation rules for single arguments, and validators that check the
relationships between arguments.
*/

use std::{fmt, sync::Arc};

use joinery::JoinableIterator;
use lazy_format::lazy_format;

use crate::{context::ContextView, errors::CommandParseError, value::Value};

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A single validation rule for an argument's value
#[derive(Clone)]
pub enum Rule {
    /// Numbers must be within this inclusive range
    Range { min: Option<f64>, max: Option<f64> },

    /// Text must have between `min` and `max` characters, inclusive
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },

    /// The value, displayed as text, must be one of these (case-insensitive)
    OneOf(Vec<String>),

    /// An arbitrary check
    Custom { check: Predicate, message: String },
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Self::Custom { message, .. } => f
                .debug_struct("Custom")
                .field("message", message)
                .finish_non_exhaustive(),
        }
    }
}

/// Why a value failed a rule
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RuleFailure {
    /// The rule rejected the value, with this message
    Rejected(String),

    /// A custom check panicked
    Panicked(String),
}

impl Rule {
    /// Check a value against this rule. Rules that don't apply to the kind
    /// of value (such as a length rule on an integer) always pass.
    fn check(&self, value: &Value) -> Result<(), RuleFailure> {
        match *self {
            Self::Range { min, max } => match value.as_f64() {
                Some(n)
                    if n.is_nan()
                        || min.is_some_and(|min| n < min)
                        || max.is_some_and(|max| n > max) =>
                {
                    Err(RuleFailure::Rejected(
                        lazy_format!(
                            match ((min, max)) {
                                (Some(min), Some(max)) => "must be between {min} and {max}",
                                (Some(min), None) => "must be at least {min}",
                                (None, Some(max)) => "must be at most {max}",
                                (None, None) => "is out of range",
                            }
                        )
                        .to_string(),
                    ))
                }
                _ => Ok(()),
            },
            Self::Length { min, max } => match value.as_str().map(|s| s.chars().count()) {
                Some(len) if min.is_some_and(|min| len < min) || max.is_some_and(|max| len > max) => {
                    Err(RuleFailure::Rejected(
                        lazy_format!(
                            match ((min, max)) {
                                (Some(min), Some(max)) =>
                                    "must be between {min} and {max} characters long",
                                (Some(min), None) => "must be at least {min} characters long",
                                (None, Some(max)) => "must be at most {max} characters long",
                                (None, None) => "has an invalid length",
                            }
                        )
                        .to_string(),
                    ))
                }
                _ => Ok(()),
            },
            Self::OneOf(ref allowed) => {
                let text = value.to_string();
                match allowed.iter().any(|item| item.eq_ignore_ascii_case(&text)) {
                    true => Ok(()),
                    false => Err(RuleFailure::Rejected(format!(
                        "must be one of {}",
                        allowed.iter().join_with(", ")
                    ))),
                }
            }
            Self::Custom {
                ref check,
                ref message,
            } => match crate::isolate(|| check(value)) {
                Ok(true) => Ok(()),
                Ok(false) => Err(RuleFailure::Rejected(message.clone())),
                Err(panic) => Err(RuleFailure::Panicked(panic)),
            },
        }
    }
}

/**
The set of rules an argument's value must satisfy. Rules are checked in the
order they were added, and the first failing rule's message is reported.
*/
#[derive(Debug, Clone, Default)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn range(mut self, min: impl Into<Option<f64>>, max: impl Into<Option<f64>>) -> Self {
        self.rules.push(Rule::Range {
            min: min.into(),
            max: max.into(),
        });
        self
    }

    #[must_use]
    pub fn length(
        mut self,
        min: impl Into<Option<usize>>,
        max: impl Into<Option<usize>>,
    ) -> Self {
        self.rules.push(Rule::Length {
            min: min.into(),
            max: max.into(),
        });
        self
    }

    #[must_use]
    pub fn one_of<I>(mut self, allowed: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.rules
            .push(Rule::OneOf(allowed.into_iter().map(Into::into).collect()));
        self
    }

    #[must_use]
    pub fn custom(
        mut self,
        message: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule::Custom {
            check: Arc::new(check),
            message: message.into(),
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn check(&self, value: &Value) -> Result<(), RuleFailure> {
        self.rules.iter().try_for_each(|rule| rule.check(value))
    }
}

type CrossCheck = Arc<dyn Fn(&ContextView<'_>) -> Option<String> + Send + Sync>;

/**
A check over the relationship between several arguments, such as "`min`
must not exceed `max`". Validators run after every argument has parsed and
passed its own rules; returning `Some(message)` rejects the command line.
*/
#[derive(Clone)]
pub struct CrossValidator {
    check: CrossCheck,
}

impl CrossValidator {
    pub fn new(check: impl Fn(&ContextView<'_>) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    /// Run the check. A panicking check is reported as
    /// [`CommandParseError::Internal`] rather than unwinding into the caller.
    pub(crate) fn validate(&self, view: &ContextView<'_>) -> Result<(), CommandParseError> {
        match crate::isolate(|| (self.check)(view)) {
            Ok(Some(message)) if !message.is_empty() => {
                Err(CommandParseError::CrossValidation { message })
            }
            Ok(_) => Ok(()),
            Err(message) => Err(CommandParseError::Internal {
                argument: None,
                message,
            }),
        }
    }
}

impl fmt::Debug for CrossValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossValidator").finish_non_exhaustive()
    }
}
