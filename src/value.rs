/*!
The value parser contract.

A value parser is the "type" part of an argument: a pure function from a
single token to a [`ParseOutcome`]. Parsers know nothing about the argument
they're attached to, which is why failures carry only a message; the pipeline
adds the argument name, the raw input and the type name when it turns the
failure into a [`CommandParseError`][crate::errors::CommandParseError].

Most of the time you want one of the parsers in [`parsers`][crate::parsers].
Hosts with richer domain types (online players, worlds, and so on) implement
[`ValueParser`] themselves, or wrap a closure with [`parser_fn`].
*/

use core::fmt::{self, Display};
use std::time::Duration;

use crate::errors::CommandParseError;

/// The result of parsing a single token. Exactly one of a value or a message.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Success(T),
    Failure(String),
}

impl<T> ParseOutcome<T> {
    #[inline]
    pub fn failure(message: impl Display) -> Self {
        Self::Failure(message.to_string())
    }

    #[inline]
    pub fn map<U>(self, op: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            Self::Success(value) => ParseOutcome::Success(op(value)),
            Self::Failure(message) => ParseOutcome::Failure(message),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<T, E: Display> From<Result<T, E>> for ParseOutcome<T> {
    #[inline]
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::failure(err),
        }
    }
}

/**
A parsed argument value.

The set of kinds is closed. Each argument owns a parser that produces exactly
one kind, decided when the command is defined; use [`FromValue`] (through
[`CommandContext::get`][crate::CommandContext::get]) to get the typed value
back out.
*/
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Duration(Duration),
}

impl Value {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The numeric value of this value, if it's a number. Used by range
    /// validation, which treats integers and floats the same way.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Integer(value) => Some(value as f64),
            Self::Float(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "number",
            Self::Text(_) => "text",
            Self::Duration(_) => "duration",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => value.fmt(f),
            Self::Integer(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
            Self::Text(value) => f.write_str(value),
            Self::Duration(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

/// Types that can be extracted from a [`Value`] of the right kind.
pub trait FromValue<'a>: Sized {
    fn from_value(value: &'a Value) -> Option<Self>;
}

macro_rules! from_value {
    ($($type:ty => $pattern:pat => $out:expr,)*) => {
        $(
            impl<'a> FromValue<'a> for $type {
                #[inline]
                fn from_value(value: &'a Value) -> Option<Self> {
                    match *value {
                        $pattern => Some($out),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_value! {
    bool => Value::Bool(value) => value,
    i64 => Value::Integer(value) => value,
    f64 => Value::Float(value) => value,
    Duration => Value::Duration(value) => value,
    &'a str => Value::Text(ref value) => value.as_str(),
    String => Value::Text(ref value) => value.clone(),
}

impl<'a> FromValue<'a> for &'a Value {
    #[inline]
    fn from_value(value: &'a Value) -> Option<Self> {
        Some(value)
    }
}

/**
Parse a single token into a [`Value`].

Parsers must be pure: the same token always produces the same outcome. They
are shared by every invocation of a command, possibly across threads, so they
must also be `Send + Sync`.
*/
pub trait ValueParser: Send + Sync {
    /// The user-facing name of the type this parser produces, like `integer`
    /// or `player`. Used in error messages.
    fn type_name(&self) -> &str;

    fn parse(&self, token: &str) -> ParseOutcome<Value>;

    /// Textual parsers accept any text. Only textual parsers may be used for
    /// greedy arguments, since a greedy argument is handed every remaining
    /// token joined together.
    fn is_textual(&self) -> bool {
        false
    }
}

/// A [`ValueParser`] made out of a closure. See [`parser_fn`].
pub struct FnParser<F> {
    type_name: &'static str,
    textual: bool,
    parse: F,
}

/// Wrap a closure as a [`ValueParser`].
#[must_use]
pub fn parser_fn<F>(type_name: &'static str, parse: F) -> FnParser<F>
where
    F: Fn(&str) -> ParseOutcome<Value> + Send + Sync,
{
    FnParser {
        type_name,
        textual: false,
        parse,
    }
}

impl<F> FnParser<F> {
    /// Mark this parser as textual, so that it can be used by greedy
    /// arguments.
    #[must_use]
    pub fn textual(self) -> Self {
        Self {
            textual: true,
            ..self
        }
    }
}

impl<F> ValueParser for FnParser<F>
where
    F: Fn(&str) -> ParseOutcome<Value> + Send + Sync,
{
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn parse(&self, token: &str) -> ParseOutcome<Value> {
        (self.parse)(token)
    }

    fn is_textual(&self) -> bool {
        self.textual
    }
}

impl fmt::Debug for dyn ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.type_name())
    }
}

/// Run a parser for a named argument or option, turning a failure into a
/// [`CommandParseError::Parsing`] and a panic into a
/// [`CommandParseError::Internal`].
pub(crate) fn run_parser(
    parser: &dyn ValueParser,
    argument: &str,
    input: &str,
) -> Result<Value, CommandParseError> {
    match crate::isolate(|| parser.parse(input)) {
        Ok(ParseOutcome::Success(value)) => Ok(value),
        Ok(ParseOutcome::Failure(message)) => Err(CommandParseError::Parsing {
            argument: argument.to_owned(),
            type_name: parser.type_name().to_owned(),
            input: input.to_owned(),
            message,
            suggestions: Vec::new(),
        }),
        Err(panic) => Err(CommandParseError::Internal {
            argument: Some(argument.to_owned()),
            message: panic,
        }),
    }
}
