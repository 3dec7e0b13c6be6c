/*!
Implementations of [`ValueParser`] for the primitive value kinds.
 */

use std::time::Duration;

use joinery::JoinableIterator;

use crate::value::{ParseOutcome, Value, ValueParser};

macro_rules! from_str {
    ($(
        $(#[$meta:meta])*
        $name:ident: $type:ty => $variant:ident, $type_name:literal;
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $name;

            impl ValueParser for $name {
                #[inline]
                fn type_name(&self) -> &str {
                    $type_name
                }

                #[inline]
                fn parse(&self, token: &str) -> ParseOutcome<Value> {
                    ParseOutcome::from(token.parse::<$type>()).map(Value::$variant)
                }
            }
        )*
    };
}

from_str! {
    /// A signed 64 bit integer
    Integer: i64 => Integer, "integer";

    /// A 64 bit float
    Float: f64 => Float, "number";
}

/// Any text. This is the only kind of parser that greedy arguments accept.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl ValueParser for Text {
    fn type_name(&self) -> &str {
        "text"
    }

    fn parse(&self, token: &str) -> ParseOutcome<Value> {
        ParseOutcome::Success(Value::Text(token.to_owned()))
    }

    fn is_textual(&self) -> bool {
        true
    }
}

/// A single word of text, without any whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Word;

impl ValueParser for Word {
    fn type_name(&self) -> &str {
        "word"
    }

    fn parse(&self, token: &str) -> ParseOutcome<Value> {
        match token.contains(char::is_whitespace) {
            true => ParseOutcome::failure("expected a single word"),
            false => ParseOutcome::Success(Value::Text(token.to_owned())),
        }
    }
}

/// `true`/`false`, and the common `yes`/`no`, `on`/`off` spellings
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

impl ValueParser for Boolean {
    fn type_name(&self) -> &str {
        "boolean"
    }

    fn parse(&self, token: &str) -> ParseOutcome<Value> {
        match token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => ParseOutcome::Success(Value::Bool(true)),
            "false" | "no" | "off" => ParseOutcome::Success(Value::Bool(false)),
            _ => ParseOutcome::failure("expected true or false"),
        }
    }
}

/**
One of a fixed set of words, matched case-insensitively. The parsed value is
the declared spelling, not the user's.
*/
#[derive(Debug, Clone)]
pub struct Choice {
    choices: Vec<String>,
}

impl Choice {
    pub fn new<I>(choices: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl ValueParser for Choice {
    fn type_name(&self) -> &str {
        "choice"
    }

    fn parse(&self, token: &str) -> ParseOutcome<Value> {
        match self
            .choices
            .iter()
            .find(|choice| choice.eq_ignore_ascii_case(token))
        {
            Some(choice) => ParseOutcome::Success(Value::Text(choice.clone())),
            None => ParseOutcome::failure(format_args!(
                "expected one of {}",
                self.choices.iter().join_with(", ")
            )),
        }
    }
}

/**
A duration, written as a sequence of `<number><unit>` groups like `1h30m` or
`45s`. Units are `d`, `h`, `m`, `s` and `ms`. A bare number is a number of
seconds.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct Span;

impl ValueParser for Span {
    fn type_name(&self) -> &str {
        "duration"
    }

    fn parse(&self, token: &str) -> ParseOutcome<Value> {
        parse_duration(token).map(Value::Duration)
    }
}

fn parse_duration(token: &str) -> ParseOutcome<Duration> {
    if token.is_empty() {
        return ParseOutcome::failure("expected a duration");
    }

    if let Ok(seconds) = token.parse::<u64>() {
        return ParseOutcome::Success(Duration::from_secs(seconds));
    }

    let mut total = Duration::ZERO;
    let mut rest = token;

    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return ParseOutcome::failure(format_args!("{token:?} is not a valid duration"));
        }

        let Ok(amount) = rest[..digits].parse::<u64>() else {
            return ParseOutcome::failure("duration is too long");
        };
        rest = &rest[digits..];

        let unit_len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
        let unit = match &rest[..unit_len] {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount.saturating_mul(60)),
            "h" => Duration::from_secs(amount.saturating_mul(60 * 60)),
            "d" => Duration::from_secs(amount.saturating_mul(60 * 60 * 24)),
            unit => {
                return ParseOutcome::failure(format_args!("unknown duration unit {unit:?}"));
            }
        };
        rest = &rest[unit_len..];

        total = total.saturating_add(unit);
    }

    ParseOutcome::Success(total)
}
