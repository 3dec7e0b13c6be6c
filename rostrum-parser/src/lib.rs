#![no_std]

/*!
Low-level token handling for typed text commands. Takes care of merging quoted
spans and of telling flags, options, key-value pairs and positionals apart. No
type handling happens here, and nothing here knows which flags or keys a
command actually declares; that's the job of the caller, which gets a
syntactic [`Form`] for each token and decides what to do with it. Usually this
is too low level to use directly.
*/

extern crate alloc;

mod quoted;
mod short;

pub use quoted::{Token, UnclosedQuote, strip_inline_quotes, tokenize};
pub use short::ShortCluster;

/**
The syntactic form of a single token.

Consider `--silent`. Is this a flag, or an option that takes the next token as
its value, or just a positional that happens to start with dashes? The
classifier can't know, because it doesn't know what the command declares, so
it only reports the shape of the token. Callers fall back to treating the
token as [`Form::Positional`] when the name it carries isn't declared.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form<'a> {
    /// A bare `--`, after which every token is positional
    Separator,

    /// `--name`. Could be a flag, a negated flag (`--no-name`) or an option
    /// that takes the next token as its value.
    Long { name: &'a str },

    /// `--name=value`. Definitely has a value.
    LongValue { name: &'a str, value: &'a str },

    /// `-abc`: one or more short flags
    Shorts(ShortCluster<'a>),

    /// `key=value` or `key:value`
    Pair { key: &'a str, value: &'a str },

    /// Anything else
    Positional(&'a str),
}

impl<'a> Form<'a> {
    /// For a `--no-name` token, get `name`
    #[inline]
    #[must_use]
    pub fn negated(&self) -> Option<&'a str> {
        match *self {
            Form::Long { name } => name.strip_prefix("no-").filter(|name| is_word(name)),
            _ => None,
        }
    }
}

/// Classify a single unquoted token. Quoted tokens should never be
/// classified; they're always positional.
#[must_use]
pub fn classify(token: &str) -> Form<'_> {
    match token {
        "--" => Form::Separator,
        "-" => Form::Positional(token),
        _ => {
            if let Some(option) = token.strip_prefix("--") {
                return match split_once(option, b'=') {
                    Some((name, value)) if is_word(name) => Form::LongValue { name, value },
                    Some(_) => Form::Positional(token),
                    None if is_word(option) => Form::Long { name: option },
                    None => Form::Positional(token),
                };
            }

            if let Some(cluster) = token.strip_prefix('-').and_then(ShortCluster::new) {
                return Form::Shorts(cluster);
            }

            match memchr::memchr2(b'=', b':', token.as_bytes()) {
                Some(i) if is_word(&token[..i]) => Form::Pair {
                    key: &token[..i],
                    value: &token[i + 1..],
                },
                _ => Form::Positional(token),
            }
        }
    }
}

/// A word is a non-empty run of alphanumerics, `-`, `_` and `.`, starting
/// with an alphanumeric.
#[must_use]
pub fn is_word(s: &str) -> bool {
    let mut chars = s.chars();

    chars.next().is_some_and(char::is_alphanumeric)
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn split_once(input: &str, delimiter: u8) -> Option<(&str, &str)> {
    memchr::memchr(delimiter, input.as_bytes()).map(|i| (&input[..i], &input[i + 1..]))
}
