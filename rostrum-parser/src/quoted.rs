use alloc::{string::String, vec::Vec};
use core::fmt;

/**
A single logical token, after quoted spans have been merged.

`quoted` records whether the token came from a `"quoted span"`. Quoted tokens
are always treated literally by later stages: they are never interpreted as
flags or options, and commas inside them never split a value into a list.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: String,
    pub quoted: bool,
}

impl Token {
    /// A token that was not quoted on the command line
    #[inline]
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// A token that came from a quoted span
    #[inline]
    #[must_use]
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A quote was opened and never closed. `index` is the position of the raw
/// token that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnclosedQuote {
    pub index: usize,
}

impl fmt::Display for UnclosedQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quote opened at argument {} was never closed",
            self.index + 1
        )
    }
}

impl core::error::Error for UnclosedQuote {}

/**
Merge quoted spans in a list of raw, whitespace-separated tokens.

A raw token that begins with `"` opens a quoted span, which runs until a raw
token that ends with an unescaped `"`. The pieces of the span are joined with a
single space and the surrounding quotes are stripped. Inside a span, `\"` is a
literal quote and `\\` is a literal backslash. Tokens outside of quoted spans
are passed through untouched, including any quotes that appear in the middle
of them.
*/
pub fn tokenize<'a, I>(raw: I) -> Result<Vec<Token>, UnclosedQuote>
where
    I: IntoIterator<Item = &'a str>,
{
    let raw = raw.into_iter();
    let mut tokens = Vec::with_capacity(raw.size_hint().0);
    let mut open: Option<(usize, String)> = None;

    for (index, piece) in raw.enumerate() {
        open = match open {
            None => match piece.strip_prefix('"') {
                None => {
                    tokens.push(Token::plain(piece));
                    None
                }
                Some(rest) => match closing(rest) {
                    Some(body) => {
                        tokens.push(Token::quoted(unescape(body)));
                        None
                    }
                    None => Some((index, String::from(rest))),
                },
            },
            Some((start, mut buffer)) => {
                buffer.push(' ');
                match closing(piece) {
                    Some(body) => {
                        buffer.push_str(body);
                        tokens.push(Token::quoted(unescape(&buffer)));
                        None
                    }
                    None => {
                        buffer.push_str(piece);
                        Some((start, buffer))
                    }
                }
            }
        }
    }

    match open {
        None => Ok(tokens),
        Some((index, _)) => Err(UnclosedQuote { index }),
    }
}

/// If `piece` ends with an unescaped quote, return everything before it.
fn closing(piece: &str) -> Option<&str> {
    let body = piece.strip_suffix('"')?;
    let escapes = body.bytes().rev().take_while(|&b| b == b'\\').count();

    match escapes % 2 {
        0 => Some(body),
        _ => None,
    }
}

/// Strip a quoted value that is wrapped entirely in quotes, such as the
/// `"a,b"` in `key="a,b"`. Used for values that were quoted inside of a
/// single raw token.
#[must_use]
pub fn strip_inline_quotes(value: &str) -> Option<String> {
    let inner = value.strip_prefix('"')?;
    closing(inner).map(unescape)
}

fn unescape(body: &str) -> String {
    if memchr::memchr(b'\\', body.as_bytes()).is_none() {
        return String::from(body);
    }

    let mut output = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.clone().next() {
                Some(next @ ('"' | '\\')) => {
                    chars.next();
                    output.push(next);
                }
                _ => output.push('\\'),
            },
            c => output.push(c),
        }
    }

    output
}
