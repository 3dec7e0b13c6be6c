/*!
Rendering errors and help pages as text.

Nothing in the parser depends on this module; it's here for hosts that want
reasonable English output without writing their own. Hosts that localize
their messages should match on [`CommandParseError`] directly instead.
*/

use std::{
    fmt::Display,
    io::{self, Write as _},
};

use indent_write::io::IndentWriter;
use joinery::JoinableIterator;
use lazy_format::lazy_format;

use crate::{
    command::Command,
    definition::{ArgumentSpec, KeyValueSpec},
    errors::{CommandParseError, ParseErrors},
};

/// Descriptions are wrapped to this width
const WIDTH: usize = 72;

/// Descriptions start at this column when they fit on the same line as the
/// item they describe
const COLUMN: usize = 20;

/// An error's message, followed by its "did you mean" suggestions, if any
pub fn error_message(error: &CommandParseError) -> impl Display + '_ {
    let suggestions = error.suggestions();

    lazy_format! {
        match (suggestions) {
            [] => "{error}",
            [only] => "{error} (did you mean {only:?}?)",
            _ => (
                "{error} (did you mean one of {list}?)",
                list = suggestions.iter().map(|s| lazy_format!("{s:?}")).join_with(", ")
            ),
        }
    }
}

/// Write one or more errors, one per line
pub fn write_errors(out: &mut impl io::Write, errors: &ParseErrors) -> io::Result<()> {
    match errors.len() {
        1 => writeln!(out, "error: {}", error_message(errors.first())),
        count => {
            writeln!(out, "{count} errors:")?;
            let mut out = IndentWriter::new("  ", out);
            errors
                .iter()
                .try_for_each(|error| writeln!(out, "- {}", error_message(error)))
        }
    }
}

fn argument_placeholder(argument: &ArgumentSpec) -> impl Display + '_ {
    let name = argument.name();

    lazy_format!(match ((argument.is_optional(), argument.is_greedy())) {
        (false, false) => "<{name}>",
        (false, true) => "<{name}...>",
        (true, false) => "[{name}]",
        (true, true) => "[{name}...]",
    })
}

fn key_value_placeholder(key_value: &KeyValueSpec) -> impl Display + '_ {
    let key = key_value.key_token();
    let type_name = key_value.parser.type_name();

    lazy_format!(match (key_value.optional) {
        false => "{key}=<{type_name}>",
        true => "[{key}=<{type_name}>]",
    })
}

/// A one-line summary of how to use a command: its name, then its
/// subcommands or arguments.
pub fn synopsis(command: &Command) -> impl Display + '_ {
    let name = command.name();

    let options = lazy_format!(
        match (command.flags().is_empty() && command.key_values().is_empty()) {
            true => "",
            false => " [OPTIONS]",
        }
    );

    let arguments = lazy_format!(
        " {placeholder}" for placeholder in command.arguments().iter().map(argument_placeholder)
    );

    lazy_format!(match (command.subcommands().is_empty()) {
        true => "{name}{options}{arguments}",
        false => "{name} <COMMAND>",
    })
}

struct Entry<'a> {
    section: &'static str,
    item: String,
    description: Option<&'a str>,
}

fn entries(command: &Command) -> Vec<Entry<'_>> {
    let subcommands = command.subcommands().iter().map(|subcommand| Entry {
        section: "Commands",
        item: synopsis(subcommand).to_string(),
        description: subcommand.description(),
    });

    let arguments = command.arguments().iter().map(|argument| Entry {
        section: "Arguments",
        item: argument_placeholder(argument).to_string(),
        description: argument.description.as_deref(),
    });

    let flags = command.flags().iter().filter_map(|flag| {
        Some(Entry {
            section: "Flags",
            item: flag.tags()?.to_string(),
            description: flag.description.as_deref(),
        })
    });

    let key_values = command.key_values().iter().map(|key_value| Entry {
        section: "Options",
        item: key_value_placeholder(key_value).to_string(),
        description: key_value.description.as_deref(),
    });

    subcommands
        .chain(arguments)
        .chain(flags)
        .chain(key_values)
        .collect()
}

/**
Write a page of help for a command.

Every subcommand, argument, flag and option of the command is an entry, and
entries are split into pages of [`HelpOptions::page_size`][crate::HelpOptions]
entries. Pages are numbered from 1; a page past the end shows the last page.
*/
pub fn write_help_page(out: &mut impl io::Write, command: &Command, page: usize) -> io::Result<()> {
    let page_size = command
        .options()
        .help
        .map_or(8, |help| help.page_size)
        .max(1);

    let entries = entries(command);
    let pages = entries.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, pages);

    writeln!(out, "{}", synopsis(command))?;

    if let Some(description) = command.description() {
        let mut out = IndentWriter::new("  ", &mut *out);
        writeln!(out, "{}", textwrap::fill(description, WIDTH))?;
    }

    if pages > 1 {
        writeln!(out, "(page {page} of {pages})")?;
    }

    let mut section = None;

    for entry in entries.iter().skip((page - 1) * page_size).take(page_size) {
        if section != Some(entry.section) {
            section = Some(entry.section);
            writeln!(out, "\n{}:", entry.section)?;
        }

        describe(&mut IndentWriter::new("  ", &mut *out), &entry.item, entry.description)?;
    }

    Ok(())
}

/// Describe an item by printing the item, followed by its description. If
/// they both fit, they share a line; otherwise the description is wrapped and
/// indented below the item.
fn describe(
    out: &mut (impl io::Write + ?Sized),
    item: &str,
    description: Option<&str>,
) -> io::Result<()> {
    let description = match description {
        None | Some("") => return writeln!(out, "{item}"),
        Some(description) => description,
    };

    let wrapped = textwrap::fill(description, WIDTH - COLUMN);
    let width = item.chars().count();

    match COLUMN.checked_sub(width) {
        Some(space) if space >= 2 && !wrapped.contains('\n') => {
            writeln!(out, "{item}{:space$}{wrapped}", "")
        }
        _ => {
            writeln!(out, "{item}")?;
            let mut out = IndentWriter::new("    ", out);
            writeln!(out, "{wrapped}")
        }
    }
}
