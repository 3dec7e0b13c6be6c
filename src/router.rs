/*!
Subcommand routing.

A command with subcommands looks at its first token to decide where the rest
of the command line goes: to a subcommand (found exactly, by name or alias,
or fuzzily), to a help page, or to the command's own arguments.
*/

use std::{collections::HashMap, num::NonZeroUsize};

use tracing::debug;

use crate::{errors::DefinitionError, options::CommandOptions};

/// Keys at least this similar to an unknown subcommand are suggested
const SUGGESTION_SIMILARITY: f64 = 0.5;
const SUGGESTION_LIMIT: usize = 3;

/// The lowercased names and aliases of a command's subcommands
#[derive(Debug, Clone, Default)]
pub(crate) struct RouteTable {
    exact: HashMap<String, usize>,

    /// Every key in declaration order, for fuzzy matching
    keys: Vec<(String, usize)>,
}

impl RouteTable {
    pub(crate) fn build<'a>(
        command: &str,
        subcommands: impl IntoIterator<Item = (usize, &'a str)>,
    ) -> Result<Self, DefinitionError> {
        let mut table = Self::default();

        for (index, key) in subcommands {
            let key = key.to_lowercase();

            if table.exact.insert(key.clone(), index).is_some() {
                return Err(DefinitionError::DuplicateSubcommand {
                    command: command.to_owned(),
                    name: key,
                });
            }

            table.keys.push((key, index));
        }

        Ok(table)
    }

    /// The most similar subcommand, if it's similar enough. Ties go to the
    /// first declared key.
    fn fuzzy(&self, token: &str, threshold: f64) -> Option<(usize, f64)> {
        self.keys
            .iter()
            .map(|(key, index)| (*index, strsim::normalized_damerau_levenshtein(token, key)))
            .fold(None, |best: Option<(usize, f64)>, (index, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((index, score)),
            })
            .filter(|&(_, score)| score > threshold)
    }

    /// Subcommand keys resembling `token`, most similar first
    fn suggestions(&self, token: &str) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = self
            .keys
            .iter()
            .map(|(key, _)| (strsim::normalized_damerau_levenshtein(token, key), key.as_str()))
            .filter(|&(score, _)| score >= SUGGESTION_SIMILARITY)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(|(_, key)| key.to_owned())
            .collect()
    }
}

/// Where a command line goes
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Route {
    Subcommand(usize),
    HelpPage(NonZeroUsize),

    /// Parse the command line with the command's own arguments
    Own,

    NotFound { suggestions: Vec<String> },
}

/**
Decide the route for a command line whose first token is `token`.

Only an exact match can route away from a command that has arguments of its
own: everything else is handed to those arguments, so that a value that
happens to be a number or resemble a subcommand name still parses as a value.
*/
pub(crate) fn route(
    table: &RouteTable,
    options: &CommandOptions,
    has_own_arguments: bool,
    token: &str,
) -> Route {
    let lowered = token.to_lowercase();

    if let Some(&index) = table.exact.get(&lowered) {
        debug!(token, index, "exact subcommand match");
        return Route::Subcommand(index);
    }

    if has_own_arguments {
        return Route::Own;
    }

    if options.help.is_some() {
        if lowered == "help" {
            return Route::HelpPage(NonZeroUsize::MIN);
        }

        if let Ok(page) = lowered.parse::<NonZeroUsize>() {
            return Route::HelpPage(page);
        }
    }

    if let Some(threshold) = options.fuzzy {
        if let Some((index, score)) = table.fuzzy(&lowered, threshold) {
            debug!(token, index, score, "fuzzy subcommand match");
            return Route::Subcommand(index);
        }
    }

    debug!(token, "no subcommand matched");
    Route::NotFound {
        suggestions: match options.suggestions {
            true => table.suggestions(&lowered),
            false => Vec::new(),
        },
    }
}
