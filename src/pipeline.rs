/*!
The positional argument state machine.

Given a command's argument specs and the positional tokens left over after
extraction, the pipeline walks the specs in order, deciding for each one
whether it's skipped (by its condition or a missing permission), which tokens
it consumes, and what value it produces. It's a pure function of its inputs:
the specs, the tokens, the extracted options and the invoker's answers to
permission checks.
*/

use std::collections::HashMap;

use joinery::JoinableIterator;
use rostrum_parser::Token;
use tracing::trace;

use crate::{
    context::ContextView,
    definition::ArgumentSpec,
    errors::CommandParseError,
    extract::Extracted,
    invoker::Invoker,
    rules::RuleFailure,
    sanitize::sanitize,
    value::{Value, run_parser},
};

/// How many errors a parse reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Stop at the first error
    FailFast,

    /// Keep going after a failing argument and report every error
    CollectAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    Parsed,
    Failed,
    SkippedByCondition,
    SkippedByPermission,
}

/// Suggestions within this edit distance are offered
const SUGGESTION_DISTANCE: usize = 2;
const SUGGESTION_LIMIT: usize = 3;

pub(crate) struct Pipeline<'c> {
    pub arguments: &'c [ArgumentSpec],
    pub invoker: &'c dyn Invoker,
    pub sanitize: bool,

    /// The index of the argument whose completions are offered as
    /// suggestions, if suggestions are enabled and there is such an argument
    pub suggest_for: Option<usize>,
    pub mode: Mode,
}

struct State<'e> {
    mode: Mode,
    extracted: &'e Extracted,
    values: HashMap<String, Value>,
    status: Vec<Status>,
    errors: Vec<CommandParseError>,
}

impl State<'_> {
    fn view(&self) -> ContextView<'_> {
        ContextView::new(
            &self.values,
            &self.extracted.flags,
            &self.extracted.key_values,
            &self.extracted.multi_values,
        )
    }

    /// Record an error. Returns true if parsing should stop.
    fn fail(&mut self, error: CommandParseError) -> bool {
        self.errors.push(error);
        self.mode == Mode::FailFast
    }
}

impl<'c> Pipeline<'c> {
    /**
    Parse the positional tokens into values. In fail-fast mode the error list
    has exactly one element; in collect-all mode it has every error found, in
    order.
    */
    pub(crate) fn run(
        &self,
        tokens: &[Token],
        extracted: &Extracted,
    ) -> Result<HashMap<String, Value>, Vec<CommandParseError>> {
        let mut state = State {
            mode: self.mode,
            extracted,
            values: HashMap::new(),
            status: vec![Status::Pending; self.arguments.len()],
            errors: Vec::new(),
        };

        let mut arg_index = 0;
        let mut token_index = 0;

        while arg_index < self.arguments.len() && token_index < tokens.len() {
            let spec = &self.arguments[arg_index];
            let view = state.view();

            if spec.skipped_by_condition(&view) {
                trace!(argument = %spec.name, "skipped by condition");
                state.status[arg_index] = Status::SkippedByCondition;
                arg_index += 1;
                continue;
            }

            if spec.lacks_permission(self.invoker) {
                if spec.optional {
                    trace!(argument = %spec.name, "skipped by permission");
                    state.status[arg_index] = Status::SkippedByPermission;
                    arg_index += 1;
                    continue;
                }

                state.status[arg_index] = Status::Failed;
                if state.fail(self.permission_error(spec)) {
                    return Err(state.errors);
                }
                arg_index += 1;
                continue;
            }

            let consumed = match spec.greedy && self.is_last_to_parse(arg_index, &view) {
                true => tokens.len() - token_index,
                false => 1,
            };

            let input = match consumed {
                1 => tokens[token_index].text.clone(),
                _ => tokens[token_index..]
                    .iter()
                    .map(Token::as_str)
                    .join_with(" ")
                    .to_string(),
            };

            match self.process(arg_index, spec, &input) {
                Ok(value) => {
                    trace!(argument = %spec.name, %value, consumed, "parsed argument");
                    state.values.insert(spec.name.clone(), value);
                    state.status[arg_index] = Status::Parsed;
                }
                Err(error) => {
                    trace!(argument = %spec.name, %error, "argument failed");
                    state.status[arg_index] = Status::Failed;
                    if state.fail(error) {
                        return Err(state.errors);
                    }
                }
            }

            token_index += consumed;
            arg_index += 1;
        }

        self.finish(&mut state);

        if token_index < tokens.len() {
            let extra = &tokens[token_index];
            state.errors.push(CommandParseError::usage(format_args!(
                "too many arguments: unexpected {:?}",
                extra.as_str()
            )));
        }

        match state.errors.is_empty() {
            true => Ok(state.values),
            false => Err(state.errors),
        }
    }

    /// Re-check every spec the loop never reached (or skipped because of a
    /// permission) against the final values.
    fn finish(&self, state: &mut State<'_>) {
        for (index, spec) in self.arguments.iter().enumerate() {
            match state.status[index] {
                Status::Parsed | Status::Failed | Status::SkippedByCondition => continue,
                Status::SkippedByPermission => {
                    if let Some(ref default) = spec.default {
                        state.values.insert(spec.name.clone(), default.clone());
                    }
                    continue;
                }
                Status::Pending => {}
            }

            if spec.skipped_by_condition(&state.view()) {
                continue;
            }

            let error = if spec.lacks_permission(self.invoker) {
                (!spec.optional).then(|| self.permission_error(spec))
            } else {
                (!spec.optional).then(|| {
                    CommandParseError::usage_for(
                        &spec.name,
                        format_args!("missing required argument <{}>", spec.name),
                    )
                })
            };

            match error {
                Some(error) => {
                    if state.fail(error) {
                        return;
                    }
                }
                None => {
                    if let Some(ref default) = spec.default {
                        state.values.insert(spec.name.clone(), default.clone());
                    }
                }
            }
        }
    }

    /// Will the spec at `index` be the last one to be parsed? True when every
    /// later spec would be skipped, given the values so far.
    fn is_last_to_parse(&self, index: usize, view: &ContextView<'_>) -> bool {
        self.arguments[index + 1..].iter().all(|later| {
            later.skipped_by_condition(view)
                || (later.optional && later.lacks_permission(self.invoker))
        })
    }

    fn permission_error(&self, spec: &ArgumentSpec) -> CommandParseError {
        CommandParseError::ArgumentPermission {
            argument: spec.name.clone(),
            permission: spec.permission.clone().unwrap_or_default(),
        }
    }

    /// Parse, sanitize, transform and validate a single input
    fn process(
        &self,
        index: usize,
        spec: &ArgumentSpec,
        input: &str,
    ) -> Result<Value, CommandParseError> {
        let mut value = run_parser(&*spec.parser, &spec.name, input)
            .map_err(|error| self.with_suggestions(index, spec, error))?;

        if self.sanitize {
            if let Value::Text(ref text) = value {
                value = Value::Text(sanitize(text));
            }
        }

        if let Some(ref transform) = spec.transform {
            value = match crate::isolate(|| transform(value)) {
                Ok(Ok(value)) => value,
                Ok(Err(message)) | Err(message) => {
                    return Err(CommandParseError::Internal {
                        argument: Some(spec.name.clone()),
                        message,
                    });
                }
            };
        }

        spec.rules.check(&value).map_err(|failure| match failure {
            RuleFailure::Rejected(message) => CommandParseError::Validation {
                argument: spec.name.clone(),
                input: input.to_owned(),
                message,
            },
            RuleFailure::Panicked(message) => CommandParseError::Internal {
                argument: Some(spec.name.clone()),
                message,
            },
        })?;

        Ok(value)
    }

    fn with_suggestions(
        &self,
        index: usize,
        spec: &ArgumentSpec,
        mut error: CommandParseError,
    ) -> CommandParseError {
        if self.suggest_for != Some(index) {
            return error;
        }

        if let CommandParseError::Parsing {
            ref input,
            ref mut suggestions,
            ..
        } = error
        {
            *suggestions = suggest(input, spec.completions.as_deref().unwrap_or_default());
        }

        error
    }
}

/// The completions closest to `input`, best first. Ties keep the order the
/// completions were declared in.
pub(crate) fn suggest(input: &str, completions: &[String]) -> Vec<String> {
    let input = input.to_lowercase();

    let mut candidates: Vec<(usize, &String)> = completions
        .iter()
        .map(|completion| {
            let distance = strsim::levenshtein(&input, &completion.to_lowercase());
            (distance, completion)
        })
        .filter(|&(distance, _)| distance <= SUGGESTION_DISTANCE)
        .collect();

    candidates.sort_by_key(|&(distance, _)| distance);
    candidates
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .map(|(_, completion)| completion.clone())
        .collect()
}
