/*!
Commands and the parse entry points.

A [`Command`] is built once, with [`Command::builder`], and then parsed any
number of times, from any number of threads. Building checks every rule about
how a command may be defined and precomputes the lookup tables parsing needs;
parsing never fails because of the definition.
*/

use std::{collections::HashMap, iter, time::Duration};

use joinery::JoinableIterator;
use rostrum_parser::{Token, tokenize};
use tracing::debug;

use crate::{
    context::{CommandContext, ContextView},
    definition::{ArgumentSpec, Flag, Guard, KeyValueSpec},
    errors::{CommandParseError, DefinitionError, ParseErrors},
    extract::{OptionTable, extract},
    gate::{Admission, Gate},
    invoker::{Invoker, SenderKind},
    options::{CommandOptions, CooldownOptions},
    pipeline::{Mode, Pipeline},
    router::{Route, RouteTable, route},
    rules::CrossValidator,
};

/// A successful parse
#[derive(Debug)]
pub enum Parsed<'c> {
    /// Every argument, flag and option parsed; run the command
    Context(CommandContext),

    /// The user asked for a page of help for this command, which has
    /// subcommands. Pages are numbered from 1.
    HelpPage { command: &'c Command, page: usize },
}

impl Parsed<'_> {
    #[must_use]
    pub fn context(&self) -> Option<&CommandContext> {
        match self {
            Parsed::Context(context) => Some(context),
            Parsed::HelpPage { .. } => None,
        }
    }

    #[must_use]
    pub fn into_context(self) -> Option<CommandContext> {
        match self {
            Parsed::Context(context) => Some(context),
            Parsed::HelpPage { .. } => None,
        }
    }
}

pub type ParseResult<'c> = Result<Parsed<'c>, ParseErrors>;

/// A command definition, with all of its arguments, options and subcommands
#[derive(Debug)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    sender: Option<SenderKind>,
    guards: Vec<Guard>,
    arguments: Vec<ArgumentSpec>,
    flags: Vec<Flag>,
    key_values: Vec<KeyValueSpec>,
    validators: Vec<CrossValidator>,
    subcommands: Vec<Command>,
    options: CommandOptions,

    option_table: OptionTable,
    routes: RouteTable,
    suggest_for: Option<usize>,
    argument_aliases: HashMap<String, String>,
}

/// Requirements a parent passes down to its subcommands
#[derive(Debug, Clone, Copy, Default)]
struct Inherited<'c> {
    permission: Option<&'c str>,
    sender: Option<SenderKind>,
}

struct Invocation<'a> {
    invoker: &'a dyn Invoker,
    label: &'a str,
    raw: &'a [String],
    mode: Mode,
    gate: Option<&'a Gate>,
}

/// A cooldown to start once the whole parse has succeeded
struct Commit<'c> {
    command: String,
    cooldown: &'c CooldownOptions,
}

impl Command {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    #[must_use]
    pub fn sender(&self) -> Option<SenderKind> {
        self.sender
    }

    #[must_use]
    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    #[must_use]
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    #[must_use]
    pub fn key_values(&self) -> &[KeyValueSpec] {
        &self.key_values
    }

    #[must_use]
    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    #[must_use]
    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /**
    Parse a command line, stopping at the first error.

    `label` is the name or alias the user typed to invoke the command, and
    `tokens` are the whitespace-separated words that followed it. This has no
    side effects: cooldowns and confirmations are only enforced by
    [`parse_strict`][Self::parse_strict].
    */
    pub fn parse<'c, S: AsRef<str>>(
        &'c self,
        invoker: &dyn Invoker,
        label: &str,
        tokens: &[S],
    ) -> ParseResult<'c> {
        self.run(invoker, label, tokens, Mode::FailFast, None)
    }

    /// Parse a command line, collecting every error rather than stopping at
    /// the first one. Useful for reporting everything wrong with a command
    /// line at once.
    pub fn parse_all<'c, S: AsRef<str>>(
        &'c self,
        invoker: &dyn Invoker,
        label: &str,
        tokens: &[S],
    ) -> ParseResult<'c> {
        self.run(invoker, label, tokens, Mode::CollectAll, None)
    }

    /**
    Parse a command line like [`parse`][Self::parse], also enforcing the
    cooldowns and confirmations of every command along the way.

    Cooldowns are checked before anything is parsed, but only started once
    the whole command line has parsed successfully, so a mistyped command
    doesn't cost the user a cooldown.
    */
    pub fn parse_strict<'c, S: AsRef<str>>(
        &'c self,
        gate: &Gate,
        invoker: &dyn Invoker,
        label: &str,
        tokens: &[S],
    ) -> ParseResult<'c> {
        self.run(invoker, label, tokens, Mode::FailFast, Some(gate))
    }

    fn run<'c, S: AsRef<str>>(
        &'c self,
        invoker: &dyn Invoker,
        label: &str,
        tokens: &[S],
        mode: Mode,
        gate: Option<&Gate>,
    ) -> ParseResult<'c> {
        let raw: Vec<String> = tokens.iter().map(|token| token.as_ref().to_owned()).collect();

        let invocation = Invocation {
            invoker,
            label,
            raw: &raw,
            mode,
            gate,
        };

        let mut path = Vec::new();
        let mut commits = Vec::new();

        let parsed = self.descend(
            &invocation,
            &raw,
            Inherited::default(),
            &mut path,
            &mut commits,
        )?;

        if let (Some(gate), Parsed::Context(_)) = (gate, &parsed) {
            for commit in &commits {
                gate.commit_cooldown(&commit.command, invoker, commit.cooldown)?;
            }
        }

        Ok(parsed)
    }

    /// The checks that run before any token is looked at
    fn admit(
        &self,
        invocation: &Invocation<'_>,
        id: &str,
        inherited: Inherited<'_>,
    ) -> Result<(), CommandParseError> {
        let invoker = invocation.invoker;

        if let Some(node) = self.permission.as_deref().or(inherited.permission) {
            if !invoker.has_permission(node) {
                debug!(command = id, permission = node, "permission denied");
                return Err(CommandParseError::Permission {
                    permission: node.to_owned(),
                });
            }
        }

        if let Some(expected) = self.sender.or(inherited.sender) {
            let actual = invoker.kind();
            if actual != expected {
                return Err(CommandParseError::SenderKind { expected, actual });
            }
        }

        if let Some(guard) = self.guards.iter().find(|guard| !(guard.check)(invoker)) {
            return Err(CommandParseError::GuardFailed {
                message: guard.message.clone(),
            });
        }

        let Some(gate) = invocation.gate else {
            return Ok(());
        };

        if let Some(ref cooldown) = self.options.cooldown {
            gate.check_cooldown(id, invoker, cooldown)?;
        }

        if let Some(timeout) = self.options.confirmation {
            if gate.confirm(id, invoker, timeout) == Admission::Pending {
                return Err(CommandParseError::ConfirmationRequired { timeout });
            }
        }

        Ok(())
    }

    fn descend<'c>(
        &'c self,
        invocation: &Invocation<'_>,
        tokens: &[String],
        inherited: Inherited<'c>,
        path: &mut Vec<String>,
        commits: &mut Vec<Commit<'c>>,
    ) -> ParseResult<'c> {
        path.push(self.name.clone());
        let id = path.iter().join_with(' ').to_string();

        self.admit(invocation, &id, inherited)?;

        if invocation.gate.is_some() {
            if let Some(ref cooldown) = self.options.cooldown {
                commits.push(Commit {
                    command: id.clone(),
                    cooldown,
                });
            }
        }

        if !self.subcommands.is_empty() {
            let has_own_arguments = !self.arguments.is_empty();

            match tokens.first() {
                None if has_own_arguments => {}
                None => {
                    return match self.options.help {
                        Some(_) => Ok(Parsed::HelpPage {
                            command: self,
                            page: 1,
                        }),
                        None => Err(CommandParseError::usage(format_args!(
                            "missing subcommand: expected one of {}",
                            self.subcommands
                                .iter()
                                .map(|subcommand| subcommand.name.as_str())
                                .join_with(", ")
                        ))
                        .into()),
                    };
                }
                Some(first) => match route(&self.routes, &self.options, has_own_arguments, first) {
                    Route::Subcommand(index) => {
                        let subcommand = &self.subcommands[index];
                        debug!(command = %id, subcommand = %subcommand.name, "routing");

                        let inherited = Inherited {
                            permission: self.permission.as_deref().or(inherited.permission),
                            sender: self.sender.or(inherited.sender),
                        };

                        return subcommand.descend(invocation, &tokens[1..], inherited, path, commits);
                    }
                    Route::HelpPage(page) => {
                        return Ok(Parsed::HelpPage {
                            command: self,
                            page: page.get(),
                        });
                    }
                    Route::NotFound { suggestions } => {
                        return Err(CommandParseError::SubcommandNotFound {
                            input: first.clone(),
                            suggestions,
                        }
                        .into());
                    }
                    Route::Own => {}
                },
            }
        }

        self.parse_own(invocation, tokens, path)
            .map(Parsed::Context)
    }

    /// Parse the tokens with this command's own flags, options and arguments
    fn parse_own(
        &self,
        invocation: &Invocation<'_>,
        tokens: &[String],
        path: &[String],
    ) -> Result<CommandContext, ParseErrors> {
        let tokens = match self.options.quoting {
            true => tokenize(tokens.iter().map(String::as_str))
                .map_err(|error| ParseErrors::from(CommandParseError::usage(error)))?,
            false => tokens.iter().map(|token| Token::plain(token.as_str())).collect(),
        };

        let (extracted, mut errors) = extract(
            &self.option_table,
            &self.flags,
            &self.key_values,
            tokens,
            invocation.invoker,
        );

        if invocation.mode == Mode::FailFast && !errors.is_empty() {
            return Err(errors.swap_remove(0).into());
        }

        let pipeline = Pipeline {
            arguments: &self.arguments,
            invoker: invocation.invoker,
            sanitize: self.options.sanitize,
            suggest_for: self.suggest_for.filter(|_| self.options.suggestions),
            mode: invocation.mode,
        };

        let values = match pipeline.run(&extracted.positionals, &extracted) {
            Ok(values) => values,
            Err(pipeline_errors) => {
                errors.extend(pipeline_errors);
                HashMap::new()
            }
        };

        // Validators only see complete, individually valid command lines
        if errors.is_empty() {
            let view = ContextView::new(
                &values,
                &extracted.flags,
                &extracted.key_values,
                &extracted.multi_values,
            );

            for validator in &self.validators {
                if let Err(error) = validator.validate(&view) {
                    errors.push(error);

                    if invocation.mode == Mode::FailFast {
                        break;
                    }
                }
            }
        }

        match ParseErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(CommandContext {
                label: invocation.label.to_owned(),
                path: path.to_vec(),
                values,
                flags: extracted.flags,
                key_values: extracted.key_values,
                multi_values: extracted.multi_values,
                raw: invocation.raw.to_vec(),
                aliases: self.argument_aliases.clone(),
            }),
        }
    }
}

/// Builds a [`Command`]. See [`Command::builder`].
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    sender: Option<SenderKind>,
    guards: Vec<Guard>,
    arguments: Vec<ArgumentSpec>,
    flags: Vec<Flag>,
    key_values: Vec<KeyValueSpec>,
    validators: Vec<CrossValidator>,
    subcommands: Vec<CommandBuilder>,
    options: CommandOptions,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            permission: None,
            sender: None,
            guards: Vec::new(),
            arguments: Vec::new(),
            flags: Vec::new(),
            key_values: Vec::new(),
            validators: Vec::new(),
            subcommands: Vec::new(),
            options: CommandOptions::default(),
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Require a permission to use this command. Subcommands without a
    /// permission of their own inherit it.
    #[must_use]
    pub fn permission(mut self, node: impl Into<String>) -> Self {
        self.permission = Some(node.into());
        self
    }

    /// Only accept invokers of this kind. Subcommands inherit the
    /// requirement unless they set their own.
    #[must_use]
    pub fn sender(mut self, kind: SenderKind) -> Self {
        self.sender = Some(kind);
        self
    }

    #[must_use]
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    #[must_use]
    pub fn key_value(mut self, key_value: KeyValueSpec) -> Self {
        self.key_values.push(key_value);
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: CrossValidator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn subcommand(mut self, subcommand: CommandBuilder) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    #[must_use]
    pub fn options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn cooldown(mut self, cooldown: CooldownOptions) -> Self {
        self.options.cooldown = Some(cooldown);
        self
    }

    #[must_use]
    pub fn confirmation(mut self, timeout: Duration) -> Self {
        self.options.confirmation = Some(timeout);
        self
    }

    /// Check the definition and build the command, along with all of its
    /// subcommands.
    pub fn build(self) -> Result<Command, DefinitionError> {
        let command = self.name.as_str();

        let mut names: HashMap<String, String> = HashMap::new();
        let mut first_optional: Option<&str> = None;
        let last = self.arguments.len().saturating_sub(1);

        for (index, argument) in self.arguments.iter().enumerate() {
            for key in iter::once(&argument.name).chain(&argument.aliases) {
                if names.insert(key.clone(), argument.name.clone()).is_some() {
                    return Err(DefinitionError::DuplicateArgument {
                        command: command.to_owned(),
                        name: key.clone(),
                    });
                }
            }

            if argument.greedy {
                if index != last {
                    return Err(DefinitionError::GreedyNotLast {
                        command: command.to_owned(),
                        name: argument.name.clone(),
                    });
                }

                if !argument.parser.is_textual() {
                    return Err(DefinitionError::GreedyNotTextual {
                        command: command.to_owned(),
                        name: argument.name.clone(),
                    });
                }
            }

            match (argument.optional, first_optional) {
                (true, None) => first_optional = Some(argument.name.as_str()),
                (false, Some(after)) => {
                    return Err(DefinitionError::RequiredAfterOptional {
                        command: command.to_owned(),
                        name: argument.name.clone(),
                        after: after.to_owned(),
                    });
                }
                _ => {}
            }
        }

        if let Some(threshold) = self.options.fuzzy {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(DefinitionError::InvalidThreshold {
                    command: command.to_owned(),
                    threshold,
                });
            }
        }

        let option_table = OptionTable::build(command, &self.flags, &self.key_values)?;

        let subcommands = self
            .subcommands
            .into_iter()
            .map(CommandBuilder::build)
            .collect::<Result<Vec<Command>, DefinitionError>>()?;

        let routes = RouteTable::build(
            &self.name,
            subcommands.iter().enumerate().flat_map(|(index, subcommand)| {
                iter::once(subcommand.name.as_str())
                    .chain(subcommand.aliases.iter().map(String::as_str))
                    .map(move |key| (index, key))
            }),
        )?;

        // Suggestions only come from an argument's completions when it's the
        // only argument that has any
        let mut completable = self
            .arguments
            .iter()
            .enumerate()
            .filter(|(_, argument)| argument.completions.is_some())
            .map(|(index, _)| index);
        let suggest_for = match (completable.next(), completable.next()) {
            (Some(index), None) => Some(index),
            _ => None,
        };

        names.retain(|key, name| *key != *name);

        Ok(Command {
            name: self.name,
            aliases: self.aliases,
            description: self.description,
            permission: self.permission,
            sender: self.sender,
            guards: self.guards,
            arguments: self.arguments,
            flags: self.flags,
            key_values: self.key_values,
            validators: self.validators,
            subcommands,
            options: self.options,
            option_table,
            routes,
            suggest_for,
            argument_aliases: names,
        })
    }
}
