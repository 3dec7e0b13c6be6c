mod error;

use std::{
    io::{self, BufRead as _, Write as _},
    time::Duration,
};

use anyhow::Context as _;
use rostrum::{
    ArgumentSpec, Command, CommandContext, CooldownOptions, CrossValidator, Flag, Gate,
    KeyValueSpec, Parsed, Rules, SenderKind, SimpleInvoker,
    parsers::{Choice, Integer, Span, Text, Word},
    printers::{write_errors, write_help_page},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::InputError;

fn commands() -> anyhow::Result<Vec<Command>> {
    let give = Command::builder("give")
        .description("Give an item to a player")
        .argument(ArgumentSpec::new("target", Word).description("Who gets the item"))
        .argument(
            ArgumentSpec::new("item", Word)
                .completions(["apple", "bread", "diamond", "torch"])
                .rules(Rules::new().one_of(["apple", "bread", "diamond", "torch"]))
                .description("What to give"),
        )
        .argument(
            ArgumentSpec::new("amount", Integer)
                .default(1)
                .rules(Rules::new().range(1.0, 64.0))
                .permission("give.amount")
                .description("How many to give"),
        )
        .flag(Flag::new("silent").short('s').description("Don't announce it"));

    let broadcast = Command::builder("broadcast")
        .alias("bc")
        .description("Send a message to everyone")
        .flag(Flag::new("urgent").short('u').description("Make it loud"))
        .key_value(
            KeyValueSpec::new("color", Choice::new(["red", "green", "blue", "white"]))
                .default("white")
                .description("Text color"),
        )
        .key_value(
            KeyValueSpec::new("repeat", Integer)
                .default(1)
                .description("How many times to send it"),
        )
        .argument(ArgumentSpec::new("message", Text).greedy());

    let admin = Command::builder("admin")
        .description("Server administration")
        .permission("admin.use")
        .subcommand(
            Command::builder("reload")
                .alias("rl")
                .description("Reload the configuration")
                .cooldown(CooldownOptions::global(Duration::from_secs(10))),
        )
        .subcommand(
            Command::builder("kick")
                .description("Remove a player from the server")
                .argument(ArgumentSpec::new("target", Word))
                .argument(ArgumentSpec::new("reason", Text).greedy().optional()),
        )
        .subcommand(
            Command::builder("ban")
                .description("Ban a player, optionally for a limited time")
                .argument(ArgumentSpec::new("target", Word))
                .argument(ArgumentSpec::new("length", Span).optional())
                .confirmation(Duration::from_secs(15)),
        )
        .subcommand(
            Command::builder("stop")
                .description("Stop the server")
                .sender(SenderKind::Console),
        );

    let spawn = Command::builder("spawn")
        .description("Spawn creatures in a square area")
        .argument(ArgumentSpec::new("creature", Word))
        .argument(ArgumentSpec::new("min", Integer))
        .argument(ArgumentSpec::new("max", Integer))
        .validator(CrossValidator::new(|view| {
            match (view.get::<i64>("min"), view.get::<i64>("max")) {
                (Some(min), Some(max)) if min > max => {
                    Some(format!("min ({min}) must not be more than max ({max})"))
                }
                _ => None,
            }
        }))
        .cooldown(CooldownOptions::per_invoker(Duration::from_secs(5)).bypass("spawn.bypass"));

    [give, broadcast, admin, spawn]
        .into_iter()
        .map(|builder| builder.build().context("failed to define the demo commands"))
        .collect()
}

fn print_context(out: &mut impl io::Write, context: &CommandContext) -> io::Result<()> {
    writeln!(out, "{} ({})", context.path().join(" "), context.label())?;

    let mut values: Vec<_> = context.values().iter().collect();
    values.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in values {
        writeln!(out, "  {name} = {value}")?;
    }

    let mut flags: Vec<_> = context.flags().iter().filter(|(_, set)| **set).collect();
    flags.sort();
    for (name, _) in flags {
        writeln!(out, "  --{name}")?;
    }

    let mut key_values: Vec<_> = context.key_values().iter().collect();
    key_values.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in key_values {
        writeln!(out, "  {name}={value}")?;
    }

    for (name, values) in context.multi_values() {
        let list: Vec<String> = values.iter().map(ToString::to_string).collect();
        writeln!(out, "  {name}=[{}]", list.join(", "))?;
    }

    Ok(())
}

fn handle(
    out: &mut impl io::Write,
    commands: &[Command],
    gate: &Gate,
    invoker: &SimpleInvoker,
    line: &str,
) -> anyhow::Result<()> {
    let mut words = line.split_whitespace();
    let label = words.next().ok_or(InputError::Empty)?;
    let tokens: Vec<&str> = words.collect();

    let command = commands
        .iter()
        .find(|command| {
            command.name().eq_ignore_ascii_case(label)
                || command
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(label))
        })
        .ok_or_else(|| {
            let names: Vec<&str> = commands.iter().map(Command::name).collect();
            InputError::UnknownCommand(label.to_owned(), names.join(", "))
        })?;

    debug!(label, ?tokens, "dispatching");

    match command.parse_strict(gate, invoker, label, &tokens[..]) {
        Ok(Parsed::Context(context)) => print_context(out, &context)?,
        Ok(Parsed::HelpPage { command, page }) => write_help_page(out, command, page)?,
        Err(errors) => write_errors(out, &errors)?,
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let commands = commands()?;
    let gate = Gate::new();

    let invoker = match std::env::var("ROSTRUM_CONSOLE") {
        Ok(_) => SimpleInvoker::console(),
        Err(_) => SimpleInvoker::player("demo")
            .with_permission("admin.use")
            .with_permission("give.amount"),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // A command line given as arguments runs once; otherwise read lines
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return handle(&mut out, &commands, &gate, &invoker, &args.join(" "));
    }

    info!("reading commands from stdin");

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;

        if let Err(error) = handle(&mut out, &commands, &gate, &invoker, &line) {
            match error.downcast_ref::<InputError>() {
                Some(InputError::Empty) => continue,
                Some(_) => writeln!(out, "error: {error}")?,
                None => return Err(error),
            }
        }

        out.flush()?;
    }

    Ok(())
}
