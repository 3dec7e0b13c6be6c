/*!
A typed, permission-aware parser for text commands, the kind typed into the
chat box or console of a game server.

Define a [`Command`] once, with positional arguments ([`ArgumentSpec`]),
flags ([`Flag`]), key-value options ([`KeyValueSpec`]) and nested
subcommands, then hand it the words a user typed. You get back either a
[`CommandContext`] full of typed values, or a [`ParseErrors`] list explaining
precisely what was wrong:

```
use rostrum::{ArgumentSpec, Command, Flag, SimpleInvoker, parsers::{Integer, Word}};

let give = Command::builder("give")
    .argument(ArgumentSpec::new("item", Word))
    .argument(ArgumentSpec::new("amount", Integer).default(1))
    .flag(Flag::new("silent").short('s'))
    .build()
    .unwrap();

let steve = SimpleInvoker::player("steve");
let parsed = give.parse(&steve, "give", &["apple", "-s"]).unwrap();
let context = parsed.context().unwrap();

assert_eq!(context.get::<&str>("item"), Some("apple"));
assert_eq!(context.get::<i64>("amount"), Some(1));
assert!(context.flag("silent"));
```

Parsing is a pure function of the command, the tokens and the invoker's
permissions, and is safe to run concurrently. The only state that outlives a
parse is cooldowns and confirmations, which live in a [`Gate`] and are only
enforced by [`Command::parse_strict`].
*/

use std::panic::{self, AssertUnwindSafe};

mod command;
mod context;
mod definition;
pub mod errors;
mod extract;
pub mod gate;
mod invoker;
mod options;
pub mod parsers;
mod pipeline;
pub mod printers;
mod router;
pub mod rules;
pub mod sanitize;
pub mod value;

pub use command::{Command, CommandBuilder, ParseResult, Parsed};
pub use context::{CommandContext, ContextView};
pub use definition::{ArgumentSpec, Flag, Guard, KeyValueSpec, Tags};
pub use errors::{CommandParseError, DefinitionError, ErrorKind, ParseErrors};
pub use gate::{Gate, GateStore};
pub use invoker::{Invoker, SenderKind, SimpleInvoker};
pub use options::{CommandOptions, CooldownOptions, GateConfig, HelpOptions};
pub use rules::{CrossValidator, Rule, Rules};
pub use value::{FromValue, ParseOutcome, Value, ValueParser, parser_fn};

/// Run a callback supplied by a command definition (a parser, transformer or
/// validation rule), catching a panic and turning it into its message.
pub(crate) fn isolate<T>(op: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(op)).map_err(|payload| {
        if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_owned()
        } else {
            "panicked".to_owned()
        }
    })
}
