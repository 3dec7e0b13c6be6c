use std::{sync::Arc, time::Duration};

use pretty_assertions::assert_eq;
use rostrum::{
    ArgumentSpec, Command, CooldownOptions, ErrorKind, Gate, GateConfig, GateStore, Invoker,
    SimpleInvoker,
    gate::ManualClock,
    parsers::{Integer, Word},
    printers::error_message,
};

struct Fixture {
    clock: Arc<ManualClock>,
    gate: Gate,
}

impl Fixture {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let gate = Gate::with_parts(
            Arc::new(GateStore::new()),
            clock.clone(),
            GateConfig::default(),
        );

        Self { clock, gate }
    }

    /// Parse strictly, rendering the outcome as a single line
    fn run(&self, command: &Command, invoker: &dyn Invoker, args: &[&str]) -> String {
        match command.parse_strict(&self.gate, invoker, command.name(), args) {
            Ok(parsed) => match parsed.context() {
                Some(context) => format!("ok: {}", context.path().join(" ")),
                None => "help".to_owned(),
            },
            Err(errors) => format!("{:?}: {}", errors.first().kind(), error_message(errors.first())),
        }
    }
}

fn heal() -> Command {
    Command::builder("heal")
        .argument(ArgumentSpec::new("amount", Integer))
        .cooldown(CooldownOptions::per_invoker(Duration::from_secs(30)).bypass("heal.bypass"))
        .build()
        .unwrap()
}

#[test]
fn per_invoker_cooldown() {
    let fixture = Fixture::new();
    let heal = heal();
    let steve = SimpleInvoker::player("steve");
    let alex = SimpleInvoker::player("alex");

    assert_eq!(fixture.run(&heal, &steve, &["5"]), "ok: heal");
    assert_eq!(
        fixture.run(&heal, &steve, &["5"]),
        "Cooldown: this command is on cooldown for another 30s"
    );
    assert_eq!(fixture.run(&heal, &alex, &["5"]), "ok: heal");

    fixture.clock.advance(Duration::from_secs(20));
    assert_eq!(
        fixture.run(&heal, &steve, &["5"]),
        "Cooldown: this command is on cooldown for another 10s"
    );

    fixture.clock.advance(Duration::from_secs(10));
    assert_eq!(fixture.run(&heal, &steve, &["5"]), "ok: heal");
}

#[test]
fn failed_parses_dont_start_cooldowns() {
    let fixture = Fixture::new();
    let heal = heal();
    let steve = SimpleInvoker::player("steve");

    assert_eq!(
        fixture.run(&heal, &steve, &["lots"]),
        "Parsing: invalid integer for <amount>: invalid digit found in string"
    );
    assert_eq!(fixture.run(&heal, &steve, &["5"]), "ok: heal");
}

#[test]
fn cooldown_bypass() {
    let fixture = Fixture::new();
    let heal = heal();
    let medic = SimpleInvoker::player("medic").with_permission("heal.bypass");

    assert_eq!(fixture.run(&heal, &medic, &["5"]), "ok: heal");
    assert_eq!(fixture.run(&heal, &medic, &["5"]), "ok: heal");
}

#[test]
fn plain_parse_ignores_the_gate() {
    let heal = heal();
    let steve = SimpleInvoker::player("steve");

    for _ in 0..3 {
        assert!(heal.parse(&steve, "heal", &["5"]).is_ok());
    }
}

#[test]
fn global_cooldown() {
    let fixture = Fixture::new();
    let restart = Command::builder("restart")
        .cooldown(CooldownOptions::global(Duration::from_secs(60)))
        .build()
        .unwrap();

    assert_eq!(
        fixture.run(&restart, &SimpleInvoker::player("steve"), &[]),
        "ok: restart"
    );
    assert_eq!(
        fixture.run(&restart, &SimpleInvoker::player("alex"), &[]),
        "Cooldown: this command is on cooldown for another 1m"
    );
}

#[test]
fn confirmation() {
    let fixture = Fixture::new();
    let wipe = Command::builder("wipe")
        .argument(ArgumentSpec::new("world", Word))
        .confirmation(Duration::from_secs(10))
        .build()
        .unwrap();
    let steve = SimpleInvoker::player("steve");

    let needs_confirmation =
        "ConfirmationRequired: this command needs confirmation: run it again within 10s to confirm";

    assert_eq!(fixture.run(&wipe, &steve, &["nether"]), needs_confirmation);
    assert_eq!(fixture.run(&wipe, &steve, &["nether"]), "ok: wipe");

    // Confirmations are used up
    assert_eq!(fixture.run(&wipe, &steve, &["nether"]), needs_confirmation);

    // and expire
    fixture.clock.advance(Duration::from_secs(11));
    assert_eq!(fixture.run(&wipe, &steve, &["nether"]), needs_confirmation);
    assert_eq!(fixture.run(&wipe, &steve, &["nether"]), "ok: wipe");
}

#[test]
fn subcommand_gates_are_separate() {
    let fixture = Fixture::new();
    let kit = Command::builder("kit")
        .subcommand(
            Command::builder("starter").cooldown(CooldownOptions::per_invoker(Duration::from_secs(5))),
        )
        .subcommand(
            Command::builder("tools").cooldown(CooldownOptions::per_invoker(Duration::from_secs(5))),
        )
        .build()
        .unwrap();
    let steve = SimpleInvoker::player("steve");

    assert_eq!(fixture.run(&kit, &steve, &["starter"]), "ok: kit starter");
    assert_eq!(fixture.run(&kit, &steve, &["tools"]), "ok: kit tools");

    let errors = kit
        .parse_strict(&fixture.gate, &steve, "kit", &["starter"])
        .unwrap_err();
    assert_eq!(errors.kinds(), [ErrorKind::Cooldown]);
    assert!(errors.first().is_retryable());

    // Help pages never start a cooldown
    assert_eq!(fixture.run(&kit, &steve, &[]), "help");
}

#[test]
fn gates_share_a_store() {
    let store = Arc::new(GateStore::new());
    let clock = Arc::new(ManualClock::new());
    let first = Gate::with_parts(store.clone(), clock.clone(), GateConfig::default());
    let second = Gate::with_parts(store.clone(), clock, GateConfig::default());

    let heal = heal();
    let steve = SimpleInvoker::player("steve");

    assert!(heal.parse_strict(&first, &steve, "heal", &["1"]).is_ok());
    assert!(heal.parse_strict(&second, &steve, "heal", &["1"]).is_err());
    assert_eq!(store.len(), 1);
}
