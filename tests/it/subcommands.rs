use expect_test::expect;
use rostrum::{
    ArgumentSpec, Command, CommandOptions, Guard, Invoker, SenderKind, SimpleInvoker,
    parsers::{Text, Word},
};

use crate::{check, check_as};

fn admin() -> Command {
    Command::builder("admin")
        .description("Server administration")
        .permission("admin.use")
        .subcommand(
            Command::builder("reload")
                .alias("rl")
                .description("Reload the configuration"),
        )
        .subcommand(
            Command::builder("kick")
                .description("Remove a player from the server")
                .argument(ArgumentSpec::new("target", Word))
                .argument(ArgumentSpec::new("reason", Text).greedy().optional()),
        )
        .subcommand(
            Command::builder("stop")
                .sender(SenderKind::Console)
                .permission("admin.stop"),
        )
        .build()
        .unwrap()
}

fn moderator() -> SimpleInvoker {
    SimpleInvoker::player("alex").with_permission("admin.use")
}

#[test]
fn routing() {
    let admin = admin();
    let moderator = moderator();

    check_as(
        &moderator,
        &admin,
        "reload",
        expect![[r#"
            path: admin reload
        "#]],
    );
    check_as(
        &moderator,
        &admin,
        "kick steve being rude",
        expect![[r#"
            path: admin kick
            reason = Text("being rude")
            target = Text("steve")
        "#]],
    );
}

#[test]
fn aliases_and_case() {
    let admin = admin();
    let moderator = moderator();

    for line in ["rl", "RL", "Reload"] {
        check_as(
            &moderator,
            &admin,
            line,
            expect![[r#"
                path: admin reload
            "#]],
        );
    }
}

#[test]
fn fuzzy_routing() {
    check_as(
        &moderator(),
        &admin(),
        "relaod",
        expect![[r#"
            path: admin reload
        "#]],
    );
}

#[test]
fn unknown_subcommands() {
    check_as(
        &moderator(),
        &admin(),
        "xyz",
        expect![[r#"
            SubcommandNotFound: unknown subcommand "xyz"
        "#]],
    );

    let strict = Command::builder("admin")
        .options(CommandOptions {
            fuzzy: None,
            ..CommandOptions::default()
        })
        .subcommand(Command::builder("reload"))
        .subcommand(Command::builder("kick"))
        .build()
        .unwrap();

    check(
        &strict,
        "relaod",
        expect![[r#"
            SubcommandNotFound: unknown subcommand "relaod" (did you mean "reload"?)
        "#]],
    );
}

#[test]
fn help_pages() {
    let admin = admin();
    let moderator = moderator();

    check_as(
        &moderator,
        &admin,
        "",
        expect![[r#"
            help page 1 for admin
        "#]],
    );
    check_as(
        &moderator,
        &admin,
        "help",
        expect![[r#"
            help page 1 for admin
        "#]],
    );
    check_as(
        &moderator,
        &admin,
        "2",
        expect![[r#"
            help page 2 for admin
        "#]],
    );
}

#[test]
fn permissions_and_senders() {
    let admin = admin();

    check(
        &admin,
        "reload",
        expect![[r#"
            Permission: you don't have permission to use this command
        "#]],
    );
    check_as(
        &moderator(),
        &admin,
        "stop",
        expect![[r#"
            Permission: you don't have permission to use this command
        "#]],
    );
    check_as(
        &moderator().with_permission("admin.stop"),
        &admin,
        "stop",
        expect![[r#"
            SenderKind: this command can only be used by the console
        "#]],
    );
    check_as(
        &SimpleInvoker::console(),
        &admin,
        "stop",
        expect![[r#"
            path: admin stop
        "#]],
    );
}

#[test]
fn requirements_are_inherited() {
    let home = Command::builder("home")
        .sender(SenderKind::Player)
        .subcommand(Command::builder("set").argument(ArgumentSpec::new("name", Word)))
        .build()
        .unwrap();

    check(
        &home,
        "set base",
        expect![[r#"
            path: home set
            name = Text("base")
        "#]],
    );
    check_as(
        &SimpleInvoker::console(),
        &home,
        "set base",
        expect![[r#"
            SenderKind: this command can only be used by players
        "#]],
    );
}

#[test]
fn guards() {
    let fly = Command::builder("fly")
        .guard(Guard::new("you must be in creative mode", |invoker: &dyn Invoker| {
            invoker.has_permission("mode.creative")
        }))
        .build()
        .unwrap();

    check(
        &fly,
        "",
        expect![[r#"
            GuardFailed: you must be in creative mode
        "#]],
    );
    check_as(
        &SimpleInvoker::player("alex").with_permission("mode.creative"),
        &fly,
        "",
        expect![[r#"
            path: fly
        "#]],
    );
}

fn warp() -> Command {
    Command::builder("warp")
        .argument(ArgumentSpec::new("destination", Word))
        .subcommand(Command::builder("list"))
        .build()
        .unwrap()
}

#[test]
fn own_arguments_beside_subcommands() {
    let warp = warp();

    check(
        &warp,
        "list",
        expect![[r#"
            path: warp list
        "#]],
    );
    check(
        &warp,
        "nether",
        expect![[r#"
            path: warp
            destination = Text("nether")
        "#]],
    );
    check(
        &warp,
        "lst",
        expect![[r#"
            path: warp
            destination = Text("lst")
        "#]],
    );
    check(
        &warp,
        "2",
        expect![[r#"
            path: warp
            destination = Text("2")
        "#]],
    );
    check(
        &warp,
        "",
        expect![[r#"
            Usage: missing required argument <destination>
        "#]],
    );
}

#[test]
fn labels_and_raw_tokens() {
    let admin = admin();
    let errors = admin
        .parse(&moderator(), "adm", &["rl", "now"])
        .unwrap_err();
    assert_eq!(
        errors.first().to_string(),
        r#"too many arguments: unexpected "now""#
    );

    let parsed = admin.parse(&moderator(), "adm", &["rl"]).unwrap();
    let context = parsed.context().unwrap();
    assert_eq!(context.label(), "adm");
    assert_eq!(context.path(), ["admin", "reload"]);
    assert_eq!(context.raw_tokens(), ["rl"]);
}

#[test]
fn a_help_subcommand_wins_over_help_pages() {
    let server = Command::builder("server")
        .subcommand(Command::builder("reload"))
        .subcommand(Command::builder("help"))
        .subcommand(Command::builder("status"))
        .build()
        .unwrap();

    check(
        &server,
        "relaod",
        expect![[r#"
            path: server reload
        "#]],
    );
    check(
        &server,
        "help",
        expect![[r#"
            path: server help
        "#]],
    );
    check(
        &server,
        "xyz",
        expect![[r#"
            SubcommandNotFound: unknown subcommand "xyz"
        "#]],
    );
}
