use expect_test::{Expect, expect};
use rostrum::{
    ArgumentSpec, Command, CommandOptions, Flag, HelpOptions, KeyValueSpec, Parsed,
    SimpleInvoker,
    parsers::{Integer, Text, Word},
    printers::write_help_page,
};

fn admin() -> Command {
    Command::builder("admin")
        .description("Server administration")
        .options(CommandOptions {
            help: Some(HelpOptions { page_size: 2 }),
            ..CommandOptions::default()
        })
        .subcommand(Command::builder("reload").description("Reload the configuration"))
        .subcommand(
            Command::builder("kick")
                .description("Remove a player from the server")
                .argument(ArgumentSpec::new("target", Word))
                .argument(ArgumentSpec::new("reason", Text).greedy().optional()),
        )
        .subcommand(Command::builder("stop"))
        .build()
        .unwrap()
}

/// Parse a command line that should ask for help, and print the page
fn check_help(command: &Command, args: &[&str], expect: Expect) {
    let invoker = SimpleInvoker::player("steve");

    let Parsed::HelpPage { command, page } = command.parse(&invoker, "admin", args).unwrap() else {
        panic!("expected a help page");
    };

    let mut out = Vec::new();
    write_help_page(&mut out, command, page).unwrap();
    expect.assert_eq(&String::from_utf8(out).unwrap());
}

#[test]
fn first_page() {
    check_help(
        &admin(),
        &[],
        expect![[r#"
            admin <COMMAND>
              Server administration
            (page 1 of 2)

            Commands:
              reload              Reload the configuration
              kick <target> [reason...]
                  Remove a player from the server
        "#]],
    );
}

#[test]
fn later_pages() {
    let admin = admin();

    check_help(
        &admin,
        &["2"],
        expect![[r#"
            admin <COMMAND>
              Server administration
            (page 2 of 2)

            Commands:
              stop
        "#]],
    );

    // Past the end shows the last page
    check_help(
        &admin,
        &["9"],
        expect![[r#"
            admin <COMMAND>
              Server administration
            (page 2 of 2)

            Commands:
              stop
        "#]],
    );
}

#[test]
fn sections() {
    let give = Command::builder("give")
        .description("Give an item to a player")
        .argument(ArgumentSpec::new("item", Word).description("The item to give"))
        .argument(
            ArgumentSpec::new("amount", Integer)
                .default(1)
                .description("How many"),
        )
        .flag(Flag::new("silent").short('s').description("Don't announce it"))
        .key_value(
            KeyValueSpec::new("to", Word)
                .optional()
                .description("Who gets it"),
        )
        .build()
        .unwrap();

    let mut out = Vec::new();
    write_help_page(&mut out, &give, 1).unwrap();

    expect![[r#"
        give [OPTIONS] <item> [amount]
          Give an item to a player

        Arguments:
          <item>              The item to give
          [amount]            How many

        Flags:
          -s, --silent        Don't announce it

        Options:
          [to=<word>]         Who gets it
    "#]]
    .assert_eq(&String::from_utf8(out).unwrap());
}
