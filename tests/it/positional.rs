use expect_test::expect;
use rostrum::{
    ArgumentSpec, Command, CommandOptions, ErrorKind, Rules, SimpleInvoker,
    parsers::{Choice, Integer, Text, Word},
    value::{ParseOutcome, Value, parser_fn},
};

use crate::{check, check_as};

fn pay() -> Command {
    Command::builder("pay")
        .argument(ArgumentSpec::new("target", Word))
        .argument(ArgumentSpec::new("amount", Integer).rules(Rules::new().range(1.0, None)))
        .build()
        .unwrap()
}

#[test]
fn arity() {
    let pay = pay();

    check(
        &pay,
        "alex 5",
        expect![[r#"
            path: pay
            amount = Integer(5)
            target = Text("alex")
        "#]],
    );
    check(
        &pay,
        "alex",
        expect![[r#"
            Usage: missing required argument <amount>
        "#]],
    );
    check(
        &pay,
        "alex 5 6",
        expect![[r#"
            Usage: too many arguments: unexpected "6"
        "#]],
    );
    check(
        &pay,
        "alex five",
        expect![[r#"
            Parsing: invalid integer for <amount>: invalid digit found in string
        "#]],
    );
    check(
        &pay,
        "alex 0",
        expect![[r#"
            Validation: <amount>: must be at least 1
        "#]],
    );
}

#[test]
fn arity_of_required_arguments() {
    let invoker = SimpleInvoker::player("steve");

    for count in 1..=5 {
        let command = (0..count)
            .fold(Command::builder("cmd"), |builder, i| {
                builder.argument(ArgumentSpec::new(format!("arg{i}"), Word))
            })
            .build()
            .unwrap();

        let tokens: Vec<String> = (0..=count).map(|i| format!("t{i}")).collect();

        let parsed = command.parse(&invoker, "cmd", &tokens[..count]).unwrap();
        assert_eq!(parsed.context().unwrap().values().len(), count);

        let errors = command
            .parse(&invoker, "cmd", &tokens[..count - 1])
            .unwrap_err();
        assert_eq!(errors.kinds(), [ErrorKind::Usage]);

        let errors = command.parse(&invoker, "cmd", &tokens[..]).unwrap_err();
        assert_eq!(errors.kinds(), [ErrorKind::Usage]);
        assert!(errors.first().to_string().starts_with("too many arguments"));
    }
}

#[test]
fn greedy() {
    let say = Command::builder("say")
        .argument(ArgumentSpec::new("message", Text).greedy())
        .build()
        .unwrap();

    check(
        &say,
        "hello world",
        expect![[r#"
            path: say
            message = Text("hello world")
        "#]],
    );

    let tell = Command::builder("tell")
        .argument(ArgumentSpec::new("target", Word))
        .argument(ArgumentSpec::new("message", Text).greedy())
        .build()
        .unwrap();

    check(
        &tell,
        r#"alex "see you" at spawn"#,
        expect![[r#"
            path: tell
            message = Text("see you at spawn")
            target = Text("alex")
        "#]],
    );
    check(
        &tell,
        "alex",
        expect![[r#"
            Usage: missing required argument <message>
        "#]],
    );
}

#[test]
fn skipped_greedy_leaves_extra_tokens() {
    let note = Command::builder("note")
        .argument(ArgumentSpec::new("title", Word))
        .argument(
            ArgumentSpec::new("body", Text)
                .greedy()
                .optional()
                .condition(|view| view.get::<&str>("title") != Some("empty")),
        )
        .build()
        .unwrap();

    check(
        &note,
        "todo buy milk",
        expect![[r#"
            path: note
            body = Text("buy milk")
            title = Text("todo")
        "#]],
    );
    check(
        &note,
        "empty buy milk",
        expect![[r#"
            Usage: too many arguments: unexpected "buy"
        "#]],
    );
}

fn fill() -> Command {
    Command::builder("fill")
        .argument(ArgumentSpec::new("shape", Choice::new(["circle", "square"])))
        .argument(
            ArgumentSpec::new("radius", Integer)
                .default(5)
                .condition(|view| view.get::<&str>("shape") == Some("circle")),
        )
        .argument(ArgumentSpec::new("block", Word).optional())
        .build()
        .unwrap()
}

#[test]
fn conditions() {
    let fill = fill();

    check(
        &fill,
        "square stone",
        expect![[r#"
            path: fill
            block = Text("stone")
            shape = Text("square")
        "#]],
    );
    check(
        &fill,
        "CIRCLE 3 stone",
        expect![[r#"
            path: fill
            block = Text("stone")
            radius = Integer(3)
            shape = Text("circle")
        "#]],
    );
    check(
        &fill,
        "circle",
        expect![[r#"
            path: fill
            radius = Integer(5)
            shape = Text("circle")
        "#]],
    );
    check(
        &fill,
        "triangle",
        expect![[r#"
            Parsing: invalid choice for <shape>: expected one of circle, square
        "#]],
    );
}

#[test]
fn argument_permissions() {
    let give = Command::builder("give")
        .argument(ArgumentSpec::new("item", Word))
        .argument(
            ArgumentSpec::new("amount", Integer)
                .default(1)
                .permission("give.amount"),
        )
        .build()
        .unwrap();

    check(
        &give,
        "apple",
        expect![[r#"
            path: give
            amount = Integer(1)
            item = Text("apple")
        "#]],
    );
    check(
        &give,
        "apple 5",
        expect![[r#"
            Usage: too many arguments: unexpected "5"
        "#]],
    );
    check_as(
        &SimpleInvoker::player("op").with_permission("give.amount"),
        &give,
        "apple 5",
        expect![[r#"
            path: give
            amount = Integer(5)
            item = Text("apple")
        "#]],
    );
}

#[test]
fn sanitizing() {
    let broadcast = Command::builder("broadcast")
        .options(CommandOptions {
            sanitize: true,
            ..CommandOptions::default()
        })
        .argument(ArgumentSpec::new("message", Text).greedy())
        .build()
        .unwrap();

    check(
        &broadcast,
        "<red>hi there",
        expect![[r#"
            path: broadcast
            message = Text("\\<red\\>hi there")
        "#]],
    );
}

#[test]
fn misbehaving_parsers_are_contained() {
    let command = Command::builder("risky")
        .argument(ArgumentSpec::new(
            "thing",
            parser_fn("thing", |_| -> ParseOutcome<Value> { panic!("parser exploded") }),
        ))
        .build()
        .unwrap();

    check(
        &command,
        "x",
        expect![[r#"
            Internal: internal error while handling <thing>: parser exploded
        "#]],
    );
}

#[test]
fn transformed_values() {
    let command = Command::builder("shout")
        .argument(
            ArgumentSpec::new("message", Text)
                .greedy()
                .transform(|value| match value {
                    Value::Text(text) => Ok(Value::Text(text.to_uppercase())),
                    other => Err(format!("unexpected {}", other.kind_name())),
                })
                .rules(Rules::new().length(None, 10)),
        )
        .build()
        .unwrap();

    check(
        &command,
        "hi all",
        expect![[r#"
            path: shout
            message = Text("HI ALL")
        "#]],
    );
    check(
        &command,
        "hello everyone",
        expect![[r#"
            Validation: <message>: must be at most 10 characters long
        "#]],
    );
}
