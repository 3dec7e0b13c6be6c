use expect_test::expect;
use pretty_assertions::assert_eq;
use rostrum::{
    ArgumentSpec, Command, CommandOptions, Flag, KeyValueSpec, SimpleInvoker,
    parsers::{Integer, Text, Word},
};

use crate::{check, check_as, rendered};

fn broadcast() -> Command {
    Command::builder("broadcast")
        .flag(Flag::new("silent").short('s'))
        .flag(Flag::new("urgent").short('u'))
        .key_value(KeyValueSpec::new("times", Integer).default(1))
        .key_value(KeyValueSpec::new("color", Word).optional())
        .argument(ArgumentSpec::new("message", Text).greedy())
        .build()
        .unwrap()
}

#[test]
fn defaults() {
    check(
        &broadcast(),
        "hello world",
        expect![[r#"
            path: broadcast
            message = Text("hello world")
            flag silent = false
            flag urgent = false
            key times = Integer(1)
        "#]],
    );
}

#[test]
fn flags() {
    let broadcast = broadcast();

    check(
        &broadcast,
        "-su hello",
        expect![[r#"
            path: broadcast
            message = Text("hello")
            flag silent = true
            flag urgent = true
            key times = Integer(1)
        "#]],
    );
    check(
        &broadcast,
        "hello --urgent",
        expect![[r#"
            path: broadcast
            message = Text("hello")
            flag silent = false
            flag urgent = true
            key times = Integer(1)
        "#]],
    );
    assert_eq!(
        rendered(&broadcast, "--no-silent hello"),
        rendered(&broadcast, "hello"),
    );
}

#[test]
fn contradicting_flags() {
    check(
        &broadcast(),
        "-s --no-silent hello",
        expect![[r#"
            Usage: flag <silent> was both set and unset
        "#]],
    );
}

#[test]
fn repeated_flags_are_fine() {
    let broadcast = broadcast();
    assert_eq!(
        rendered(&broadcast, "-s --silent -s hello"),
        rendered(&broadcast, "-s hello"),
    );
}

#[test]
fn flags_dont_take_values() {
    check(
        &broadcast(),
        "--silent=yes hello",
        expect![[r#"
            Usage: flag --silent doesn't take a value
        "#]],
    );
}

#[test]
fn options_go_anywhere() {
    let broadcast = broadcast();
    let expected = rendered(&broadcast, "-s times=3 hello world");

    assert_eq!(rendered(&broadcast, "hello times=3 world -s"), expected);
    assert_eq!(rendered(&broadcast, "hello world -s times=3"), expected);
    assert_eq!(rendered(&broadcast, "times=3 hello -s world"), expected);
}

#[test]
fn key_value_syntaxes() {
    let broadcast = broadcast();
    let expected = expect![[r#"
        path: broadcast
        message = Text("hi")
        flag silent = false
        flag urgent = false
        key times = Integer(3)
    "#]];

    expected.assert_eq(&rendered(&broadcast, "times=3 hi"));
    expected.assert_eq(&rendered(&broadcast, "times:3 hi"));
    expected.assert_eq(&rendered(&broadcast, "--times 3 hi"));
    expected.assert_eq(&rendered(&broadcast, "--times=3 hi"));
}

#[test]
fn multi_values() {
    let broadcast = broadcast();

    check(
        &broadcast,
        "color=red,blue hi",
        expect![[r#"
            path: broadcast
            message = Text("hi")
            flag silent = false
            flag urgent = false
            key times = Integer(1)
            multi color = [Text("red"), Text("blue")]
        "#]],
    );
    check(
        &broadcast,
        r#"color="red,blue" hi"#,
        expect![[r#"
            path: broadcast
            message = Text("hi")
            flag silent = false
            flag urgent = false
            key color = Text("red,blue")
            key times = Integer(1)
        "#]],
    );
    check(
        &broadcast,
        "times=1,x hi",
        expect![[r#"
            Parsing: invalid integer for <times>: invalid digit found in string
        "#]],
    );
}

#[test]
fn key_value_errors() {
    let broadcast = broadcast();

    check(
        &broadcast,
        "times=2 times=3 hi",
        expect![[r#"
            Usage: option times was given more than once
        "#]],
    );
    check(
        &broadcast,
        "hi --times",
        expect![[r#"
            Usage: option --times needs a value
        "#]],
    );
    check(
        &broadcast,
        "times=lots hi",
        expect![[r#"
            Parsing: invalid integer for <times>: invalid digit found in string
        "#]],
    );
}

#[test]
fn separator() {
    check(
        &broadcast(),
        "-- -s times=3",
        expect![[r#"
            path: broadcast
            message = Text("-s times=3")
            flag silent = false
            flag urgent = false
            key times = Integer(1)
        "#]],
    );
}

#[test]
fn undeclared_options_are_positional() {
    let broadcast = broadcast();

    check(
        &broadcast,
        "--loud -x volume=11 hi",
        expect![[r#"
            path: broadcast
            message = Text("--loud -x volume=11 hi")
            flag silent = false
            flag urgent = false
            key times = Integer(1)
        "#]],
    );
    check(
        &broadcast,
        r#""-s" hi"#,
        expect![[r#"
            path: broadcast
            message = Text("-s hi")
            flag silent = false
            flag urgent = false
            key times = Integer(1)
        "#]],
    );
}

#[test]
fn quoting_can_be_disabled() {
    let echo = Command::builder("echo")
        .options(CommandOptions {
            quoting: false,
            ..CommandOptions::default()
        })
        .argument(ArgumentSpec::new("first", Word))
        .argument(ArgumentSpec::new("second", Word))
        .build()
        .unwrap();

    check(
        &echo,
        r#""hello world""#,
        expect![[r#"
            path: echo
            first = Text("\"hello")
            second = Text("world\"")
        "#]],
    );
}

fn warp() -> Command {
    Command::builder("warp")
        .flag(Flag::new("force").short('f').permission("warp.force"))
        .key_value(KeyValueSpec::new("destination", Word).key("to"))
        .build()
        .unwrap()
}

#[test]
fn required_key_values() {
    let warp = warp();

    check(
        &warp,
        "to:nether",
        expect![[r#"
            path: warp
            flag force = false
            key destination = Text("nether")
        "#]],
    );
    check(
        &warp,
        "",
        expect![[r#"
            Usage: missing required option to=<destination>
        "#]],
    );
}

#[test]
fn option_permissions() {
    let warp = warp();

    check(
        &warp,
        "-f to=end",
        expect![[r#"
            ArgumentPermission: you don't have permission to use <force>
        "#]],
    );
    check_as(
        &SimpleInvoker::player("op").with_permission("warp.force"),
        &warp,
        "-f to=end",
        expect![[r#"
            path: warp
            flag force = true
            key destination = Text("end")
        "#]],
    );
}
