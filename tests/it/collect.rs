use expect_test::expect;
use pretty_assertions::assert_eq;
use rostrum::{
    ArgumentSpec, Command, CrossValidator, ErrorKind, Flag, Rules, SimpleInvoker,
    parsers::{Float, Integer, Text, Word},
    printers::write_errors,
};

use crate::{check, check_all};

fn order() -> Command {
    Command::builder("order")
        .flag(Flag::new("rush").short('r').permission("order.rush"))
        .argument(ArgumentSpec::new("item", Word))
        .argument(ArgumentSpec::new("amount", Integer).rules(Rules::new().range(1.0, 64.0)))
        .argument(ArgumentSpec::new("price", Float))
        .argument(ArgumentSpec::new("note", Text).greedy().optional())
        .build()
        .unwrap()
}

#[test]
fn every_failing_argument_is_reported() {
    let order = order();

    check_all(
        &order,
        "apple 100 cheap",
        expect![[r#"
            Validation: <amount>: must be between 1 and 64
            Parsing: invalid number for <price>: invalid float literal
        "#]],
    );
    check(
        &order,
        "apple 100 cheap",
        expect![[r#"
            Validation: <amount>: must be between 1 and 64
        "#]],
    );
}

#[test]
fn every_missing_argument_is_reported() {
    check_all(
        &order(),
        "apple",
        expect![[r#"
            Usage: missing required argument <amount>
            Usage: missing required argument <price>
        "#]],
    );
}

#[test]
fn option_errors_come_first() {
    check_all(
        &order(),
        "apple -r 100 2.5 as soon as possible",
        expect![[r#"
            ArgumentPermission: you don't have permission to use <rush>
            Validation: <amount>: must be between 1 and 64
        "#]],
    );
}

#[test]
fn successful_parses_are_the_same_in_both_modes() {
    let order = order();
    let invoker = SimpleInvoker::player("steve");
    let tokens = ["apple", "12", "2.5", "leave", "it", "outside"];

    let fail_fast = order.parse(&invoker, "order", &tokens).unwrap();
    let collect_all = order.parse_all(&invoker, "order", &tokens).unwrap();

    assert_eq!(fail_fast.context(), collect_all.context());
    assert_eq!(
        fail_fast.context().unwrap().get::<&str>("note"),
        Some("leave it outside")
    );
}

fn between() -> Command {
    Command::builder("between")
        .argument(ArgumentSpec::new("min", Integer))
        .argument(ArgumentSpec::new("max", Integer))
        .validator(CrossValidator::new(|view| {
            match (view.get::<i64>("min"), view.get::<i64>("max")) {
                (Some(min), Some(max)) if min > max => Some("min must not exceed max".to_owned()),
                _ => None,
            }
        }))
        .validator(CrossValidator::new(|view| {
            match view.get::<i64>("max") {
                Some(max) if max <= 0 => Some("max must be positive".to_owned()),
                _ => None,
            }
        }))
        .build()
        .unwrap()
}

#[test]
fn cross_validation() {
    let between = between();

    check(
        &between,
        "1 10",
        expect![[r#"
            path: between
            max = Integer(10)
            min = Integer(1)
        "#]],
    );
    check(
        &between,
        "5 -3",
        expect![[r#"
            CrossValidation: min must not exceed max
        "#]],
    );
    check_all(
        &between,
        "5 -3",
        expect![[r#"
            CrossValidation: min must not exceed max
            CrossValidation: max must be positive
        "#]],
    );
}

#[test]
fn cross_validation_needs_valid_arguments() {
    check_all(
        &between(),
        "five -3",
        expect![[r#"
            Parsing: invalid integer for <min>: invalid digit found in string
        "#]],
    );
}

#[test]
fn panicking_cross_validators_are_internal_errors() {
    let range = Command::builder("range")
        .argument(ArgumentSpec::new("min", Integer))
        .argument(ArgumentSpec::new("max", Integer))
        .validator(CrossValidator::new(|_| panic!("broken validator")))
        .validator(CrossValidator::new(|view| {
            (view.get::<i64>("max")? <= 0).then(|| "max must be positive".to_owned())
        }))
        .build()
        .unwrap();

    check(
        &range,
        "1 10",
        expect![[r#"
            Internal: internal error: broken validator
        "#]],
    );
    check_all(
        &range,
        "5 -3",
        expect![[r#"
            Internal: internal error: broken validator
            CrossValidation: max must be positive
        "#]],
    );
}

#[test]
fn printing_errors() {
    let order = order();
    let invoker = SimpleInvoker::player("steve");

    let errors = order
        .parse_all(&invoker, "order", &["apple", "100", "cheap"])
        .unwrap_err();
    assert_eq!(errors.kinds(), [ErrorKind::Validation, ErrorKind::Parsing]);

    let mut out = Vec::new();
    write_errors(&mut out, &errors).unwrap();
    expect![[r#"
        2 errors:
          - <amount>: must be between 1 and 64
          - invalid number for <price>: invalid float literal
    "#]]
    .assert_eq(&String::from_utf8(out).unwrap());

    let errors = order
        .parse(&invoker, "order", &["apple", "100", "cheap"])
        .unwrap_err();

    let mut out = Vec::new();
    write_errors(&mut out, &errors).unwrap();
    expect![[r#"
        error: <amount>: must be between 1 and 64
    "#]]
    .assert_eq(&String::from_utf8(out).unwrap());
}
