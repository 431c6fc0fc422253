//! Failure shapes, samples, and resolved positions.

mod common;

use common::{grammar_of, tree_adapter, Tree};
use matra::operator::{
    action, call, call_as, choice, guard, literal, pattern_described, sequence, text_of,
};
use matra::{
    ActionOutcome, Expectation, Failure, Flow, Grammar, ParseOptions, Position, Sample,
};

fn expected(expectation: Expectation, found: Sample) -> Failure {
    Failure::Expected { expectation, found }
}

// ---
// Literal expectations
// ---

#[test]
fn literal_failure_samples_one_character() {
    // The sample is the single character at the position, never the
    // remainder.
    let grammar = grammar_of(literal("abc"));
    let err = grammar.parse("ab").unwrap_err();
    assert_eq!(
        err.failure,
        expected(
            Expectation::Value("abc".into()),
            Sample::Found("a".into())
        )
    );
    assert_eq!(err.position, Position { line: 0, column: 0 });
    assert_eq!(err.offset, 0);
}

#[test]
fn literal_failure_at_end_of_input() {
    let grammar = grammar_of(literal("abc"));
    let err = grammar.parse("").unwrap_err();
    assert_eq!(
        err.failure,
        expected(Expectation::Value("abc".into()), Sample::EndOfInput)
    );
}

#[test]
fn residual_input_becomes_expected_end_of_input() {
    let grammar = grammar_of(literal("abc"));
    let err = grammar.parse("abcd").unwrap_err();
    assert_eq!(
        err.failure,
        expected(Expectation::EndOfInput, Sample::Found("d".into()))
    );
    assert_eq!(err.position, Position { line: 0, column: 3 });
    assert_eq!(err.offset, 3);
}

#[test]
fn residual_input_position_counts_lines() {
    let grammar = grammar_of(literal("ab\ncd"));
    let err = grammar.parse("ab\ncdEXTRA").unwrap_err();
    assert_eq!(err.position, Position { line: 1, column: 2 });
    assert_eq!(
        err.failure,
        expected(Expectation::EndOfInput, Sample::Found("E".into()))
    );
}

// ---
// Aggregate failures
// ---

#[test]
fn choice_failure_lists_every_alternative_in_order() {
    let grammar = grammar_of(choice(vec![literal("a"), literal("b"), literal("c")]));
    let err = grammar.parse("d").unwrap_err();
    let Failure::AllChoicesFailed { causes, found } = &err.failure else {
        panic!("expected an aggregate failure, got {:?}", err.failure);
    };
    assert_eq!(found, &Sample::Found("d".into()));
    let expectations: Vec<_> = causes
        .iter()
        .map(|cause| match cause {
            Failure::Expected { expectation, .. } => expectation.clone(),
            other => panic!("unexpected cause {:?}", other),
        })
        .collect();
    assert_eq!(
        expectations,
        vec![
            Expectation::Value("a".into()),
            Expectation::Value("b".into()),
            Expectation::Value("c".into()),
        ]
    );
}

#[test]
fn choice_samples_its_entry_character() {
    // The aggregate sample is the char where the choice began, not where
    // the deepest alternative stopped.
    let grammar = grammar_of(choice(vec![literal("a"), literal("b"), literal("c")]));
    let err = grammar.parse("foo").unwrap_err();
    let Failure::AllChoicesFailed { found, .. } = &err.failure else {
        panic!("expected an aggregate failure");
    };
    assert_eq!(found, &Sample::Found("f".into()));
}

#[test]
fn rule_failure_is_wrapped_with_the_rule_name() {
    let grammar = Grammar::from_rules(
        vec![("test", literal("foo")), ("start", call("test"))],
        tree_adapter(),
    );
    let err = grammar.parse("bar").unwrap_err();
    assert_eq!(
        err.failure,
        Failure::InRule {
            rule: "test".into(),
            cause: Box::new(expected(
                Expectation::Value("foo".into()),
                Sample::Found("b".into())
            )),
        }
    );
    assert_eq!(err.position, Position { line: 0, column: 0 });
}

// ---
// Configuration failures
// ---

#[test]
fn missing_start_rule_fails_at_origin() {
    let grammar: Grammar<Tree> = Grammar::new(tree_adapter());
    let err = grammar.parse("anything").unwrap_err();
    assert_eq!(
        err.failure,
        Failure::NoStartRule {
            name: "start".into()
        }
    );
    assert_eq!(err.position, Position { line: 0, column: 0 });
}

#[test]
fn missing_call_target_names_the_rule() {
    let grammar = Grammar::from_rules(vec![("start", call("nope"))], tree_adapter());
    let err = grammar.parse("x").unwrap_err();
    assert_eq!(
        err.failure,
        expected(Expectation::Rule("nope".into()), Sample::Found("x".into()))
    );
}

#[test]
fn missing_call_as_target_names_the_target_not_the_alias() {
    let grammar = Grammar::from_rules(
        vec![("start", call_as("alias", "missing"))],
        tree_adapter(),
    );
    let err = grammar.parse("x").unwrap_err();
    assert_eq!(
        err.failure,
        expected(
            Expectation::Rule("missing".into()),
            Sample::Found("x".into())
        )
    );
}

#[test]
fn left_recursion_hits_the_depth_limit() {
    let grammar = Grammar::from_rules(
        vec![("loop", call("loop")), ("start", call("loop"))],
        tree_adapter(),
    );
    let err = grammar
        .parse_with("x", &ParseOptions { max_depth: 8 })
        .unwrap_err();
    assert_eq!(
        err.failure.root_cause(),
        &Failure::DepthLimit {
            rule: "loop".into()
        }
    );
}

// ---
// Callback failures
// ---

#[test]
fn action_fail_reports_expected_anything() {
    let grammar = grammar_of(action(literal("ab"), |_, _| ActionOutcome::Fail));
    let err = grammar.parse("ab").unwrap_err();
    assert_eq!(
        err.failure,
        expected(Expectation::AnyChar, Sample::Found(String::new()))
    );
    // The position stays where the inner operator stopped.
    assert_eq!(err.offset, 2);
    assert_eq!(err.position, Position { line: 0, column: 2 });
}

#[test]
fn text_of_restores_its_entry_when_the_inner_action_fails() {
    // The action leaves the cursor at the post-inner position; the
    // enclosing text_of backtracks to its own entry before propagating.
    let grammar = grammar_of(text_of(action(literal("ab"), |_, _| ActionOutcome::Fail)));
    let err = grammar.parse("ab").unwrap_err();
    assert_eq!(
        err.failure,
        expected(Expectation::AnyChar, Sample::Found(String::new()))
    );
    assert_eq!(err.offset, 0);
    assert_eq!(err.position, Position { line: 0, column: 0 });
}

#[test]
fn guard_mismatch_reports_the_current_character() {
    let grammar = grammar_of(sequence(vec![
        guard(|_: &matra::State<Tree>| Flow::Halt),
        literal("xy"),
    ]));
    let err = grammar.parse("xy").unwrap_err();
    assert_eq!(
        err.failure,
        expected(Expectation::EndOfInput, Sample::Found("x".into()))
    );
}

#[test]
fn described_pattern_failure_uses_the_description() {
    let grammar = grammar_of(pattern_described("[0-9]", "a digit").unwrap());
    let err = grammar.parse("x").unwrap_err();
    assert_eq!(
        err.failure,
        expected(
            Expectation::Pattern("a digit".into()),
            Sample::Found("x".into())
        )
    );
}

// ---
// Rendering and serialization
// ---

#[test]
fn display_renders_a_readable_chain() {
    let grammar = Grammar::from_rules(
        vec![("test", literal("foo")), ("start", call("test"))],
        tree_adapter(),
    );
    let err = grammar.parse("bar").unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("line 0, column 0"), "got: {rendered}");
    assert!(
        rendered.contains("in rule `test`: expected `foo`, found `b`"),
        "got: {rendered}"
    );
}

#[test]
fn empty_sample_renders_as_nothing() {
    let failure = expected(Expectation::AnyChar, Sample::Found(String::new()));
    assert_eq!(failure.to_string(), "expected any character, found nothing");
}

#[test]
fn failures_round_trip_through_serde() {
    let failure = Failure::AllChoicesFailed {
        causes: vec![
            expected(Expectation::Value("a".into()), Sample::EndOfInput),
            Failure::InRule {
                rule: "r".into(),
                cause: Box::new(expected(
                    Expectation::Pattern("[0-9]".into()),
                    Sample::Found("x".into()),
                )),
            },
        ],
        found: Sample::Found("x".into()),
    };
    let json = serde_json::to_string(&failure).expect("failure should serialize");
    let back: Failure = serde_json::from_str(&json).expect("failure should deserialize");
    assert_eq!(back, failure);
}
