//! Tests for rendering failure records as values.

use anyhow::{Result, ensure};
use assertdiag::render::{Inspector, RenderOptions};
use assertdiag::{AssertionFailure, FailureContext, FailureDetail, FailureOptions, Operator, Value};

#[test]
fn long_string_operands_are_previewed_without_mutation() -> Result<()> {
    let long = "a".repeat(2000);
    let failure = AssertionFailure::new(
        FailureOptions::new(Value::from(long.as_str()), Value::from("b"), Operator::StrictEqual),
        &FailureContext::plain(),
    );
    ensure!(failure.generated_message(), "message should be generated");

    let text = failure.inspect(&Inspector, &RenderOptions::default());
    let shown = format!("actual: '{}...'", "a".repeat(512));
    ensure!(text.contains(&shown), "preview missing from:\n{text}");
    ensure!(
        failure.actual().and_then(Value::as_str) == Some(long.as_str()),
        "actual changed by inspection"
    );
    Ok(())
}

#[test]
fn multi_line_operands_keep_ten_lines() -> Result<()> {
    let text = (0..15).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
    let failure = AssertionFailure::new(
        FailureOptions::new(Value::from(text.as_str()), Value::from(1), Operator::DeepEqual),
        &FailureContext::plain(),
    );
    let view = failure.inspection_view();
    let node = view
        .as_object()
        .map(|object| object.borrow().properties.get("actual").map(|p| p.value.clone()));
    let previewed = node.flatten().and_then(|value| value.as_str().map(str::to_owned));
    ensure!(
        previewed.as_deref()
            == Some("line 0\nline 1\nline 2\nline 3\nline 4\nline 5\nline 6\nline 7\nline 8\nline 9\n..."),
        "unexpected preview {previewed:?}"
    );
    Ok(())
}

#[test]
fn nested_operands_collapse() -> Result<()> {
    let actual = Value::object([("inner", Value::object([("deep", Value::from(1))]))]);
    let failure = AssertionFailure::new(
        FailureOptions::new(actual, Value::Null, Operator::NotDeepStrictEqual),
        &FailureContext::plain(),
    );
    let text = failure.inspect(&Inspector, &RenderOptions::canonical());
    ensure!(text.contains("  actual: [Object],"), "operand not collapsed:\n{text}");
    ensure!(text.contains("  code: 'ERR_ASSERTION',"), "code missing:\n{text}");
    ensure!(
        text.contains("  operator: 'notDeepStrictEqual'"),
        "operator missing:\n{text}"
    );
    Ok(())
}

#[test]
fn aggregate_details_are_indexed() -> Result<()> {
    let ctx = FailureContext::plain();
    let first = AssertionFailure::new(
        FailureOptions::new(Value::from(1), Value::from(2), Operator::StrictEqual),
        &ctx,
    );
    let second = AssertionFailure::new(
        FailureOptions::new(Value::from("x"), Value::from("y"), Operator::StrictEqual),
        &ctx,
    );
    let options = FailureOptions::new(Value::Undefined, Value::Undefined, Operator::from("fail"))
        .with_message("2 of 2 checks failed")
        .with_details(vec![FailureDetail::from(&first), FailureDetail::from(&second)]);
    let failure = AssertionFailure::new(options, &ctx);

    ensure!(failure.actual().is_none(), "aggregate failures have no operands");
    let text = failure.inspect(&Inspector, &RenderOptions::default());
    for key in [
        "'message 0'",
        "'actual 0': 1",
        "'expected 1': 'y'",
        "'operator 1': 'strictEqual'",
        "'stack trace 1'",
    ] {
        ensure!(text.contains(key), "{key} missing from:\n{text}");
    }
    Ok(())
}
