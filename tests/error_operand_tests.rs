//! Tests for failures whose operands are themselves errors.

use anyhow::{Context, Result, ensure};
use assertdiag::value::{ErrorParts, ObjectBody};
use assertdiag::{AssertionFailure, FailureContext, FailureOptions, Operator, Value};

fn stacked_error(message: &str, location: &str, cause: Option<Value>) -> Value {
    let mut parts = ErrorParts::new("Error", message)
        .with_stack(format!("Error: {message}\n    at {location}"));
    if let Some(inner) = cause {
        parts = parts.with_cause(inner);
    }
    parts.into_value()
}

fn stack_of(value: &Value) -> Option<String> {
    let node = value.as_object()?.borrow();
    match &node.body {
        ObjectBody::Error(parts) => parts.stack.clone(),
        _ => None,
    }
}

fn cause_of(value: &Value) -> Option<Value> {
    let node = value.as_object()?.borrow();
    match &node.body {
        ObjectBody::Error(parts) => parts.cause.clone(),
        _ => None,
    }
}

#[test]
fn error_chains_are_diffed_without_stacks() -> Result<()> {
    let actual = stacked_error(
        "save failed",
        "save (app.rs:1:1)",
        Some(stacked_error("disk full", "write (io.rs:2:2)", None)),
    );
    let expected = stacked_error(
        "save failed",
        "save (app.rs:9:9)",
        Some(stacked_error("disk quota", "write (io.rs:3:3)", None)),
    );
    let actual_stack = stack_of(&actual);
    let expected_stack = stack_of(&expected);
    let actual_cause_stack = cause_of(&actual).as_ref().and_then(stack_of);

    let failure = AssertionFailure::new(
        FailureOptions::new(actual.clone(), expected.clone(), Operator::DeepStrictEqual),
        &FailureContext::plain(),
    );

    ensure!(
        failure.message()
            == "Expected values to be strictly deep-equal:\n+ actual - expected\n\n  [Error: save failed] {\n+   [cause]: [Error: disk full]\n-   [cause]: [Error: disk quota]\n  }\n",
        "unexpected message:\n{}",
        failure.message()
    );
    ensure!(!failure.message().contains("    at "), "stack frames leaked");
    ensure!(stack_of(&actual) == actual_stack, "actual stack changed");
    ensure!(stack_of(&expected) == expected_stack, "expected stack changed");
    ensure!(
        cause_of(&actual).as_ref().and_then(stack_of) == actual_cause_stack,
        "cause stack changed"
    );
    Ok(())
}

#[test]
fn recorded_operands_are_the_copies() -> Result<()> {
    let actual = stacked_error("a", "here", None);
    let expected = stacked_error("b", "there", None);
    let failure = AssertionFailure::new(
        FailureOptions::new(actual.clone(), expected, Operator::StrictEqual),
        &FailureContext::plain(),
    );
    let recorded = failure.actual().context("single comparison")?;
    ensure!(!recorded.same_reference(&actual), "operand was not copied");
    ensure!(stack_of(recorded).is_none(), "copy kept its stack");
    Ok(())
}

#[test]
fn one_sided_errors_are_rendered_as_is() -> Result<()> {
    let actual = stacked_error("save failed", "save (app.rs:1:1)", None);
    let failure = AssertionFailure::new(
        FailureOptions::new(actual.clone(), Value::object::<&str, _>([]), Operator::DeepStrictEqual),
        &FailureContext::plain(),
    );
    ensure!(
        failure.message().contains("at save (app.rs:1:1)"),
        "expected the stack in:\n{}",
        failure.message()
    );
    let recorded = failure.actual().context("single comparison")?;
    ensure!(recorded.same_reference(&actual), "operand was copied");
    Ok(())
}

#[test]
fn custom_messages_skip_duplication() -> Result<()> {
    let actual = stacked_error("a", "here", None);
    let expected = stacked_error("b", "there", None);
    let options = FailureOptions::new(actual.clone(), expected, Operator::DeepEqual)
        .with_message("errors differ");
    let failure = AssertionFailure::new(options, &FailureContext::plain());
    let recorded = failure.actual().context("single comparison")?;
    ensure!(recorded.same_reference(&actual), "operand was copied");
    ensure!(failure.message() == "errors differ", "unexpected message");
    Ok(())
}

#[test]
fn cyclic_cause_chains_terminate() -> Result<()> {
    let actual = stacked_error("loop", "here", None);
    if let Some(object) = actual.as_object() {
        if let ObjectBody::Error(parts) = &mut object.borrow_mut().body {
            parts.cause = Some(actual.clone());
        }
    }
    let expected = stacked_error("other", "there", None);
    let failure = AssertionFailure::new(
        FailureOptions::new(actual, expected, Operator::DeepStrictEqual),
        &FailureContext::plain(),
    );
    ensure!(
        failure.message().contains("[Circular *1]"),
        "expected a cycle marker in:\n{}",
        failure.message()
    );
    Ok(())
}
