//! Snapshot tests for complete failure messages.

use assertdiag::{AssertionFailure, FailureContext, FailureOptions, Operator, Value};
use insta::assert_snapshot;

fn message_for(actual: Value, expected: Value, operator: Operator) -> String {
    AssertionFailure::new(
        FailureOptions::new(actual, expected, operator),
        &FailureContext::plain(),
    )
    .message()
    .to_owned()
}

fn order(id: i32, items: &[&str], paid: bool) -> Value {
    Value::object([
        ("id", Value::from(id)),
        ("items", Value::array(items.iter().map(|item| Value::from(*item)))),
        ("paid", Value::from(paid)),
    ])
}

#[test]
fn nested_object_diff() {
    let message = message_for(
        order(7, &["apple", "pear"], true),
        order(7, &["apple", "plum"], false),
        Operator::DeepStrictEqual,
    );
    assert_snapshot!(message, @r"
    Expected values to be strictly deep-equal:
    + actual - expected

      {
        id: 7,
        items: [
          'apple',
    +     'pear'
    -     'plum'
        ],
    +   paid: true
    -   paid: false
      }
    ");
}

#[test]
fn loose_comparison_shows_both_values() {
    let message = message_for(
        order(1, &["fig"], true),
        order(2, &["fig"], true),
        Operator::DeepEqual,
    );
    assert_snapshot!(message, @r"
    Expected values to be loosely deep-equal:

    {
      id: 1,
      items: [
        'fig'
      ],
      paid: true
    }

    should loosely deep-equal

    {
      id: 2,
      items: [
        'fig'
      ],
      paid: true
    }
    ");
}
