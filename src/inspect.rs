//! Rendering failures as values.
//!
//! A failure's message already holds the full comparison, so when the
//! failure itself is rendered its operands are shown shallowly and long
//! string operands are replaced by a short [`preview`]. The failure record is
//! never modified: rendering goes through a separate view.

use crate::failure::{AssertionFailure, Comparison};
use crate::render::{RenderOptions, ValueRenderer};
use crate::value::{ErrorParts, Value};
use itertools::Itertools;
use std::borrow::Cow;

/// Lines of a string operand kept by [`preview`].
const PREVIEW_LINES: usize = 10;

/// Characters of a string operand kept by [`preview`].
const PREVIEW_LENGTH: usize = 512;

/// Shorten `text` to at most ten lines and at most 512 characters, marking
/// each cut with `...`.
///
/// # Examples
///
/// ```
/// use assertdiag::inspect::preview;
///
/// assert_eq!(preview("short"), "short");
/// assert_eq!(preview(&"x".repeat(600)).len(), 515);
/// let lines = (0..12).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
/// assert_eq!(preview(&lines), "0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n...");
/// ```
#[must_use]
pub fn preview(text: &str) -> Cow<'_, str> {
    let mut shown = Cow::Borrowed(text);
    if text.split('\n').nth(PREVIEW_LINES).is_some() {
        let kept = text.split('\n').take(PREVIEW_LINES).join("\n");
        shown = Cow::Owned(format!("{kept}\n..."));
    }
    if shown.chars().count() > PREVIEW_LENGTH {
        let kept: String = shown.chars().take(PREVIEW_LENGTH).collect();
        shown = Cow::Owned(format!("{kept}..."));
    }
    shown
}

fn previewed(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(preview(text).into_owned()),
        other => other.clone(),
    }
}

impl AssertionFailure {
    /// Render the failure through `renderer`.
    ///
    /// The caller's options apply except that nesting stops at the
    /// failure's own members, and string operands are previewed.
    #[must_use]
    pub fn inspect(&self, renderer: &dyn ValueRenderer, options: &RenderOptions) -> String {
        renderer.render(&self.inspection_view(), &options.with_depth(Some(0)))
    }

    /// The value rendered by [`AssertionFailure::inspect`]: an error value
    /// carrying the stack plus the failure's members.
    #[must_use]
    pub fn inspection_view(&self) -> Value {
        let view = ErrorParts::new(self.name(), self.message())
            .with_stack(self.stack())
            .into_value();
        let Some(object) = view.as_object() else {
            return view;
        };
        object.set("generatedMessage", Value::from(self.generated_message()));
        object.set("code", Value::from(self.code()));
        match self.comparison() {
            Comparison::Single {
                actual,
                expected,
                operator,
            } => {
                object.set("actual", previewed(actual));
                object.set("expected", previewed(expected));
                object.set("operator", Value::from(operator.as_str()));
            }
            Comparison::Aggregate(details) => {
                for (index, detail) in details.iter().enumerate() {
                    object.set(format!("message {index}"), Value::from(detail.message.as_str()));
                    object.set(format!("actual {index}"), detail.actual.clone());
                    object.set(format!("expected {index}"), detail.expected.clone());
                    object.set(
                        format!("operator {index}"),
                        Value::from(detail.operator.as_str()),
                    );
                    object.set(format!("stack trace {index}"), Value::from(detail.stack.as_str()));
                }
            }
        }
        view
    }
}
