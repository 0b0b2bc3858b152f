//! Assertion failure records.
//!
//! [`AssertionFailure::new`] turns the operands and operator of a failed
//! assertion into an error value whose message explains the failure. Strict
//! equality failures get a diff, negative assertions show the offending value
//! and loose comparisons show both values in full. The record keeps the
//! operands for programmatic inspection, or a list of [`FailureDetail`]s when
//! several comparisons failed together.
//!
//! # Examples
//!
//! ```
//! use assertdiag::context::FailureContext;
//! use assertdiag::failure::{AssertionFailure, FailureOptions};
//! use assertdiag::operator::Operator;
//! use assertdiag::value::Value;
//!
//! let ctx = FailureContext::plain();
//! let options = FailureOptions::new(Value::from(1), Value::from(2), Operator::StrictEqual);
//! let failure = AssertionFailure::new(options, &ctx);
//!
//! assert_eq!(failure.message(), "Expected values to be strictly equal:\n\n1 !== 2\n");
//! assert!(failure.generated_message());
//! assert_eq!(
//!     failure.to_string(),
//!     "AssertionError [ERR_ASSERTION]: Expected values to be strictly equal:\n\n1 !== 2\n"
//! );
//! ```

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::compose;
use crate::context::FailureContext;
use crate::duplicate::{duplicate_error, is_error_with_stack};
use crate::operator::{MessagePolicy, Operator};
use crate::stack::StackStart;
use crate::value::Value;
use itertools::Itertools;
use miette::Diagnostic;
use std::error::Error as StdError;
use thiserror::Error;

/// Machine-readable code carried by every failure.
pub const ERR_ASSERTION: &str = "ERR_ASSERTION";

/// Display name of a failure.
pub const ASSERTION_ERROR: &str = "AssertionError";

/// Renderings longer than this many lines are collapsed under negative
/// operators.
const MAX_NEGATED_LINES: usize = 50;

/// Lines kept, ellipsis included, when a negated rendering is collapsed.
const KEPT_NEGATED_LINES: usize = 47;

/// Single-line renderings up to this length share the lead sentence's line.
const MAX_INLINE_VALUE_LENGTH: usize = 5;

/// Longest rendering shown per operand in loose comparison messages.
const MAX_LOOSE_LENGTH: usize = 512;

/// Longest message shown for loosely equal operands of `notDeepEqual`.
const MAX_LOOSE_IDENTICAL_LENGTH: usize = 1024;

/// Inputs for [`AssertionFailure::new`].
#[derive(Debug, Clone)]
pub struct FailureOptions {
    /// Custom message replacing the generated one.
    pub message: Option<String>,
    /// Operator of the failed assertion.
    pub operator: Operator,
    /// Frame above which the captured stack is cut.
    pub stack_start: Option<StackStart>,
    /// Per-comparison details of an aggregate failure.
    pub details: Option<Vec<FailureDetail>>,
    /// The value produced by the code under test.
    pub actual: Value,
    /// The value the assertion expected.
    pub expected: Value,
}

impl FailureOptions {
    /// Options for a comparison with a generated message.
    #[must_use]
    pub const fn new(actual: Value, expected: Value, operator: Operator) -> Self {
        Self {
            message: None,
            operator,
            stack_start: None,
            details: None,
            actual,
            expected,
        }
    }

    /// Use `message` instead of the generated message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Cut the captured stack above the frame matching `start`.
    #[must_use]
    pub fn with_stack_start(mut self, start: StackStart) -> Self {
        self.stack_start = Some(start);
        self
    }

    /// Record several failed comparisons instead of a single one.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FailureDetail>) -> Self {
        self.details = Some(details);
        self
    }
}

/// One comparison of an aggregate failure.
#[derive(Debug, Clone)]
pub struct FailureDetail {
    /// The comparison's message.
    pub message: String,
    /// The comparison's actual value.
    pub actual: Value,
    /// The comparison's expected value.
    pub expected: Value,
    /// The comparison's operator.
    pub operator: Operator,
    /// Stack text of the comparison.
    pub stack: String,
}

impl From<&AssertionFailure> for FailureDetail {
    fn from(failure: &AssertionFailure) -> Self {
        Self {
            message: failure.message.clone(),
            actual: failure.actual().cloned().unwrap_or_default(),
            expected: failure.expected().cloned().unwrap_or_default(),
            operator: failure
                .operator()
                .cloned()
                .unwrap_or_else(|| Operator::Other("undefined".to_owned())),
            stack: failure.stack.clone(),
        }
    }
}

/// What a failure compared.
#[derive(Debug, Clone)]
pub enum Comparison {
    /// A single comparison.
    Single {
        /// The value produced by the code under test.
        actual: Value,
        /// The value the assertion expected.
        expected: Value,
        /// Operator of the failed assertion.
        operator: Operator,
    },
    /// Several comparisons reported together.
    Aggregate(Vec<FailureDetail>),
}

/// A failed assertion.
#[derive(Debug, Error, Diagnostic)]
#[error("{name} [ERR_ASSERTION]: {message}")]
#[diagnostic(code(ERR_ASSERTION))]
pub struct AssertionFailure {
    message: String,
    generated_message: bool,
    name: String,
    stack: String,
    comparison: Comparison,
    #[source]
    cause: Option<Box<dyn StdError + 'static>>,
}

impl AssertionFailure {
    /// Build the failure described by `options`.
    ///
    /// No stack frames are recorded while the message is built; the
    /// context's frame limit applies again when the stack is captured.
    #[must_use]
    pub fn new(options: FailureOptions, ctx: &FailureContext) -> Self {
        let FailureOptions {
            message: custom,
            operator,
            stack_start,
            details,
            actual,
            expected,
        } = options;

        let (message, actual_value, expected_value) = {
            let _quiet = ctx.suppress_stack_frames();
            build_message(custom.as_deref(), &operator, actual, expected, ctx)
        };
        let generated_message = custom.as_deref().is_none_or(str::is_empty);

        let header = format!("{ASSERTION_ERROR} [{ERR_ASSERTION}]: {message}");
        let start = stack_start.unwrap_or_default();
        let capture = ctx.stack_capture();
        let limit = ctx.stack_trace_limit();
        // Retry from this frame: a closure frame would match the constructor
        // anchor before the constructor itself.
        let mut captured = capture.capture(&header, &start, limit);
        if captured.is_none() {
            captured = capture.capture(&header, &StackStart::constructor(), limit);
        }
        let stack = captured.unwrap_or_else(|| header.clone());

        let comparison = match details {
            Some(entries) => Comparison::Aggregate(entries),
            None => Comparison::Single {
                actual: actual_value,
                expected: expected_value,
                operator,
            },
        };

        tracing::debug!(
            generated = generated_message,
            length = message.len(),
            aggregate = matches!(comparison, Comparison::Aggregate(_)),
            "constructed assertion failure"
        );

        Self {
            message,
            generated_message,
            name: ASSERTION_ERROR.to_owned(),
            stack,
            comparison,
            cause: None,
        }
    }

    /// Attach the error that caused this failure, reported as its source.
    #[must_use]
    pub fn with_cause(mut self, cause: impl StdError + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the message was generated rather than supplied.
    #[must_use]
    pub const fn generated_message(&self) -> bool {
        self.generated_message
    }

    /// The machine-readable code, always [`ERR_ASSERTION`].
    #[must_use]
    pub const fn code(&self) -> &'static str {
        ERR_ASSERTION
    }

    /// The display name, always [`ASSERTION_ERROR`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stack text: the code-qualified name and message, then the frames.
    #[must_use]
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// What the failure compared.
    #[must_use]
    pub const fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    /// The actual operand of a single comparison. Error operands are the
    /// copies that were rendered.
    #[must_use]
    pub const fn actual(&self) -> Option<&Value> {
        match &self.comparison {
            Comparison::Single { actual, .. } => Some(actual),
            Comparison::Aggregate(_) => None,
        }
    }

    /// The expected operand of a single comparison.
    #[must_use]
    pub const fn expected(&self) -> Option<&Value> {
        match &self.comparison {
            Comparison::Single { expected, .. } => Some(expected),
            Comparison::Aggregate(_) => None,
        }
    }

    /// The operator of a single comparison.
    #[must_use]
    pub const fn operator(&self) -> Option<&Operator> {
        match &self.comparison {
            Comparison::Single { operator, .. } => Some(operator),
            Comparison::Aggregate(_) => None,
        }
    }

    /// The comparisons of an aggregate failure.
    #[must_use]
    pub fn details(&self) -> Option<&[FailureDetail]> {
        match &self.comparison {
            Comparison::Single { .. } => None,
            Comparison::Aggregate(details) => Some(details),
        }
    }
}

/// Build the message, returning it with the operands to record.
fn build_message(
    custom: Option<&str>,
    operator: &Operator,
    actual: Value,
    expected: Value,
    ctx: &FailureContext,
) -> (String, Value, Value) {
    if let Some(text) = custom {
        let message = match operator {
            Operator::DeepStrictEqual | Operator::StrictEqual => {
                compose::diagnostic(&actual, &expected, operator, Some(text), ctx)
            }
            _ => text.to_owned(),
        };
        return (message, actual, expected);
    }

    ctx.refresh_colors();
    let (shown_actual, shown_expected) =
        if is_error_with_stack(&actual) && is_error_with_stack(&expected) {
            (copy_error(&actual), copy_error(&expected))
        } else {
            (actual, expected)
        };

    let message = match operator.policy() {
        MessagePolicy::Diff => {
            compose::diagnostic(&shown_actual, &shown_expected, operator, None, ctx)
        }
        MessagePolicy::ActualOnly => negated_message(&shown_actual, operator, ctx),
        MessagePolicy::SideBySide => loose_message(&shown_actual, &shown_expected, operator, ctx),
    };
    (message, shown_actual, shown_expected)
}

fn copy_error(value: &Value) -> Value {
    value.as_object().map_or_else(
        || value.clone(),
        |object| Value::Object(duplicate_error(object)),
    )
}

fn negated_message(actual: &Value, operator: &Operator, ctx: &FailureContext) -> String {
    let lead_operator = match operator {
        Operator::NotStrictEqual if actual.is_object() || actual.is_callable() => {
            Operator::NotStrictEqualObject
        }
        other => other.clone(),
    };
    let base = lead_operator.lead_sentence().unwrap_or_default();

    let palette = ctx.palette();
    let marker = format!("{}...{}", palette.blue, palette.white);
    let rendered = ctx.render(actual);
    let mut lines: Vec<&str> = rendered.split('\n').collect();
    if lines.len() > MAX_NEGATED_LINES {
        lines.truncate(KEPT_NEGATED_LINES);
        if let Some(last) = lines.last_mut() {
            *last = &marker;
        }
    }

    match lines.as_slice() {
        [line] => {
            let gap = if line.chars().count() > MAX_INLINE_VALUE_LENGTH {
                "\n\n"
            } else {
                " "
            };
            format!("{base}{gap}{line}")
        }
        _ => format!("{base}\n\n{}\n", lines.iter().join("\n")),
    }
}

fn loose_message(
    actual: &Value,
    expected: &Value,
    operator: &Operator,
    ctx: &FailureContext,
) -> String {
    let rendered_actual = ctx.render(actual);
    let rendered_expected = ctx.render(expected);

    if *operator == Operator::NotDeepEqual && rendered_actual == rendered_expected {
        let lead = operator.lead_sentence().unwrap_or_default();
        return truncate(
            &format!("{lead}\n\n{rendered_actual}"),
            MAX_LOOSE_IDENTICAL_LENGTH,
        );
    }

    let shown_actual = truncate(&rendered_actual, MAX_LOOSE_LENGTH);
    let shown_expected = truncate(&rendered_expected, MAX_LOOSE_LENGTH);
    if *operator == Operator::DeepEqual {
        let lead = operator.lead_sentence().unwrap_or_default();
        return format!("{lead}\n\n{shown_actual}\n\nshould loosely deep-equal\n\n{shown_expected}");
    }
    if let Some(lead) = operator
        .unequal_variant()
        .and_then(|variant| variant.lead_sentence())
    {
        return format!(
            "{lead}\n\n{shown_actual}\n\nshould not loosely deep-equal\n\n{shown_expected}"
        );
    }
    format!("{shown_actual} {operator} {shown_expected}")
}

/// Cut `text` to `limit` characters, the last three being an ellipsis.
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let kept: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{kept}...")
}
