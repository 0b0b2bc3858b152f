//! Diff strategies for single-line comparisons.
//!
//! Short primitive comparisons read best inline (`1 !== 2`). Longer ones are
//! stacked as a `+` line and a `-` line, optionally followed by a caret
//! pointing at the first differing character. When colour is enabled string
//! comparisons are instead shown as one coloured character diff.

use crate::context::FailureContext;
use crate::value::Value;

/// Longest combined rendering, quotes excluded, shown inline.
const MAX_SHORT_LENGTH: usize = 12;

/// Width assumed when the terminal width is unknown.
const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Divergence within this many leading characters is obvious without a
/// caret.
const MIN_CARET_INDEX: usize = 3;

/// The body and header produced by a diff strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Message body.
    pub message: String,
    /// Header replacing the default `+ actual - expected` label, if any.
    pub header: Option<String>,
    /// Whether the body elides part of the comparison.
    pub skipped: bool,
}

impl DiffOutcome {
    const fn new(message: String, header: Option<String>) -> Self {
        Self {
            message,
            header,
            skipped: false,
        }
    }
}

/// Return `true` when both renderings are single lines and at least one
/// operand is not an object.
///
/// # Examples
///
/// ```
/// use assertdiag::strategy::is_simple_diff;
/// use assertdiag::value::Value;
///
/// assert!(is_simple_diff(&Value::from(1), 1, &Value::array([]), 1));
/// assert!(!is_simple_diff(&Value::array([]), 1, &Value::array([]), 1));
/// assert!(!is_simple_diff(&Value::from("a\nb"), 2, &Value::from(1), 1));
/// ```
#[must_use]
pub fn is_simple_diff(
    actual: &Value,
    actual_lines: usize,
    expected: &Value,
    expected_lines: usize,
) -> bool {
    if actual_lines > 1 || expected_lines > 1 {
        return false;
    }
    !actual.is_object() || !expected.is_object()
}

/// Pick and run the strategy for a simple diff of the single-line renderings
/// `rendered_actual` and `rendered_expected`.
#[must_use]
pub fn simple_diff(
    actual: &Value,
    rendered_actual: &str,
    expected: &Value,
    rendered_expected: &str,
    ctx: &FailureContext,
) -> DiffOutcome {
    let mut length = rendered_actual.chars().count() + rendered_expected.chars().count();
    for operand in [actual, expected] {
        if operand.is_string() {
            length = length.saturating_sub(2);
        }
    }
    if length <= MAX_SHORT_LENGTH && !(actual.is_zero() && expected.is_zero()) {
        tracing::trace!(strategy = "inline", "selected simple diff strategy");
        return DiffOutcome::new(
            format!("{rendered_actual} !== {rendered_expected}"),
            Some(String::new()),
        );
    }

    let strings = actual.is_string() && expected.is_string();
    if strings && ctx.colors() {
        tracing::trace!(strategy = "coloured", "selected simple diff strategy");
        return coloured_diff(rendered_actual, rendered_expected, ctx);
    }

    tracing::trace!(strategy = "stacked", "selected simple diff strategy");
    stacked_diff(rendered_actual, rendered_expected, strings, ctx)
}

fn coloured_diff(actual: &str, expected: &str, ctx: &FailureContext) -> DiffOutcome {
    let palette = ctx.palette();
    let header = format!(
        "{green}actual{white} {red}expected{white}",
        green = palette.green,
        red = palette.red,
        white = palette.white,
    );
    let ops = ctx.oracle().diff(actual, expected, false, false);
    DiffOutcome::new(ctx.printer().print_chars(&ops, palette), Some(header))
}

fn stacked_diff(actual: &str, expected: &str, strings: bool, ctx: &FailureContext) -> DiffOutcome {
    let palette = ctx.palette();
    let mut message = format!(
        "\n{green}+{white} {actual}\n{red}- {white}{expected}",
        green = palette.green,
        red = palette.red,
        white = palette.white,
    );

    let width = ctx.terminal_width().unwrap_or(DEFAULT_TERMINAL_WIDTH);
    let length = actual.chars().count() + expected.chars().count();
    if strings && length <= width {
        if let Some(index) = first_difference(actual, expected).filter(|i| *i >= MIN_CARET_INDEX) {
            message.push('\n');
            message.push_str(&" ".repeat(index + 2));
            message.push('^');
        }
    }
    DiffOutcome::new(message, None)
}

/// Index, in characters, of the first character of `actual` that differs
/// from `expected`. `None` when `actual` is a prefix of `expected`.
fn first_difference(actual: &str, expected: &str) -> Option<usize> {
    let mut theirs = expected.chars();
    actual
        .chars()
        .position(|ours| theirs.next() != Some(ours))
}
