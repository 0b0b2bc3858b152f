//! Diff-based messages for strict equality failures.
//!
//! [`diagnostic`] renders both operands canonically and lays the comparison
//! out as `"{lead}\n{header}{skip notice}\n{body}\n"`. Single-line
//! comparisons go through [`crate::strategy`]; structurally equal but
//! distinct values are shown once; everything else becomes a line diff.
//!
//! # Examples
//!
//! ```
//! use assertdiag::compose::diagnostic;
//! use assertdiag::context::FailureContext;
//! use assertdiag::operator::Operator;
//! use assertdiag::value::Value;
//!
//! let ctx = FailureContext::plain();
//! let text = diagnostic(&Value::from(1), &Value::from(2), &Operator::StrictEqual, None, &ctx);
//! assert_eq!(text, "Expected values to be strictly equal:\n\n1 !== 2\n");
//! ```

use crate::context::FailureContext;
use crate::operator::Operator;
use crate::strategy::{self, DiffOutcome};
use crate::value::Value;
use itertools::Itertools;

/// Renderings longer than this many lines are cut when shown whole.
const MAX_IDENTICAL_LINES: usize = 50;

const SKIP_NOTICE: &str = "\n... Skipped lines";

/// Compose the diff message comparing `actual` with `expected`.
///
/// A non-empty `custom` message replaces the operator's lead sentence.
#[must_use]
pub fn diagnostic(
    actual: &Value,
    expected: &Value,
    operator: &Operator,
    custom: Option<&str>,
    ctx: &FailureContext,
) -> String {
    let mut classified = operator.classify(actual, expected);
    let palette = ctx.palette();

    let rendered_actual = ctx.render(actual);
    let rendered_expected = ctx.render(expected);
    let actual_lines: Vec<&str> = rendered_actual.split('\n').collect();
    let expected_lines: Vec<&str> = rendered_expected.split('\n').collect();

    let outcome = if strategy::is_simple_diff(
        actual,
        actual_lines.len(),
        expected,
        expected_lines.len(),
    ) {
        strategy::simple_diff(
            actual,
            actual_lines.first().copied().unwrap_or_default(),
            expected,
            expected_lines.first().copied().unwrap_or_default(),
            ctx,
        )
    } else if rendered_actual == rendered_expected {
        classified = Operator::NotIdentical;
        identical_body(&actual_lines)
    } else {
        let ops = ctx
            .oracle()
            .diff(&rendered_actual, &rendered_expected, actual.is_object(), true);
        let printed = ctx.printer().print_lines(&ops, palette);
        DiffOutcome {
            message: printed.message,
            header: None,
            skipped: printed.skipped,
        }
    };

    let lead = custom
        .filter(|text| !text.is_empty())
        .or_else(|| classified.lead_sentence())
        .unwrap_or_default();
    let header = outcome.header.unwrap_or_else(|| {
        format!(
            "{green}+ actual{white} {red}- expected{white}",
            green = palette.green,
            red = palette.red,
            white = palette.white,
        )
    });
    let skip = if outcome.skipped { SKIP_NOTICE } else { "" };
    format!("{lead}\n{header}{skip}\n{}\n", outcome.message)
}

fn identical_body(lines: &[&str]) -> DiffOutcome {
    if lines.len() > MAX_IDENTICAL_LINES {
        let kept = lines.iter().take(MAX_IDENTICAL_LINES).join("\n");
        return DiffOutcome {
            message: format!("{kept}\n...}}"),
            header: Some(String::new()),
            skipped: true,
        };
    }
    DiffOutcome {
        message: lines.join("\n"),
        header: Some(String::new()),
        skipped: false,
    }
}
