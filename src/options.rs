//! Failure options read from JSON documents.
//!
//! Assertion front ends that receive their options as loosely typed data
//! validate them here before building a failure. The options must be an
//! object; `details`, when present, must be an array of objects. Every other
//! member is optional and converted leniently.
//!
//! # Examples
//!
//! ```
//! use assertdiag::failure::FailureOptions;
//! use assertdiag::operator::Operator;
//! use serde_json::json;
//!
//! let options = FailureOptions::from_json(json!({
//!     "actual": 1,
//!     "expected": 2,
//!     "operator": "strictEqual",
//! }))?;
//! assert_eq!(options.operator, Operator::StrictEqual);
//!
//! let error = FailureOptions::from_json(json!("nope")).err().map(|e| e.to_string());
//! assert_eq!(
//!     error.as_deref(),
//!     Some("The \"options\" argument must be of type object. Received type string ('nope')")
//! );
//! # Ok::<(), assertdiag::options::OptionsError>(())
//! ```

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::failure::{FailureDetail, FailureOptions};
use crate::operator::Operator;
use crate::render::quote;
use crate::stack::StackStart;
use crate::value::Value;
use miette::Diagnostic;
use serde_json::Map;
use thiserror::Error;

/// Longest string value quoted in full when describing a received value.
const MAX_RECEIVED_LENGTH: usize = 25;

/// Errors raised while validating failure options.
#[derive(Debug, Error, Diagnostic)]
pub enum OptionsError {
    /// A member has the wrong type.
    #[error("The \"{name}\" argument must be {expected}. Received {received}")]
    #[diagnostic(code(ERR_INVALID_ARG_TYPE))]
    InvalidArgType {
        /// Path of the offending argument, e.g. `options.details`.
        name: String,
        /// What the argument must be.
        expected: &'static str,
        /// Description of the value received.
        received: String,
    },
}

impl OptionsError {
    fn invalid_arg_type(name: impl Into<String>, expected: &'static str, received: &serde_json::Value) -> Self {
        Self::InvalidArgType {
            name: name.into(),
            expected,
            received: describe(received),
        }
    }
}

/// Describe a received value the way type errors report it.
fn describe(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_owned(),
        serde_json::Value::Bool(flag) => format!("type boolean ({flag})"),
        serde_json::Value::Number(number) => format!("type number ({number})"),
        serde_json::Value::String(text) => {
            let shown = if text.chars().count() > MAX_RECEIVED_LENGTH {
                let kept: String = text.chars().take(MAX_RECEIVED_LENGTH).collect();
                format!("{}...", quote(&kept))
            } else {
                quote(text)
            };
            format!("type string ({shown})")
        }
        serde_json::Value::Array(_) => "an instance of Array".to_owned(),
        serde_json::Value::Object(_) => "an instance of Object".to_owned(),
    }
}

/// Text of a loosely typed message member: strings verbatim, anything else
/// as JSON.
fn text_of(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

fn operator_of(value: Option<serde_json::Value>) -> Operator {
    match value {
        None | Some(serde_json::Value::Null) => Operator::Other("undefined".to_owned()),
        Some(other) => Operator::from(text_of(other)),
    }
}

fn value_of(value: Option<serde_json::Value>) -> Value {
    value.map(Value::from).unwrap_or_default()
}

impl FailureOptions {
    /// Validate and convert a JSON options document.
    ///
    /// `stackStartFunction` is accepted in place of `stackStartFn`. A
    /// missing operator is recorded as `undefined`.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::InvalidArgType`] when `options` is not an
    /// object, when `details` is present but not an array, or when an entry
    /// of `details` is not an object.
    pub fn from_json(options: serde_json::Value) -> Result<Self, OptionsError> {
        let mut map = match options {
            serde_json::Value::Object(map) => map,
            other => return Err(OptionsError::invalid_arg_type("options", "of type object", &other)),
        };

        let message = match map.remove("message") {
            None | Some(serde_json::Value::Null) => None,
            Some(other) => Some(text_of(other)),
        };
        let stack_start = map
            .remove("stackStartFn")
            .filter(|start| !start.is_null())
            .or_else(|| map.remove("stackStartFunction"))
            .and_then(|start| start.as_str().map(|symbol| StackStart::named(symbol.to_owned())));
        let details = match map.remove("details") {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Array(entries)) => Some(
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(index, entry)| detail_from_json(index, entry))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(other) => {
                return Err(OptionsError::invalid_arg_type(
                    "options.details",
                    "an instance of Array",
                    &other,
                ));
            }
        };

        Ok(Self {
            message,
            operator: operator_of(map.remove("operator")),
            stack_start,
            details,
            actual: value_of(map.remove("actual")),
            expected: value_of(map.remove("expected")),
        })
    }
}

fn detail_from_json(index: usize, entry: serde_json::Value) -> Result<FailureDetail, OptionsError> {
    let mut map: Map<String, serde_json::Value> = match entry {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(OptionsError::invalid_arg_type(
                format!("options.details[{index}]"),
                "of type object",
                &other,
            ));
        }
    };
    Ok(FailureDetail {
        message: map.remove("message").map(text_of).unwrap_or_default(),
        actual: value_of(map.remove("actual")),
        expected: value_of(map.remove("expected")),
        operator: operator_of(map.remove("operator")),
        stack: map.remove("stack").map(text_of).unwrap_or_default(),
    })
}
