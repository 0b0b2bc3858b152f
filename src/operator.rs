//! Assertion operators and their lead sentences.
//!
//! Every failure names the operator of the assertion that failed. Operators
//! select both the sentence that opens the message and the way operands are
//! shown ([`MessagePolicy`]). Besides the six public operators a few tags are
//! derived while a message is built: reference-equality variants for objects,
//! [`Operator::NotIdentical`] for structurally equal but distinct references,
//! and the `Unequal` wording for loose negative comparisons.
//!
//! # Examples
//!
//! ```
//! use assertdiag::operator::Operator;
//!
//! let op: Operator = "strictEqual".parse().unwrap_or(Operator::StrictEqual);
//! assert_eq!(op, Operator::StrictEqual);
//! assert_eq!(op.lead_sentence(), Some("Expected values to be strictly equal:"));
//! assert_eq!(Operator::from("==").lead_sentence(), None);
//! ```

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The operator of a failed assertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// `deepStrictEqual`
    DeepStrictEqual,
    /// `strictEqual`
    StrictEqual,
    /// `deepEqual`
    DeepEqual,
    /// `notDeepStrictEqual`
    NotDeepStrictEqual,
    /// `notStrictEqual`
    NotStrictEqual,
    /// `notDeepEqual`
    NotDeepEqual,
    /// `strictEqual` applied to two objects or two callables.
    StrictEqualObject,
    /// `notStrictEqual` applied to an object or callable.
    NotStrictEqualObject,
    /// Structurally equal values that are distinct references.
    NotIdentical,
    /// Wording used when `notDeepEqual` operands render differently.
    NotDeepEqualUnequal,
    /// Any other operator, shown verbatim between the operands.
    Other(String),
}

/// How a failure message presents its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePolicy {
    /// Diff the two renderings.
    Diff,
    /// Show only the actual rendering.
    ActualOnly,
    /// Show both renderings in full, one after the other.
    SideBySide,
}

impl Operator {
    /// The operator's tag as written in assertion APIs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DeepStrictEqual => "deepStrictEqual",
            Self::StrictEqual => "strictEqual",
            Self::DeepEqual => "deepEqual",
            Self::NotDeepStrictEqual => "notDeepStrictEqual",
            Self::NotStrictEqual => "notStrictEqual",
            Self::NotDeepEqual => "notDeepEqual",
            Self::StrictEqualObject => "strictEqualObject",
            Self::NotStrictEqualObject => "notStrictEqualObject",
            Self::NotIdentical => "notIdentical",
            Self::NotDeepEqualUnequal => "notDeepEqualUnequal",
            Self::Other(tag) => tag,
        }
    }

    /// The fixed sentence opening a generated message, if the operator has
    /// one.
    #[must_use]
    pub const fn lead_sentence(&self) -> Option<&'static str> {
        match self {
            Self::DeepStrictEqual => Some("Expected values to be strictly deep-equal:"),
            Self::StrictEqual => Some("Expected values to be strictly equal:"),
            Self::StrictEqualObject => {
                Some("Expected \"actual\" to be reference-equal to \"expected\":")
            }
            Self::DeepEqual => Some("Expected values to be loosely deep-equal:"),
            Self::NotDeepStrictEqual => Some("Expected \"actual\" not to be strictly deep-equal to:"),
            Self::NotStrictEqual => Some("Expected \"actual\" to be strictly unequal to:"),
            Self::NotStrictEqualObject => {
                Some("Expected \"actual\" not to be reference-equal to \"expected\":")
            }
            Self::NotDeepEqual => Some("Expected \"actual\" not to be loosely deep-equal to:"),
            Self::NotIdentical => Some("Values have same structure but are not reference-equal:"),
            Self::NotDeepEqualUnequal => Some("Expected values not to be loosely deep-equal:"),
            Self::Other(_) => None,
        }
    }

    /// How a generated message presents the operands.
    #[must_use]
    pub const fn policy(&self) -> MessagePolicy {
        match self {
            Self::DeepStrictEqual | Self::StrictEqual => MessagePolicy::Diff,
            Self::NotDeepStrictEqual | Self::NotStrictEqual => MessagePolicy::ActualOnly,
            Self::DeepEqual
            | Self::NotDeepEqual
            | Self::StrictEqualObject
            | Self::NotStrictEqualObject
            | Self::NotIdentical
            | Self::NotDeepEqualUnequal
            | Self::Other(_) => MessagePolicy::SideBySide,
        }
    }

    /// The wording used when the operands of a loose negative comparison
    /// render differently.
    #[must_use]
    pub const fn unequal_variant(&self) -> Option<Self> {
        match self {
            Self::NotDeepEqual => Some(Self::NotDeepEqualUnequal),
            _ => None,
        }
    }

    /// Normalise the operator for the operand shapes: `strictEqual` between
    /// two objects or two callables compares references, not values.
    #[must_use]
    pub fn classify(&self, actual: &Value, expected: &Value) -> Self {
        let both_objects = actual.is_object() && expected.is_object();
        let both_callables = actual.is_callable() && expected.is_callable();
        match self {
            Self::StrictEqual if both_objects || both_callables => Self::StrictEqualObject,
            other => other.clone(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Operator {
    fn from(tag: &str) -> Self {
        match tag {
            "deepStrictEqual" => Self::DeepStrictEqual,
            "strictEqual" => Self::StrictEqual,
            "deepEqual" => Self::DeepEqual,
            "notDeepStrictEqual" => Self::NotDeepStrictEqual,
            "notStrictEqual" => Self::NotStrictEqual,
            "notDeepEqual" => Self::NotDeepEqual,
            "strictEqualObject" => Self::StrictEqualObject,
            "notStrictEqualObject" => Self::NotStrictEqualObject,
            "notIdentical" => Self::NotIdentical,
            "notDeepEqualUnequal" => Self::NotDeepEqualUnequal,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Operator {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        match operator {
            Operator::Other(tag) => tag,
            known => known.as_str().to_owned(),
        }
    }
}

impl FromStr for Operator {
    type Err = Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(tag))
    }
}
