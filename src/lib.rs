//! Readable diagnostics for failed comparison assertions.
//!
//! When an equality or inequality assertion fails, [`AssertionFailure::new`]
//! builds an error value whose message explains the failure: a diff between
//! the rendered operands for strict equality, the offending value for
//! negative assertions, and both values in full for loose comparisons. The
//! record also keeps the operands, the operator and a captured stack.
//!
//! Rendering, diffing, diff printing and stack capture are pluggable through
//! [`FailureContext`], which also carries the colour state and the stack
//! frame limit explicitly.
//!
//! ```
//! use assertdiag::{AssertionFailure, FailureContext, FailureOptions, Operator, Value};
//!
//! let ctx = FailureContext::plain();
//! let actual = Value::object([("a", Value::from(1))]);
//! let expected = Value::object([("a", Value::from(2))]);
//! let failure = AssertionFailure::new(
//!     FailureOptions::new(actual, expected, Operator::DeepStrictEqual),
//!     &ctx,
//! );
//! assert_eq!(
//!     failure.message(),
//!     "Expected values to be strictly deep-equal:\n+ actual - expected\n\n  {\n+   a: 1\n-   a: 2\n  }\n"
//! );
//! ```

pub mod color;
pub mod compose;
pub mod context;
pub mod diff;
pub mod duplicate;
pub mod failure;
pub mod inspect;
pub mod operator;
pub mod options;
pub mod printer;
pub mod render;
pub mod stack;
pub mod strategy;
pub mod value;

pub use context::FailureContext;
pub use failure::{AssertionFailure, FailureDetail, FailureOptions};
pub use operator::Operator;
pub use options::OptionsError;
pub use value::Value;
