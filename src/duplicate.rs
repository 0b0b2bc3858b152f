//! Error-chain duplication.
//!
//! Errors compared by strict equality are copied before they are rendered so
//! that their stack text stays out of the message and the live objects are
//! never touched. A copy keeps the class name, the message and the
//! enumerable own members; its `cause` is copied too when it is an error.
//! Cause chains are followed to a fixed depth and cycles map back onto the
//! copies already made, so copying always terminates.

use crate::value::{ErrorParts, Object, ObjectBody, ObjectRef, Property, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;

/// Longest cause chain that is copied. Deeper causes are dropped from the
/// copy.
pub const MAX_CAUSE_DEPTH: usize = 128;

/// Return `true` for error objects carrying stack text.
#[must_use]
pub fn is_error_with_stack(value: &Value) -> bool {
    value.as_object().is_some_and(|object| {
        matches!(&object.borrow().body, ObjectBody::Error(parts) if parts.stack.is_some())
    })
}

/// Copy `source` and its cause chain into new nodes.
///
/// Non-error nodes are returned as-is.
///
/// # Examples
///
/// ```
/// use assertdiag::duplicate::duplicate_error;
/// use assertdiag::value::{ErrorParts, ObjectBody};
///
/// let cause = ErrorParts::new("Error", "disk full").with_stack("Error: disk full\n    at write");
/// let error = ErrorParts::new("TypeError", "save failed")
///     .with_stack("TypeError: save failed\n    at save")
///     .with_cause(cause.into_value())
///     .into_value();
/// let Some(source) = error.as_object() else { unreachable!() };
///
/// let copy = duplicate_error(source);
/// assert!(!copy.ptr_eq(source));
/// let node = copy.borrow();
/// let ObjectBody::Error(parts) = &node.body else { unreachable!() };
/// assert_eq!(parts.message, "save failed");
/// assert!(parts.stack.is_none());
/// ```
#[must_use]
pub fn duplicate_error(source: &ObjectRef) -> ObjectRef {
    tracing::trace!("duplicating error chain");
    let mut copies = HashMap::new();
    duplicate(source, 0, &mut copies)
}

fn duplicate(
    source: &ObjectRef,
    depth: usize,
    copies: &mut HashMap<*const RefCell<Object>, ObjectRef>,
) -> ObjectRef {
    if let Some(copy) = copies.get(&source.addr()) {
        return copy.clone();
    }

    let (parts, properties, cause) = {
        let node = source.borrow();
        let ObjectBody::Error(parts) = &node.body else {
            return source.clone();
        };
        let properties: IndexMap<String, Property> = node
            .properties
            .iter()
            .filter(|(_, property)| property.enumerable)
            .map(|(key, property)| (key.clone(), property.clone()))
            .collect();
        (
            ErrorParts::new(parts.name.clone(), parts.message.clone()),
            properties,
            parts.cause.clone(),
        )
    };

    let copy = ObjectRef::new(ObjectBody::Error(parts));
    copy.borrow_mut().properties = properties;
    copies.insert(source.addr(), copy.clone());

    let copied_cause = match cause {
        Some(Value::Object(inner)) if inner.is_error() => {
            (depth < MAX_CAUSE_DEPTH).then(|| Value::Object(duplicate(&inner, depth + 1, copies)))
        }
        other => other,
    };
    if let ObjectBody::Error(parts) = &mut copy.borrow_mut().body {
        parts.cause = copied_cause;
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_parts(value: &Value) -> Option<ErrorParts> {
        let node = value.as_object()?.borrow();
        match &node.body {
            ObjectBody::Error(parts) => Some(parts.clone()),
            _ => None,
        }
    }

    fn stacked(name: &str, message: &str) -> ErrorParts {
        ErrorParts::new(name, message).with_stack(format!("{name}: {message}\n    at somewhere"))
    }

    #[test]
    fn copies_hide_stacks_and_keep_members() {
        let error = stacked("Error", "boom").into_value();
        let Some(source) = error.as_object() else {
            panic!("error values are objects");
        };
        source.set("code", Value::from("E_BOOM"));
        source.set_hidden("secret", Value::from(1));

        let copy = Value::Object(duplicate_error(source));
        let parts = error_parts(&copy).unwrap_or_else(|| panic!("copy is an error"));
        assert_eq!(parts.name, "Error");
        assert_eq!(parts.message, "boom");
        assert!(parts.stack.is_none());
        let keys: Vec<String> = copy
            .as_object()
            .map(|object| object.borrow().properties.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, ["code"]);
        assert!(error_parts(&error).is_some_and(|parts| parts.stack.is_some()));
    }

    #[test]
    fn causes_are_copied_recursively() {
        let root = stacked("Error", "outer")
            .with_cause(stacked("Error", "inner").with_cause(Value::from("reason")).into_value())
            .into_value();
        let Some(source) = root.as_object() else {
            panic!("error values are objects");
        };
        let copy = Value::Object(duplicate_error(source));
        let cause = error_parts(&copy)
            .and_then(|parts| parts.cause)
            .unwrap_or_default();
        let original_cause = error_parts(&root)
            .and_then(|parts| parts.cause)
            .unwrap_or_default();
        assert!(!cause.same_reference(&original_cause));
        let inner = error_parts(&cause).unwrap_or_else(|| panic!("cause is an error"));
        assert_eq!(inner.message, "inner");
        assert!(inner.stack.is_none());
        assert_eq!(inner.cause.and_then(|c| c.as_str().map(str::to_owned)).as_deref(), Some("reason"));
    }

    #[test]
    fn cyclic_causes_terminate() {
        let root = stacked("Error", "loop").into_value();
        let Some(source) = root.as_object() else {
            panic!("error values are objects");
        };
        if let ObjectBody::Error(parts) = &mut source.borrow_mut().body {
            parts.cause = Some(root.clone());
        }
        let copy = duplicate_error(source);
        let cause = error_parts(&Value::Object(copy.clone())).and_then(|parts| parts.cause);
        assert!(cause.is_some_and(|cause| cause.as_object().is_some_and(|c| c.ptr_eq(&copy))));
    }

    #[test]
    fn deep_chains_are_capped() {
        let mut chain = stacked("Error", "leaf").into_value();
        for level in 0..MAX_CAUSE_DEPTH + 10 {
            chain = stacked("Error", &format!("level {level}"))
                .with_cause(chain)
                .into_value();
        }
        let Some(source) = chain.as_object() else {
            panic!("error values are objects");
        };
        let mut node = Value::Object(duplicate_error(source));
        let mut depth = 0;
        while let Some(cause) = error_parts(&node).and_then(|parts| parts.cause) {
            node = cause;
            depth += 1;
        }
        assert_eq!(depth, MAX_CAUSE_DEPTH);
    }

    #[test]
    fn detects_errors_with_stacks() {
        assert!(is_error_with_stack(&stacked("Error", "x").into_value()));
        assert!(!is_error_with_stack(&Value::error("Error", "x")));
        assert!(!is_error_with_stack(&Value::object([("stack", Value::from("s"))])));
    }
}
