//! Owned value graph for assertion operands.
//!
//! Operands compared by an assertion are arbitrary values: primitives,
//! objects, arrays, callables and errors. Object-like values live behind a
//! shared [`ObjectRef`] handle so that two operands can be distinct
//! references with identical structure, or the same reference, and so that
//! cyclic graphs (an object containing itself, an error whose `cause` points
//! back up the chain) can be expressed.
//!
//! # Examples
//!
//! ```
//! use assertdiag::value::Value;
//!
//! let a = Value::object([("id", Value::from(1))]);
//! let b = Value::object([("id", Value::from(1))]);
//! assert!(a.is_object());
//! assert!(!a.same_reference(&b));
//! assert!(a.same_reference(&a.clone()));
//! ```

use indexmap::IndexMap;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// A single assertion operand.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Undefined,
    /// The explicit empty value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A double-precision number.
    Number(f64),
    /// A text value.
    String(String),
    /// A non-null object: plain object, array or error.
    Object(ObjectRef),
    /// A callable.
    Function(FunctionRef),
}

impl Value {
    /// Build a plain object from `(key, value)` pairs. Every member is
    /// enumerable.
    #[must_use]
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        let object = ObjectRef::new(ObjectBody::Plain);
        for (key, value) in entries {
            object.set(key, value);
        }
        Self::Object(object)
    }

    /// Build an array from its items.
    #[must_use]
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::Object(ObjectRef::new(ObjectBody::Array(items.into_iter().collect())))
    }

    /// Build an error with the given class name and message and no stack.
    #[must_use]
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Object(ObjectRef::new(ObjectBody::Error(ErrorParts::new(
            name, message,
        ))))
    }

    /// Build a named callable. An empty name renders as anonymous.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(FunctionRef::new(name))
    }

    /// Return `true` for non-null objects (plain objects, arrays, errors).
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Return `true` for callables.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// Return `true` for text values.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Return `true` for numbers equal to zero, including negative zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        matches!(self, Self::Number(n) if *n == 0.0)
    }

    /// Return `true` when the value is an object recognised as an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.as_object().is_some_and(ObjectRef::is_error)
    }

    /// Borrow the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the object handle of a non-null object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Reference identity: `true` when both values are the same object or
    /// callable. Primitives are never reference-equal.
    #[must_use]
    pub fn same_reference(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => Self::Number(number.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(text) => Self::String(text),
            serde_json::Value::Array(items) => Self::array(items.into_iter().map(Self::from)),
            serde_json::Value::Object(map) => {
                Self::object(map.into_iter().map(|(key, item)| (key, Self::from(item))))
            }
        }
    }
}

/// Shared handle to an object node.
///
/// Cloning the handle aliases the node; use [`ObjectRef::ptr_eq`] for
/// reference identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Allocate a new object node with no own members.
    #[must_use]
    pub fn new(body: ObjectBody) -> Self {
        Self(Rc::new(RefCell::new(Object {
            body,
            properties: IndexMap::new(),
        })))
    }

    /// Borrow the node.
    ///
    /// # Panics
    ///
    /// Panics if the node is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    /// Mutably borrow the node.
    ///
    /// # Panics
    ///
    /// Panics if the node is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    /// Set an enumerable own member.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.borrow_mut()
            .properties
            .insert(key.into(), Property::enumerable(value));
    }

    /// Set a hidden (non-enumerable) own member.
    pub fn set_hidden(&self, key: impl Into<String>, value: Value) {
        self.borrow_mut()
            .properties
            .insert(key.into(), Property::hidden(value));
    }

    /// Append an item to an array node. Ignored for other bodies.
    pub fn push(&self, value: Value) {
        if let ObjectBody::Array(items) = &mut self.borrow_mut().body {
            items.push(value);
        }
    }

    /// Return `true` when the node is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.borrow().body, ObjectBody::Error(_))
    }

    /// Reference identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stable address used for cycle tracking.
    pub(crate) fn addr(&self) -> *const RefCell<Object> {
        Rc::as_ptr(&self.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Nodes may be cyclic, so only the identity is printed.
        f.debug_tuple("ObjectRef").field(&self.addr()).finish()
    }
}

/// An object node: its body plus ordered own members.
#[derive(Debug)]
pub struct Object {
    /// Shape-specific contents.
    pub body: ObjectBody,
    /// Own members in insertion order.
    pub properties: IndexMap<String, Property>,
}

impl Object {
    /// Move every directly held value out of the node.
    fn take_children(&mut self) -> Vec<Value> {
        let mut children: Vec<Value> = self
            .properties
            .drain(..)
            .map(|(_, property)| property.value)
            .collect();
        match &mut self.body {
            ObjectBody::Plain => {}
            ObjectBody::Array(items) => children.append(items),
            ObjectBody::Error(parts) => children.extend(parts.cause.take()),
        }
        children
    }
}

impl Drop for Object {
    // Nodes owned only by this one are emptied in a loop so that dropping a
    // deeply nested value does not recurse once per level.
    fn drop(&mut self) {
        let mut pending = self.take_children();
        while let Some(value) = pending.pop() {
            let Value::Object(object) = value else {
                continue;
            };
            let Ok(cell) = Rc::try_unwrap(object.0) else {
                continue;
            };
            pending.extend(cell.into_inner().take_children());
        }
    }
}

/// The shape of an object node.
#[derive(Debug)]
pub enum ObjectBody {
    /// A plain keyed object.
    Plain,
    /// An array and its items.
    Array(Vec<Value>),
    /// An error instance.
    Error(ErrorParts),
}

/// The built-in members of an error instance.
#[derive(Debug, Clone)]
pub struct ErrorParts {
    /// Class name, e.g. `TypeError`.
    pub name: String,
    /// Error message; behaves as a hidden member.
    pub message: String,
    /// Captured stack text; behaves as a hidden member.
    pub stack: Option<String>,
    /// Optional own `cause`.
    pub cause: Option<Value>,
}

impl ErrorParts {
    /// Error parts with no stack and no cause.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            cause: None,
        }
    }

    /// Attach stack text.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach a cause.
    #[must_use]
    pub fn with_cause(mut self, cause: Value) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Wrap the parts into a new error value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(ObjectRef::new(ObjectBody::Error(self)))
    }
}

/// An own member of an object node.
#[derive(Debug, Clone)]
pub struct Property {
    /// Member value.
    pub value: Value,
    /// Whether the member is enumerable (visible to structural rendering).
    pub enumerable: bool,
}

impl Property {
    /// An enumerable member.
    #[must_use]
    pub const fn enumerable(value: Value) -> Self {
        Self {
            value,
            enumerable: true,
        }
    }

    /// A hidden member.
    #[must_use]
    pub const fn hidden(value: Value) -> Self {
        Self {
            value,
            enumerable: false,
        }
    }
}

/// Shared handle to a callable.
#[derive(Clone)]
pub struct FunctionRef(Rc<FunctionData>);

#[derive(Debug)]
struct FunctionData {
    name: String,
}

impl FunctionRef {
    /// Allocate a new callable with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(FunctionData { name: name.into() }))
    }

    /// The callable's name; empty for anonymous callables.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Reference identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionRef").field(&self.0.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::object(Value::object([("a", Value::Null)]), true, false)]
    #[case::array(Value::array([]), true, false)]
    #[case::error(Value::error("Error", "boom"), true, false)]
    #[case::function(Value::function("f"), false, true)]
    #[case::null(Value::Null, false, false)]
    #[case::string(Value::from("x"), false, false)]
    fn shape_predicates(#[case] value: Value, #[case] object: bool, #[case] callable: bool) {
        assert_eq!(value.is_object(), object);
        assert_eq!(value.is_callable(), callable);
    }

    #[test]
    fn clones_alias_the_same_node() {
        let original = Value::object([("a", Value::from(1))]);
        let alias = original.clone();
        assert!(original.same_reference(&alias));
        if let Some(object) = alias.as_object() {
            object.set("b", Value::from(2));
        }
        let count = original
            .as_object()
            .map_or(0, |object| object.borrow().properties.len());
        assert_eq!(count, 2);
    }

    #[test]
    fn deep_nesting_drops_without_recursing() {
        let mut value = Value::Null;
        for _ in 0..100_000 {
            value = Value::array([value]);
        }
        drop(value);
    }

    #[test]
    fn shared_children_survive_their_parent() {
        let shared = Value::object([("kept", Value::from(1))]);
        let parent = Value::array([shared.clone()]);
        drop(parent);
        let count = shared
            .as_object()
            .map_or(0, |object| object.borrow().properties.len());
        assert_eq!(count, 1);
    }

    #[test]
    fn primitives_are_never_reference_equal() {
        assert!(!Value::from(1).same_reference(&Value::from(1)));
        assert!(!Value::Null.same_reference(&Value::Null));
    }

    #[test]
    fn negative_zero_counts_as_zero() {
        assert!(Value::from(-0.0).is_zero());
        assert!(!Value::from(0.5).is_zero());
    }

    #[test]
    fn json_documents_convert_in_order() {
        let json = serde_json::json!({"b": [1, "two"], "a": null});
        let value = Value::from(json);
        let object = value.as_object().map(ObjectRef::borrow);
        let keys: Vec<String> = object
            .map(|node| node.properties.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, ["b", "a"]);
    }
}
