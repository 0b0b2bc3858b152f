//! Value rendering.
//!
//! Failure messages embed a textual rendering of each operand. The rendering
//! must be deterministic so that two renderings can be diffed line by line;
//! [`RenderOptions::canonical`] fixes the option set used for messages while
//! [`Inspector`] provides the default multi-line layout.
//!
//! # Examples
//!
//! ```
//! use assertdiag::render::{Inspector, RenderOptions, ValueRenderer};
//! use assertdiag::value::Value;
//!
//! let value = Value::object([("b", Value::from(2)), ("a", Value::from("x"))]);
//! let text = Inspector.render(&value, &RenderOptions::canonical());
//! assert_eq!(text, "{\n  a: 'x',\n  b: 2\n}");
//! ```

use crate::value::{ErrorParts, Object, ObjectBody, ObjectRef, Value};
use indexmap::IndexMap;
use itertools::Itertools;
use std::cell::RefCell;

/// Nesting depth used by [`RenderOptions::canonical`].
const CANONICAL_DEPTH: usize = 1000;

/// Deepest nesting level ever expanded, whatever the options ask for.
/// Deeper members collapse to `[Object]` / `[Array]`.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Strings shorter than this are never split across lines.
const MIN_SPLIT_LENGTH: usize = 16;

/// Options controlling a rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum nesting level that is expanded; `None` expands up to
    /// [`MAX_NESTING_DEPTH`].
    pub depth: Option<usize>,
    /// Order object members by key.
    pub sorted: bool,
    /// Include hidden (non-enumerable) members.
    pub show_hidden: bool,
    /// Maximum number of array items shown; `None` shows all.
    pub max_array_length: Option<usize>,
    /// Width beyond which multi-line strings are split per line.
    pub break_length: usize,
}

impl RenderOptions {
    /// The fixed option set used for failure messages: full depth, sorted
    /// keys, hidden members excluded and every array item shown.
    #[must_use]
    pub const fn canonical() -> Self {
        Self {
            depth: Some(CANONICAL_DEPTH),
            sorted: true,
            show_hidden: false,
            max_array_length: None,
            break_length: 128,
        }
    }

    /// Copy of these options with a different depth.
    #[must_use]
    pub fn with_depth(&self, depth: Option<usize>) -> Self {
        Self {
            depth,
            ..self.clone()
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            depth: Some(2),
            sorted: false,
            show_hidden: false,
            max_array_length: Some(100),
            break_length: 128,
        }
    }
}

/// Turns a value into text.
pub trait ValueRenderer {
    /// Render `value` under `options`.
    fn render(&self, value: &Value, options: &RenderOptions) -> String;
}

/// Default renderer producing one member per line with two-space indents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inspector;

impl ValueRenderer for Inspector {
    fn render(&self, value: &Value, options: &RenderOptions) -> String {
        let mut state = RenderState {
            options,
            ancestors: Vec::new(),
            circular: IndexMap::new(),
        };
        state.format(value, 0, 0)
    }
}

type NodeAddr = *const RefCell<Object>;

struct RenderState<'a> {
    options: &'a RenderOptions,
    ancestors: Vec<NodeAddr>,
    circular: IndexMap<NodeAddr, usize>,
}

impl RenderState<'_> {
    fn format(&mut self, value: &Value, level: usize, indent: usize) -> String {
        match value {
            Value::Undefined => "undefined".to_owned(),
            Value::Null => "null".to_owned(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => format_number(*number),
            Value::String(text) => self.format_string(text, indent),
            Value::Function(function) => function_label(function.name()),
            Value::Object(object) => self.format_object(object, level, indent),
        }
    }

    fn format_string(&self, text: &str, indent: usize) -> String {
        let length = text.chars().count();
        let limit = self.options.break_length.saturating_sub(indent + 4);
        if length > MIN_SPLIT_LENGTH && length > limit && text.contains('\n') {
            let separator = format!(" +\n{}", " ".repeat(indent + 2));
            return text.split_inclusive('\n').map(quote).join(&separator);
        }
        quote(text)
    }

    fn format_object(&mut self, object: &ObjectRef, level: usize, indent: usize) -> String {
        let addr = object.addr();
        if self.ancestors.contains(&addr) {
            let next = self.circular.len() + 1;
            let index = *self.circular.entry(addr).or_insert(next);
            return format!("[Circular *{index}]");
        }

        let node = object.borrow();
        let depth = self
            .options
            .depth
            .map_or(MAX_NESTING_DEPTH, |requested| requested.min(MAX_NESTING_DEPTH));
        if level > depth {
            return collapsed(&node.body);
        }

        self.ancestors.push(addr);
        let rendered = match &node.body {
            ObjectBody::Plain => {
                let entries = self.member_entries(&node, level, indent);
                wrap("{", &entries, "}", indent)
            }
            ObjectBody::Array(items) => {
                let mut entries = self.array_items(items, level, indent);
                entries.extend(self.member_entries(&node, level, indent));
                wrap("[", &entries, "]", indent)
            }
            ObjectBody::Error(parts) => self.format_error(parts, &node, level, indent),
        };
        self.ancestors.pop();

        match self.circular.get(&addr) {
            Some(index) => format!("<ref *{index}> {rendered}"),
            None => rendered,
        }
    }

    fn format_error(
        &mut self,
        parts: &ErrorParts,
        node: &Object,
        level: usize,
        indent: usize,
    ) -> String {
        let base = match parts.stack.as_deref() {
            Some(stack) if !stack.is_empty() => {
                let pad = " ".repeat(indent);
                stack.lines().join(&format!("\n{pad}"))
            }
            _ => error_label(parts),
        };

        let mut entries = Vec::new();
        if let Some(cause) = &parts.cause {
            let rendered = self.format(cause, level + 1, indent + 2);
            entries.push(("[cause]".to_owned(), rendered));
        }
        entries.extend(self.keyed_members(node, level, indent));
        if self.options.sorted {
            entries.sort_by(|a, b| a.0.cmp(&b.0));
        }
        if entries.is_empty() {
            return base;
        }
        let lines: Vec<String> = entries
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect();
        format!("{base} {}", wrap("{", &lines, "}", indent))
    }

    fn array_items(&mut self, items: &[Value], level: usize, indent: usize) -> Vec<String> {
        let shown = self
            .options
            .max_array_length
            .map_or(items.len(), |max| max.min(items.len()));
        let mut entries: Vec<String> = items
            .iter()
            .take(shown)
            .map(|item| self.format(item, level + 1, indent + 2))
            .collect();
        let remaining = items.len() - shown;
        if remaining > 0 {
            let plural = if remaining == 1 { "" } else { "s" };
            entries.push(format!("... {remaining} more item{plural}"));
        }
        entries
    }

    fn member_entries(&mut self, node: &Object, level: usize, indent: usize) -> Vec<String> {
        let mut members = self.keyed_members(node, level, indent);
        if self.options.sorted {
            members.sort_by(|a, b| a.0.cmp(&b.0));
        }
        members
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect()
    }

    fn keyed_members(
        &mut self,
        node: &Object,
        level: usize,
        indent: usize,
    ) -> Vec<(String, String)> {
        let show_hidden = self.options.show_hidden;
        node.properties
            .iter()
            .filter(|(_, property)| property.enumerable || show_hidden)
            .map(|(key, property)| {
                let label = if property.enumerable {
                    format_key(key)
                } else {
                    format!("[{key}]")
                };
                (label, self.format(&property.value, level + 1, indent + 2))
            })
            .collect()
    }
}

fn wrap(open: &str, entries: &[String], close: &str, indent: usize) -> String {
    if entries.is_empty() {
        return format!("{open}{close}");
    }
    let pad = " ".repeat(indent);
    let inner = entries
        .iter()
        .map(|entry| format!("{pad}  {entry}"))
        .join(",\n");
    format!("{open}\n{inner}\n{pad}{close}")
}

fn collapsed(body: &ObjectBody) -> String {
    match body {
        ObjectBody::Plain => "[Object]".to_owned(),
        ObjectBody::Array(_) => "[Array]".to_owned(),
        ObjectBody::Error(parts) => error_label(parts),
    }
}

fn error_label(parts: &ErrorParts) -> String {
    if parts.message.is_empty() {
        format!("[{}]", parts.name)
    } else {
        format!("[{}: {}]", parts.name, parts.message)
    }
}

fn function_label(name: &str) -> String {
    if name.is_empty() {
        "[Function (anonymous)]".to_owned()
    } else {
        format!("[Function: {name}]")
    }
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_owned();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let magnitude = number.abs();
    if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6) {
        let scientific = format!("{number:e}");
        return if scientific.contains("e-") {
            scientific
        } else {
            scientific.replacen('e', "e+", 1)
        };
    }
    format!("{number}")
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn format_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_owned()
    } else {
        quote(key)
    }
}

/// Quote `text`, preferring single quotes and falling back to double quotes
/// or backticks when the text already contains the preferred quote.
pub(crate) fn quote(text: &str) -> String {
    let quote = if !text.contains('\'') {
        '\''
    } else if !text.contains('"') {
        '"'
    } else if !text.contains('`') && !text.contains("${") {
        '`'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
