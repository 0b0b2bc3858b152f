//! Edit scripts between two renderings.
//!
//! A [`DiffOracle`] turns two texts into a sequence of [`DiffOp`]s. The
//! default [`MyersOracle`] is backed by the `similar` crate. Edits are
//! oriented from the assertion's point of view: [`DiffKind::Insert`] holds
//! text present only in the actual rendering and [`DiffKind::Delete`] holds
//! text present only in the expected rendering.
//!
//! # Examples
//!
//! ```
//! use assertdiag::diff::{DiffKind, DiffOracle, MyersOracle};
//!
//! let ops = MyersOracle.diff("a\nb", "a\nc", false, true);
//! let kinds: Vec<DiffKind> = ops.iter().map(|op| op.kind).collect();
//! assert_eq!(kinds, [DiffKind::Equal, DiffKind::Insert, DiffKind::Delete]);
//! ```

use similar::{Algorithm, DiffTag, capture_diff_slices};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// The kind of a single edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Present only in the actual text.
    Insert,
    /// Present only in the expected text.
    Delete,
    /// Present in both texts.
    Equal,
}

/// One unit of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOp {
    /// What the edit does.
    pub kind: DiffKind,
    /// The line (line mode) or run of characters (character mode).
    pub value: String,
}

impl DiffOp {
    /// Construct an edit.
    #[must_use]
    pub fn new(kind: DiffKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Computes edit scripts.
pub trait DiffOracle {
    /// Diff `actual` against `expected`.
    ///
    /// With `line_mode` the texts are compared line by line, otherwise
    /// character by character. `check_comma_disparity` treats two lines that
    /// differ only by a trailing comma as equal.
    fn diff(
        &self,
        actual: &str,
        expected: &str,
        check_comma_disparity: bool,
        line_mode: bool,
    ) -> Vec<DiffOp>;
}

/// Myers edit scripts via `similar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersOracle;

impl DiffOracle for MyersOracle {
    fn diff(
        &self,
        actual: &str,
        expected: &str,
        check_comma_disparity: bool,
        line_mode: bool,
    ) -> Vec<DiffOp> {
        if line_mode {
            diff_lines(actual, expected, check_comma_disparity)
        } else {
            diff_chars(actual, expected)
        }
    }
}

/// A line compared either exactly or modulo one trailing comma.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    text: &'a str,
    loose_comma: bool,
}

impl<'a> Line<'a> {
    fn key(&self) -> &'a str {
        if self.loose_comma {
            self.text.strip_suffix(',').unwrap_or(self.text)
        } else {
            self.text
        }
    }
}

impl PartialEq for Line<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Line<'_> {}

impl Hash for Line<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Line<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Line<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(other.key())
    }
}

fn split_lines(text: &str, loose_comma: bool) -> Vec<Line<'_>> {
    text.split('\n')
        .map(|line| Line {
            text: line,
            loose_comma,
        })
        .collect()
}

fn diff_lines(actual: &str, expected: &str, check_comma_disparity: bool) -> Vec<DiffOp> {
    let old = split_lines(expected, check_comma_disparity);
    let new = split_lines(actual, check_comma_disparity);
    let mut script = EditScript::default();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                for (o, n) in old_range.zip(new_range) {
                    let (Some(expected_line), Some(actual_line)) = (old.get(o), new.get(n)) else {
                        continue;
                    };
                    // Report the variant that carries the trailing comma.
                    let shown = if check_comma_disparity && !actual_line.text.ends_with(',') {
                        expected_line.text
                    } else {
                        actual_line.text
                    };
                    script.equal(shown);
                }
            }
            DiffTag::Delete | DiffTag::Insert | DiffTag::Replace => {
                for line in new.get(new_range).unwrap_or_default() {
                    script.insert(line.text);
                }
                for line in old.get(old_range).unwrap_or_default() {
                    script.delete(line.text);
                }
            }
        }
    }
    script.finish()
}

fn diff_chars(actual: &str, expected: &str) -> Vec<DiffOp> {
    let old: Vec<char> = expected.chars().collect();
    let new: Vec<char> = actual.chars().collect();
    let mut script = EditScript::merging();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let inserted: String = new.get(new_range).unwrap_or_default().iter().collect();
        let deleted: String = old.get(old_range).unwrap_or_default().iter().collect();
        match tag {
            DiffTag::Equal => script.equal(&inserted),
            DiffTag::Delete | DiffTag::Insert | DiffTag::Replace => {
                script.insert(&inserted);
                script.delete(&deleted);
            }
        }
    }
    script.finish()
}

/// Collects edits so that each change hunk lists its inserted text before
/// its deleted text. A merging script joins adjacent edits of one kind.
#[derive(Default)]
struct EditScript {
    merge: bool,
    ops: Vec<DiffOp>,
    inserted: Vec<DiffOp>,
    deleted: Vec<DiffOp>,
}

impl EditScript {
    fn merging() -> Self {
        Self {
            merge: true,
            ..Self::default()
        }
    }

    fn insert(&mut self, text: &str) {
        Self::push(&mut self.inserted, DiffKind::Insert, text, self.merge);
    }

    fn delete(&mut self, text: &str) {
        Self::push(&mut self.deleted, DiffKind::Delete, text, self.merge);
    }

    fn equal(&mut self, text: &str) {
        self.flush();
        Self::push(&mut self.ops, DiffKind::Equal, text, self.merge);
    }

    fn flush(&mut self) {
        for op in self.inserted.drain(..).chain(self.deleted.drain(..)) {
            Self::push(&mut self.ops, op.kind, &op.value, self.merge);
        }
    }

    fn push(ops: &mut Vec<DiffOp>, kind: DiffKind, text: &str, merge: bool) {
        if merge {
            if text.is_empty() {
                return;
            }
            if let Some(last) = ops.last_mut().filter(|last| last.kind == kind) {
                last.value.push_str(text);
                return;
            }
        }
        ops.push(DiffOp::new(kind, text));
    }

    fn finish(mut self) -> Vec<DiffOp> {
        self.flush();
        self.ops
    }
}
