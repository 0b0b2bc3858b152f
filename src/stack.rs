//! Call stack capture for failure records.
//!
//! A failure's stack text starts with a header line (the qualified error name
//! and message) followed by one `    at` line per frame. Frames belonging to
//! this crate and to the assertion helper that raised the failure are
//! omitted: capture starts below the first frame matching a [`StackStart`].

use std::backtrace::Backtrace;
use std::borrow::Cow;

/// Symbol fragment identifying the failure constructor's own frame.
pub const CONSTRUCTOR_FRAME: &str = "AssertionFailure::new";

/// The frame above which captured stacks are cut.
///
/// # Examples
///
/// ```
/// use assertdiag::stack::{CONSTRUCTOR_FRAME, StackStart};
///
/// assert_eq!(StackStart::default().symbol(), CONSTRUCTOR_FRAME);
/// assert_eq!(StackStart::named("my_assert").symbol(), "my_assert");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackStart(Cow<'static, str>);

impl StackStart {
    /// Anchor at the failure constructor.
    #[must_use]
    pub const fn constructor() -> Self {
        Self(Cow::Borrowed(CONSTRUCTOR_FRAME))
    }

    /// Anchor at the first frame whose symbol contains `symbol`.
    #[must_use]
    pub fn named(symbol: impl Into<Cow<'static, str>>) -> Self {
        Self(symbol.into())
    }

    /// The symbol fragment matched against frames.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl Default for StackStart {
    fn default() -> Self {
        Self::constructor()
    }
}

/// Records call stacks as text.
pub trait StackCapture {
    /// Capture the current stack headed by `header`, keeping at most `limit`
    /// frames below the first frame matching `start`.
    ///
    /// Returns `None` when no frame matches `start`.
    fn capture(&self, header: &str, start: &StackStart, limit: usize) -> Option<String>;
}

/// Captures the real call stack via [`std::backtrace::Backtrace`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceCapture;

impl StackCapture for BacktraceCapture {
    fn capture(&self, header: &str, start: &StackStart, limit: usize) -> Option<String> {
        if limit == 0 {
            return Some(header.to_owned());
        }
        let trace = Backtrace::force_capture().to_string();
        let frames = parse_frames(&trace);
        let anchor = frames
            .iter()
            .position(|frame| frame.symbol.contains(start.symbol()))?;
        let mut text = header.to_owned();
        for frame in frames.iter().skip(anchor + 1).take(limit) {
            text.push_str("\n    at ");
            text.push_str(frame.symbol);
            if let Some(location) = frame.location {
                text.push_str(" (");
                text.push_str(location);
                text.push(')');
            }
        }
        Some(text)
    }
}

/// Records only the header line. Deterministic, for snapshots and for
/// builds without symbol information.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderOnly;

impl StackCapture for HeaderOnly {
    fn capture(&self, header: &str, _start: &StackStart, _limit: usize) -> Option<String> {
        Some(header.to_owned())
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Frame<'a> {
    symbol: &'a str,
    location: Option<&'a str>,
}

fn parse_frames(trace: &str) -> Vec<Frame<'_>> {
    let mut frames: Vec<Frame<'_>> = Vec::new();
    for line in trace.lines() {
        let trimmed = line.trim_start();
        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.location = Some(location);
            }
            continue;
        }
        let Some((index, symbol)) = trimmed.split_once(": ") else {
            continue;
        };
        if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
            frames.push(Frame {
                symbol,
                location: None,
            });
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: std::backtrace::Backtrace::force_capture
             at /rustc/library/std/src/backtrace.rs:312:13
   1: assertdiag::failure::AssertionFailure::new
             at ./src/failure.rs:120:9
   2: app::check_totals
             at ./src/main.rs:8:5
   3: app::main
";

    #[test]
    fn frames_pair_symbols_with_locations() {
        let frames = parse_frames(SAMPLE);
        assert_eq!(frames.len(), 4);
        assert_eq!(
            frames.get(2),
            Some(&Frame {
                symbol: "app::check_totals",
                location: Some("./src/main.rs:8:5"),
            })
        );
        assert_eq!(frames.get(3).and_then(|frame| frame.location), None);
    }

    #[test]
    fn zero_limit_keeps_only_the_header() {
        let stack = BacktraceCapture.capture("AssertionError: boom", &StackStart::default(), 0);
        assert_eq!(stack.as_deref(), Some("AssertionError: boom"));
    }

    #[test]
    fn unknown_start_frame_yields_nothing() {
        let start = StackStart::named("no_such_frame_in_this_process");
        assert_eq!(BacktraceCapture.capture("header", &start, 10), None);
    }

    #[test]
    fn header_only_ignores_frames() {
        let stack = HeaderOnly.capture("AssertionError: boom", &StackStart::default(), 10);
        assert_eq!(stack.as_deref(), Some("AssertionError: boom"));
    }
}
