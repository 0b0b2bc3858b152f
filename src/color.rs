//! Colour and terminal width detection.
//!
//! Failure messages are plain text unless colour output is enabled, in which
//! case markers and character diffs carry ANSI escapes. Whether colour is
//! enabled is resolved from explicit configuration and the environment:
//!
//! 1. Explicit configuration (`Some(true)` / `Some(false)`).
//! 2. `FORCE_COLOR`: `0` or `false` disables colour, any other value enables
//!    it.
//! 3. `NO_COLOR` (any value, including empty) disables colour.
//! 4. `TERM=dumb` disables colour.
//! 5. Otherwise colour follows whether stderr is a terminal.

use std::env;
use std::io::{self, IsTerminal};

/// Escape sequences used to colour message text. Every field is empty when
/// colour is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Marks actual-only text.
    pub green: &'static str,
    /// Marks expected-only text.
    pub red: &'static str,
    /// Resets to the default foreground.
    pub white: &'static str,
    /// Marks elisions.
    pub blue: &'static str,
}

impl Palette {
    /// No escapes.
    pub const PLAIN: Self = Self {
        green: "",
        red: "",
        white: "",
        blue: "",
    };

    /// ANSI foreground escapes.
    pub const ANSI: Self = Self {
        green: "\u{1b}[32m",
        red: "\u{1b}[31m",
        white: "\u{1b}[39m",
        blue: "\u{1b}[34m",
    };

    /// Select the palette for the given colour state.
    ///
    /// # Examples
    ///
    /// ```
    /// use assertdiag::color::Palette;
    ///
    /// assert_eq!(Palette::for_colors(false), Palette::PLAIN);
    /// assert_eq!(Palette::for_colors(true).green, "\u{1b}[32m");
    /// ```
    #[must_use]
    pub const fn for_colors(enabled: bool) -> Self {
        if enabled { Self::ANSI } else { Self::PLAIN }
    }

    /// Return `true` when the palette emits escapes.
    #[must_use]
    pub const fn has_colors(self) -> bool {
        !self.green.is_empty()
    }
}

/// Resolve whether colour output is enabled from explicit configuration,
/// the process environment and stderr.
#[must_use]
pub fn resolve_colors(explicit: Option<bool>) -> bool {
    resolve_colors_with(explicit, io::stderr().is_terminal(), |key| env::var(key).ok())
}

/// Testable variant of [`resolve_colors`].
///
/// # Examples
///
/// ```
/// use assertdiag::color::resolve_colors_with;
///
/// let enabled = resolve_colors_with(None, true, |key| match key {
///     "NO_COLOR" => Some(String::new()),
///     _ => None,
/// });
/// assert!(!enabled);
/// ```
#[must_use]
pub fn resolve_colors_with<F>(explicit: Option<bool>, stderr_is_terminal: bool, read_env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(forced) = explicit {
        return forced;
    }

    if let Some(force) = read_env("FORCE_COLOR") {
        return !matches!(force.as_str(), "0" | "false");
    }

    if read_env("NO_COLOR").is_some() {
        return false;
    }

    if read_env("TERM").as_deref() == Some("dumb") {
        return false;
    }

    stderr_is_terminal
}

/// Resolve the terminal width from the environment. Unknown unless stderr is
/// a terminal.
#[must_use]
pub fn resolve_terminal_width() -> Option<usize> {
    resolve_terminal_width_with(io::stderr().is_terminal(), |key| env::var(key).ok())
}

/// Testable variant of [`resolve_terminal_width`]: parses `COLUMNS` as a
/// positive integer.
#[must_use]
pub fn resolve_terminal_width_with<F>(stderr_is_terminal: bool, read_env: F) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    if !stderr_is_terminal {
        return None;
    }
    read_env("COLUMNS")
        .and_then(|columns| columns.trim().parse::<usize>().ok())
        .filter(|columns| *columns > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fake_env<'a>(
        force: Option<&'a str>,
        no_color: Option<&'a str>,
        term: Option<&'a str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| match key {
            "FORCE_COLOR" => force.map(String::from),
            "NO_COLOR" => no_color.map(String::from),
            "TERM" => term.map(String::from),
            _ => None,
        }
    }

    #[rstest]
    #[case::explicit_on_beats_no_color(Some(true), false, None, Some("1"), None, true)]
    #[case::explicit_off_beats_force(Some(false), true, Some("1"), None, None, false)]
    #[case::force_enables_without_terminal(None, false, Some("1"), None, None, true)]
    #[case::force_zero_disables(None, true, Some("0"), None, None, false)]
    #[case::force_false_disables(None, true, Some("false"), None, None, false)]
    #[case::force_beats_no_color(None, false, Some("3"), Some("1"), None, true)]
    #[case::no_color_disables_terminal(None, true, None, Some(""), None, false)]
    #[case::dumb_term_disables(None, true, None, None, Some("dumb"), false)]
    #[case::terminal_enables(None, true, None, None, Some("xterm-256color"), true)]
    #[case::pipe_disables(None, false, None, None, None, false)]
    fn colour_resolution(
        #[case] explicit: Option<bool>,
        #[case] terminal: bool,
        #[case] force: Option<&str>,
        #[case] no_color: Option<&str>,
        #[case] term: Option<&str>,
        #[case] expected: bool,
    ) {
        let env = fake_env(force, no_color, term);
        assert_eq!(resolve_colors_with(explicit, terminal, env), expected);
    }

    #[rstest]
    #[case::terminal_with_columns(true, Some("120"), Some(120))]
    #[case::padded_columns(true, Some(" 90 "), Some(90))]
    #[case::zero_columns(true, Some("0"), None)]
    #[case::garbage_columns(true, Some("wide"), None)]
    #[case::not_a_terminal(false, Some("120"), None)]
    #[case::unset(true, None, None)]
    fn width_resolution(
        #[case] terminal: bool,
        #[case] columns: Option<&str>,
        #[case] expected: Option<usize>,
    ) {
        let read = |key: &str| (key == "COLUMNS").then(|| columns.map(String::from)).flatten();
        assert_eq!(resolve_terminal_width_with(terminal, read), expected);
    }

    #[test]
    fn palette_reports_colour_state() {
        assert!(Palette::ANSI.has_colors());
        assert!(!Palette::PLAIN.has_colors());
    }
}
