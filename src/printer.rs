//! Turns edit scripts into message text.
//!
//! [`MyersPrinter::print_lines`] prints one marker-prefixed line per edit and
//! collapses long unchanged runs; [`MyersPrinter::print_chars`] concatenates
//! character edits, relying on colour to distinguish them.

use crate::color::Palette;
use crate::diff::{DiffKind, DiffOp};

/// Unchanged lines shown at the start of each unchanged run.
const CONTEXT_LINES: usize = 5;

/// A printed line diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintedDiff {
    /// The printed block, starting with a newline.
    pub message: String,
    /// Whether unchanged lines were elided.
    pub skipped: bool,
}

/// Prints edit scripts.
pub trait DiffPrinter {
    /// Print a line-mode edit script.
    fn print_lines(&self, ops: &[DiffOp], palette: Palette) -> PrintedDiff;

    /// Print a character-mode edit script.
    fn print_chars(&self, ops: &[DiffOp], palette: Palette) -> String;
}

/// Default printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersPrinter;

impl DiffPrinter for MyersPrinter {
    fn print_lines(&self, ops: &[DiffOp], palette: Palette) -> PrintedDiff {
        let Palette {
            green,
            red,
            white,
            blue,
        } = palette;
        let mut message = String::new();
        let mut skipped = false;
        let mut unchanged = 0usize;

        for (index, op) in ops.iter().enumerate() {
            let previous = index.checked_sub(1).and_then(|i| ops.get(i));
            let leaves_unchanged_run = previous.is_some_and(|prev| prev.kind == DiffKind::Equal)
                && op.kind != DiffKind::Equal;
            if leaves_unchanged_run {
                // Reprint the tail of the unchanged run that was hidden.
                let tail = |back: usize| {
                    index
                        .checked_sub(back)
                        .and_then(|i| ops.get(i))
                        .map_or("", |tail_op| tail_op.value.as_str())
                };
                if unchanged == CONTEXT_LINES + 1 {
                    message.push_str(&format!("{white}  {}\n", tail(1)));
                } else if unchanged == CONTEXT_LINES + 2 {
                    message.push_str(&format!("{white}  {}\n", tail(2)));
                    message.push_str(&format!("{white}  {}\n", tail(1)));
                } else if unchanged >= CONTEXT_LINES + 3 {
                    message.push_str(&format!("{blue}...{white}\n"));
                    message.push_str(&format!("{white}  {}\n", tail(1)));
                    skipped = true;
                }
                unchanged = 0;
            }

            match op.kind {
                DiffKind::Insert => {
                    message.push_str(&format!("{green}+{white} {}\n", op.value));
                }
                DiffKind::Delete => {
                    message.push_str(&format!("{red}-{white} {}\n", op.value));
                }
                DiffKind::Equal => {
                    if unchanged < CONTEXT_LINES {
                        message.push_str(&format!("{white}  {}\n", op.value));
                    }
                    unchanged += 1;
                }
            }
        }

        PrintedDiff {
            message: format!("\n{}", message.trim_end()),
            skipped,
        }
    }

    fn print_chars(&self, ops: &[DiffOp], palette: Palette) -> String {
        let Palette {
            green, red, white, ..
        } = palette;
        let mut message = String::from("\n");
        for op in ops {
            let colour = match op.kind {
                DiffKind::Insert => green,
                DiffKind::Delete => red,
                DiffKind::Equal => white,
            };
            message.push_str(colour);
            message.push_str(&op.value);
            message.push_str(white);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn equal_run(count: usize) -> impl Iterator<Item = DiffOp> {
        (0..count).map(|n| DiffOp::new(DiffKind::Equal, format!("line {n}")))
    }

    #[test]
    fn prints_markers_per_line() {
        let ops = [
            DiffOp::new(DiffKind::Equal, "{"),
            DiffOp::new(DiffKind::Insert, "  a: 1"),
            DiffOp::new(DiffKind::Delete, "  a: 2"),
            DiffOp::new(DiffKind::Equal, "}"),
        ];
        let printed = MyersPrinter.print_lines(&ops, Palette::PLAIN);
        assert_eq!(printed.message, "\n  {\n+   a: 1\n-   a: 2\n  }");
        assert!(!printed.skipped);
    }

    #[rstest]
    #[case::fits(5, false, 6)]
    #[case::one_extra(6, false, 7)]
    #[case::two_extra(7, false, 8)]
    #[case::collapsed(12, true, 8)]
    fn long_unchanged_runs_collapse(
        #[case] run: usize,
        #[case] skipped: bool,
        #[case] printed_lines: usize,
    ) {
        let mut ops: Vec<DiffOp> = equal_run(run).collect();
        ops.push(DiffOp::new(DiffKind::Insert, "new"));
        let printed = MyersPrinter.print_lines(&ops, Palette::PLAIN);
        assert_eq!(printed.skipped, skipped);
        // The leading newline contributes one empty line.
        assert_eq!(printed.message.lines().count(), printed_lines + 1);
        assert!(printed.message.ends_with("+ new"));
        let last_context = format!("  line {}", run - 1);
        assert!(printed.message.contains(&last_context));
    }

    #[test]
    fn trailing_unchanged_run_is_cut_without_marker() {
        let mut ops = vec![DiffOp::new(DiffKind::Delete, "old")];
        ops.extend(equal_run(9));
        let printed = MyersPrinter.print_lines(&ops, Palette::PLAIN);
        assert!(!printed.skipped);
        assert_eq!(
            printed.message,
            "\n- old\n  line 0\n  line 1\n  line 2\n  line 3\n  line 4"
        );
    }

    #[test]
    fn character_diff_is_concatenated_with_colours() {
        let ops = [
            DiffOp::new(DiffKind::Equal, "'ab"),
            DiffOp::new(DiffKind::Insert, "c"),
            DiffOp::new(DiffKind::Delete, "d"),
            DiffOp::new(DiffKind::Equal, "'"),
        ];
        assert_eq!(MyersPrinter.print_chars(&ops, Palette::PLAIN), "\n'abcd'");
        let coloured = MyersPrinter.print_chars(&ops, Palette::ANSI);
        assert!(coloured.contains("\u{1b}[32mc\u{1b}[39m"));
        assert!(coloured.contains("\u{1b}[31md\u{1b}[39m"));
    }
}
