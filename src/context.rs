//! Ambient configuration for building failures.
//!
//! Building a failure consults a value renderer, a diff oracle, a diff
//! printer and a stack capture facility, and reads two pieces of mutable
//! state: whether colour output is enabled and how many stack frames to
//! record. [`FailureContext`] carries all of these explicitly. Temporary
//! changes to the mutable state go through scoped guards that restore the
//! previous value when dropped, on every exit path.
//!
//! # Examples
//!
//! ```
//! use assertdiag::context::FailureContext;
//!
//! let ctx = FailureContext::plain().with_stack_trace_limit(4);
//! {
//!     let _quiet = ctx.suppress_stack_frames();
//!     assert_eq!(ctx.stack_trace_limit(), 0);
//! }
//! assert_eq!(ctx.stack_trace_limit(), 4);
//! ```

use crate::color::{self, Palette};
use crate::diff::{DiffOracle, MyersOracle};
use crate::printer::{DiffPrinter, MyersPrinter};
use crate::render::{Inspector, RenderOptions, ValueRenderer};
use crate::stack::{BacktraceCapture, HeaderOnly, StackCapture};
use crate::value::Value;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Frames recorded per stack unless configured otherwise.
pub const DEFAULT_STACK_TRACE_LIMIT: usize = 10;

/// Where the colour state comes from when it is refreshed.
#[derive(Clone)]
pub enum ColorSource {
    /// Always the given state.
    Fixed(bool),
    /// Re-read from the environment and stderr on every refresh.
    Environment,
    /// Asks the given resolver on every refresh.
    Resolver(Rc<dyn Fn() -> bool>),
}

impl ColorSource {
    /// Refresh from `resolve`.
    ///
    /// # Examples
    ///
    /// ```
    /// use assertdiag::color::resolve_colors_with;
    /// use assertdiag::context::{ColorSource, FailureContext};
    ///
    /// let source = ColorSource::resolver(|| resolve_colors_with(None, true, |_| None));
    /// assert!(FailureContext::plain().with_color_source(source).colors());
    /// ```
    #[must_use]
    pub fn resolver(resolve: impl Fn() -> bool + 'static) -> Self {
        Self::Resolver(Rc::new(resolve))
    }

    fn resolve(&self) -> bool {
        match self {
            Self::Fixed(enabled) => *enabled,
            Self::Environment => color::resolve_colors(None),
            Self::Resolver(resolve) => resolve(),
        }
    }
}

impl fmt::Debug for ColorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(enabled) => f.debug_tuple("Fixed").field(enabled).finish(),
            Self::Environment => f.write_str("Environment"),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// Collaborators and ambient state used while building failures.
pub struct FailureContext {
    renderer: Box<dyn ValueRenderer>,
    oracle: Box<dyn DiffOracle>,
    printer: Box<dyn DiffPrinter>,
    stack: Box<dyn StackCapture>,
    color_source: ColorSource,
    colors: Cell<bool>,
    terminal_width: Option<usize>,
    stack_trace_limit: Cell<usize>,
}

impl FailureContext {
    /// Context backed by the process environment: colour and terminal width
    /// follow stderr and the environment, stacks come from real backtraces.
    #[must_use]
    pub fn new() -> Self {
        let color_source = ColorSource::Environment;
        let colors = Cell::new(color_source.resolve());
        Self {
            renderer: Box::new(Inspector),
            oracle: Box::new(MyersOracle),
            printer: Box::new(MyersPrinter),
            stack: Box::new(BacktraceCapture),
            color_source,
            colors,
            terminal_width: color::resolve_terminal_width(),
            stack_trace_limit: Cell::new(DEFAULT_STACK_TRACE_LIMIT),
        }
    }

    /// Deterministic context: no colour, unknown terminal width and
    /// header-only stacks.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            renderer: Box::new(Inspector),
            oracle: Box::new(MyersOracle),
            printer: Box::new(MyersPrinter),
            stack: Box::new(HeaderOnly),
            color_source: ColorSource::Fixed(false),
            colors: Cell::new(false),
            terminal_width: None,
            stack_trace_limit: Cell::new(DEFAULT_STACK_TRACE_LIMIT),
        }
    }

    /// Replace the value renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl ValueRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the diff oracle.
    #[must_use]
    pub fn with_oracle(mut self, oracle: impl DiffOracle + 'static) -> Self {
        self.oracle = Box::new(oracle);
        self
    }

    /// Replace the diff printer.
    #[must_use]
    pub fn with_printer(mut self, printer: impl DiffPrinter + 'static) -> Self {
        self.printer = Box::new(printer);
        self
    }

    /// Replace the stack capture facility.
    #[must_use]
    pub fn with_stack_capture(mut self, stack: impl StackCapture + 'static) -> Self {
        self.stack = Box::new(stack);
        self
    }

    /// Fix the colour state.
    #[must_use]
    pub fn with_colors(self, enabled: bool) -> Self {
        self.with_color_source(ColorSource::Fixed(enabled))
    }

    /// Change where the colour state is refreshed from, resolving it now.
    #[must_use]
    pub fn with_color_source(mut self, source: ColorSource) -> Self {
        self.colors.set(source.resolve());
        self.color_source = source;
        self
    }

    /// Set the terminal width used to decide whether a caret fits.
    #[must_use]
    pub fn with_terminal_width(mut self, width: Option<usize>) -> Self {
        self.terminal_width = width;
        self
    }

    /// Set the number of frames recorded per stack.
    #[must_use]
    pub fn with_stack_trace_limit(self, limit: usize) -> Self {
        self.stack_trace_limit.set(limit);
        self
    }

    /// The value renderer.
    #[must_use]
    pub fn renderer(&self) -> &dyn ValueRenderer {
        self.renderer.as_ref()
    }

    /// The diff oracle.
    #[must_use]
    pub fn oracle(&self) -> &dyn DiffOracle {
        self.oracle.as_ref()
    }

    /// The diff printer.
    #[must_use]
    pub fn printer(&self) -> &dyn DiffPrinter {
        self.printer.as_ref()
    }

    /// The stack capture facility.
    #[must_use]
    pub fn stack_capture(&self) -> &dyn StackCapture {
        self.stack.as_ref()
    }

    /// The current colour state.
    #[must_use]
    pub const fn colors(&self) -> bool {
        self.colors.get()
    }

    /// The palette matching the current colour state.
    #[must_use]
    pub const fn palette(&self) -> Palette {
        Palette::for_colors(self.colors())
    }

    /// Re-resolve the colour state from its source and return it.
    pub fn refresh_colors(&self) -> bool {
        let enabled = self.color_source.resolve();
        self.colors.set(enabled);
        enabled
    }

    /// The terminal width, when known.
    #[must_use]
    pub const fn terminal_width(&self) -> Option<usize> {
        self.terminal_width
    }

    /// Frames currently recorded per stack.
    #[must_use]
    pub const fn stack_trace_limit(&self) -> usize {
        self.stack_trace_limit.get()
    }

    /// Record no stack frames until the returned guard is dropped.
    #[must_use = "the previous limit is restored when the guard is dropped"]
    pub fn suppress_stack_frames(&self) -> StackLimitGuard<'_> {
        let previous = self.stack_trace_limit.replace(0);
        StackLimitGuard {
            limit: &self.stack_trace_limit,
            previous,
        }
    }

    /// Render `value` with the canonical message options.
    pub(crate) fn render(&self, value: &Value) -> String {
        self.renderer.render(value, &RenderOptions::canonical())
    }
}

impl Default for FailureContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FailureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureContext")
            .field("color_source", &self.color_source)
            .field("colors", &self.colors.get())
            .field("terminal_width", &self.terminal_width)
            .field("stack_trace_limit", &self.stack_trace_limit.get())
            .finish_non_exhaustive()
    }
}

/// Restores the stack frame limit when dropped.
pub struct StackLimitGuard<'a> {
    limit: &'a Cell<usize>,
    previous: usize,
}

impl Drop for StackLimitGuard<'_> {
    fn drop(&mut self) {
        self.limit.set(self.previous);
    }
}

impl fmt::Debug for StackLimitGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackLimitGuard")
            .field("previous", &self.previous)
            .finish_non_exhaustive()
    }
}
