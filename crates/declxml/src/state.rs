//! Traversal state: the location stack threaded through every processor call.

use crate::error::{BoxError, Error, ErrorKind};
use crate::path::ElementPath;
use std::fmt;

/// One frame of the location stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorLocation {
    pub element_path: ElementPath,
    /// Position within the enclosing array, for array items.
    pub array_index: Option<usize>,
}

impl ProcessorLocation {
    pub fn new(element_path: impl Into<ElementPath>, array_index: Option<usize>) -> Self {
        Self {
            element_path: element_path.into(),
            array_index,
        }
    }
}

impl fmt::Display for ProcessorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_index {
            Some(index) => write!(f, "{}[{}]", self.element_path, index),
            None => write!(f, "{}", self.element_path),
        }
    }
}

/// Mutable state for a single parse or serialize call.
///
/// Created by the entry points and passed by reference through the whole
/// descent. Processors never store it, so one processor tree can serve any
/// number of calls at once.
#[derive(Debug, Default)]
pub struct ProcessorState {
    locations: Vec<ProcessorLocation>,
}

impl ProcessorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_location(&mut self, element_path: &ElementPath, array_index: Option<usize>) {
        self.locations.push(ProcessorLocation {
            element_path: element_path.clone(),
            array_index,
        });
        tracing::trace!(location = %self.breadcrumb(), "Entering");
    }

    pub fn pop_location(&mut self) {
        tracing::trace!(location = %self.breadcrumb(), "Leaving");
        self.locations.pop();
    }

    /// Run `f` with a location frame pushed, popping it afterwards whether or
    /// not `f` succeeds.
    pub fn with_location<T>(
        &mut self,
        element_path: &ElementPath,
        array_index: Option<usize>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.push_location(element_path, array_index);
        let result = f(self);
        self.pop_location();
        result
    }

    pub fn locations(&self) -> &[ProcessorLocation] {
        &self.locations
    }

    /// Render the stack as `a/b[1]/c`, skipping frames for the self-marker.
    pub fn breadcrumb(&self) -> String {
        render_breadcrumb(&self.locations)
    }

    /// Build an engine error whose message ends with the current location.
    pub fn error(&self, kind: ErrorKind, message: impl fmt::Display) -> Error {
        Error::new(kind, locate(message, &self.locations))
    }

    /// A read-only view for hook callbacks.
    pub fn view(&self) -> ProcessorStateView<'_> {
        ProcessorStateView { state: self }
    }
}

/// Read-only access to the traversal state, handed to hooks.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorStateView<'a> {
    state: &'a ProcessorState,
}

impl ProcessorStateView<'_> {
    /// The location frames, outermost first.
    pub fn locations(&self) -> &[ProcessorLocation] {
        self.state.locations()
    }

    pub fn breadcrumb(&self) -> String {
        self.state.breadcrumb()
    }

    /// Build an engine error of the given kind at the current location.
    pub fn error(&self, kind: ErrorKind, message: impl fmt::Display) -> Error {
        self.state.error(kind, message)
    }

    /// Wrap a hook's own error, appending the current location to its message.
    ///
    /// The original error stays available through
    /// [`Error::downcast_custom`].
    ///
    /// ```rust
    /// use declxml::{Hooks, Error, Value};
    ///
    /// let hooks = Hooks::new().after_parse(|state, value: Value| {
    ///     if value.as_i64().is_some_and(|age| age < 0) {
    ///         return Err(state.raise_error("age must not be negative"));
    ///     }
    ///     Ok(value)
    /// });
    /// # let _ = hooks;
    /// ```
    pub fn raise_error(&self, err: impl Into<BoxError>) -> Error {
        let source = err.into();
        Error::Custom {
            message: locate(&source, self.locations()),
            source,
        }
    }
}

fn render_breadcrumb(locations: &[ProcessorLocation]) -> String {
    locations
        .iter()
        .filter(|location| !location.element_path.is_current())
        .map(ProcessorLocation::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

fn locate(message: impl fmt::Display, locations: &[ProcessorLocation]) -> String {
    let message = message.to_string();
    let breadcrumb = render_breadcrumb(locations);
    match (message.is_empty(), breadcrumb.is_empty()) {
        (_, true) => message,
        (true, false) => breadcrumb,
        (false, false) => format!("{message} at {breadcrumb}"),
    }
}
