//! Hook decorators: value transformations around any processor.

use super::{Processor, RootProcessor};
use crate::error::Result;
use crate::path::ElementPath;
use crate::state::{ProcessorState, ProcessorStateView};
use crate::value::Value;
use declxml_tree::XmlElement;
use std::fmt;
use std::sync::Arc;

/// A hook callback.
///
/// Receives a read-only view of the traversal state and the value, and
/// returns the value to continue with. Errors abort the whole call and
/// reach the caller unchanged.
pub type Hook = Arc<dyn Fn(&ProcessorStateView<'_>, Value) -> Result<Value> + Send + Sync>;

/// A pair of optional hooks. A missing hook passes values through.
#[derive(Clone, Default)]
pub struct Hooks {
    after_parse: Option<Hook>,
    before_serialize: Option<Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` on every value this processor parses.
    pub fn after_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ProcessorStateView<'_>, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.after_parse = Some(Arc::new(hook));
        self
    }

    /// Run `hook` on every value before this processor serializes it.
    pub fn before_serialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ProcessorStateView<'_>, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.before_serialize = Some(Arc::new(hook));
        self
    }

    fn apply_after_parse(&self, state: &ProcessorState, value: Value) -> Result<Value> {
        match &self.after_parse {
            Some(hook) => hook(&state.view(), value),
            None => Ok(value),
        }
    }

    fn apply_before_serialize(&self, state: &ProcessorState, value: &Value) -> Result<Value> {
        match &self.before_serialize {
            Some(hook) => hook(&state.view(), value.clone()),
            None => Ok(value.clone()),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("after_parse", &self.after_parse.is_some())
            .field("before_serialize", &self.before_serialize.is_some())
            .finish()
    }
}

/// A processor wrapped with [`Hooks`].
///
/// Behaves exactly like the wrapped processor, including as a document
/// root, except that parsed values pass through `after_parse` and values
/// to serialize pass through `before_serialize`.
#[derive(Debug)]
pub struct Hooked<P> {
    inner: P,
    hooks: Hooks,
}

impl<P: Processor> Hooked<P> {
    pub fn new(inner: P, hooks: Hooks) -> Self {
        Self { inner, hooks }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: Processor> Processor for Hooked<P> {
    fn alias(&self) -> &str {
        self.inner.alias()
    }

    fn element_path(&self) -> &ElementPath {
        self.inner.element_path()
    }

    fn is_required(&self) -> bool {
        self.inner.is_required()
    }

    fn parse_at_element(&self, element: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        let value = self.inner.parse_at_element(element, state)?;
        self.hooks.apply_after_parse(state, value)
    }

    fn parse_from_parent(&self, parent: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        let value = self.inner.parse_from_parent(parent, state)?;
        self.hooks.apply_after_parse(state, value)
    }

    fn serialize(&self, value: &Value, state: &mut ProcessorState) -> Result<XmlElement> {
        let value = self.hooks.apply_before_serialize(state, value)?;
        self.inner.serialize(&value, state)
    }

    fn serialize_on_parent(
        &self,
        parent: &mut XmlElement,
        value: &Value,
        state: &mut ProcessorState,
    ) -> Result<()> {
        let value = self.hooks.apply_before_serialize(state, value)?;
        self.inner.serialize_on_parent(parent, &value, state)
    }

    fn as_root(&self) -> Option<&dyn RootProcessor> {
        self.inner.as_root().map(|_| self as &dyn RootProcessor)
    }
}

impl<P: Processor> RootProcessor for Hooked<P> {
    fn parse_at_root(&self, root: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        let Some(inner) = self.inner.as_root() else {
            return Err(state.error(
                crate::ErrorKind::InvalidRootProcessor,
                format!("Invalid root processor: \"{}\"", self.alias()),
            ));
        };
        let value = inner.parse_at_root(root, state)?;
        self.hooks.apply_after_parse(state, value)
    }
}
