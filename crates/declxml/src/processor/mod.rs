//! The processor protocol and its node kinds.
//!
//! A processor describes one part of the correspondence between an XML
//! document and a [`Value`]. Processors compose into trees: records own
//! their field processors, arrays own an item processor, aggregates own a
//! record, and [`Hooked`] wraps any processor. The same tree drives both
//! directions.
//!
//! Every method receives the per-call [`ProcessorState`]. A parent pushes a
//! location frame for a child around each `parse_from_parent` and
//! `serialize_on_parent` call; arrays push a frame carrying the item index
//! around each item. Nodes never push frames for themselves.

mod aggregate;
mod array;
mod hooks;
mod primitive;
mod record;

pub use aggregate::{AggregateProcessor, Converter, aggregate, named_tuple, user_object};
pub use array::{ArrayProcessor, array};
pub use hooks::{Hook, Hooked, Hooks};
pub use primitive::{
    PrimitiveKind, PrimitiveProcessor, boolean, floating_point, integer, string,
};
pub use record::{RecordProcessor, dictionary};

use crate::error::{ErrorKind, Result};
use crate::path::ElementPath;
use crate::state::ProcessorState;
use crate::value::Value;
use declxml_tree::XmlElement;
use std::fmt;

/// A node of a processor tree.
pub trait Processor: fmt::Debug + Send + Sync {
    /// Key under which this processor's value appears in a record.
    fn alias(&self) -> &str;

    /// Where this processor's value lives, relative to its parent element.
    fn element_path(&self) -> &ElementPath;

    /// Whether an absent or empty value is an error.
    fn is_required(&self) -> bool;

    /// Parse the value held by `element`, which is this processor's own element.
    fn parse_at_element(&self, element: &XmlElement, state: &mut ProcessorState) -> Result<Value>;

    /// Locate this processor's element under `parent` and parse its value.
    fn parse_from_parent(&self, parent: &XmlElement, state: &mut ProcessorState) -> Result<Value>;

    /// Serialize `value` into a new, unattached element.
    fn serialize(&self, value: &Value, state: &mut ProcessorState) -> Result<XmlElement>;

    /// Serialize `value` onto `parent`, reusing existing elements along this
    /// processor's path.
    fn serialize_on_parent(
        &self,
        parent: &mut XmlElement,
        value: &Value,
        state: &mut ProcessorState,
    ) -> Result<()>;

    /// This processor as a document root, if it can be one.
    fn as_root(&self) -> Option<&dyn RootProcessor> {
        None
    }
}

/// A processor that can anchor a whole document.
pub trait RootProcessor: Processor {
    /// Parse the document whose root element is `root`.
    fn parse_at_root(&self, root: &XmlElement, state: &mut ProcessorState) -> Result<Value>;
}

/// Builder conveniences available on every processor.
pub trait ProcessorExt: Processor + Sized + 'static {
    /// Wrap this processor with value-transforming hooks.
    fn hooks(self, hooks: Hooks) -> Hooked<Self> {
        Hooked::new(self, hooks)
    }

    /// Box this processor for use as a record field.
    fn boxed(self) -> Box<dyn Processor> {
        Box::new(self)
    }
}

impl<P: Processor + 'static> ProcessorExt for P {}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn alias(&self) -> &str {
        (**self).alias()
    }

    fn element_path(&self) -> &ElementPath {
        (**self).element_path()
    }

    fn is_required(&self) -> bool {
        (**self).is_required()
    }

    fn parse_at_element(&self, element: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        (**self).parse_at_element(element, state)
    }

    fn parse_from_parent(&self, parent: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        (**self).parse_from_parent(parent, state)
    }

    fn serialize(&self, value: &Value, state: &mut ProcessorState) -> Result<XmlElement> {
        (**self).serialize(value, state)
    }

    fn serialize_on_parent(
        &self,
        parent: &mut XmlElement,
        value: &Value,
        state: &mut ProcessorState,
    ) -> Result<()> {
        (**self).serialize_on_parent(parent, value, state)
    }

    fn as_root(&self) -> Option<&dyn RootProcessor> {
        (**self).as_root()
    }
}

/// Create a fresh element chain for `path`, fill its innermost element, and
/// return the outermost element.
///
/// The self-marker names no element, so it cannot produce one.
pub(crate) fn build_element(
    path: &ElementPath,
    alias: &str,
    state: &mut ProcessorState,
    fill: impl FnOnce(&mut XmlElement, &mut ProcessorState) -> Result<()>,
) -> Result<XmlElement> {
    let Some(name) = path.leaf_name() else {
        return Err(state.error(
            ErrorKind::InvalidRootProcessor,
            format!("Cannot serialize \"{alias}\" to a new element from path \".\""),
        ));
    };
    let mut leaf = XmlElement::new(name);
    fill(&mut leaf, state)?;
    Ok(path.wrap(leaf))
}
