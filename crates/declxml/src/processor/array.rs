//! Array processors: zero or more repetitions of one item processor.

use super::{Processor, RootProcessor, build_element};
use crate::error::{Error, ErrorKind, Result};
use crate::path::ElementPath;
use crate::state::ProcessorState;
use crate::value::Value;
use declxml_tree::XmlElement;

/// A sequence of items, each handled by the same item processor.
///
/// A *nested* array keeps its items inside a wrapper element. An
/// *embedded* array has no wrapper: its items are repeated directly among
/// the other fields of the parent element, so it cannot be a document root.
///
/// The array is required exactly when its item processor is required.
#[derive(Debug)]
pub struct ArrayProcessor {
    item: Box<dyn Processor>,
    nested: Option<String>,
    path: ElementPath,
    alias: Option<String>,
    omit_empty: bool,
}

impl ArrayProcessor {
    pub fn new(item: impl Processor + 'static) -> Self {
        Self {
            item: Box::new(item),
            nested: None,
            path: ElementPath::Current,
            alias: None,
            omit_empty: false,
        }
    }

    /// Keep the items inside a wrapper element at `element_path`.
    pub fn nested(mut self, element_path: impl Into<String>) -> Self {
        let name = element_path.into();
        self.path = ElementPath::parse(&name);
        self.nested = Some(name);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Skip the wrapper element of an empty array when serializing.
    ///
    /// Only honoured for optional nested arrays. An empty array that is
    /// itself an item of another array is always written.
    pub fn omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = omit_empty;
        self
    }

    pub fn item(&self) -> &dyn Processor {
        self.item.as_ref()
    }

    pub fn is_nested(&self) -> bool {
        self.nested.is_some()
    }

    fn effective_omit_empty(&self) -> bool {
        self.omit_empty && self.nested.is_some() && !self.item.is_required()
    }

    fn missing_error(&self, state: &ProcessorState) -> Error {
        state.error(
            ErrorKind::MissingValue,
            format!("Missing required array: \"{}\"", self.alias()),
        )
    }

    fn parse_items(&self, elements: Vec<&XmlElement>, state: &mut ProcessorState) -> Result<Value> {
        let item_path = self.item.element_path();
        let mut values = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            let value = state.with_location(item_path, Some(index), |state| {
                self.item.parse_at_element(element, state)
            })?;
            values.push(value);
        }

        if values.is_empty() && self.is_required() {
            return Err(self.missing_error(state));
        }
        Ok(Value::Array(values))
    }

    fn items<'v>(&self, value: &'v Value, state: &ProcessorState) -> Result<&'v [Value]> {
        match value {
            Value::Null => Ok(&[]),
            Value::Array(items) => Ok(items),
            other => Err(state.error(
                ErrorKind::Conversion,
                format!(
                    "Expected an array for \"{}\", found {}",
                    self.alias(),
                    other.type_name()
                ),
            )),
        }
    }

    fn serialize_items(
        &self,
        element: &mut XmlElement,
        items: &[Value],
        state: &mut ProcessorState,
    ) -> Result<()> {
        let item_path = self.item.element_path();
        for (index, value) in items.iter().enumerate() {
            let child = state.with_location(item_path, Some(index), |state| {
                self.item.serialize(value, state)
            })?;
            element.push_child(child);
        }
        Ok(())
    }

    fn non_nested_error(&self, state: &ProcessorState, action: &str) -> Error {
        state.error(
            ErrorKind::InvalidRootProcessor,
            format!("Non-nested array \"{}\" cannot {}", self.alias(), action),
        )
    }
}

impl Processor for ArrayProcessor {
    fn alias(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.nested.as_deref())
            .unwrap_or_else(|| self.item.alias())
    }

    /// The wrapper path for nested arrays, the self-marker otherwise.
    fn element_path(&self) -> &ElementPath {
        &self.path
    }

    fn is_required(&self) -> bool {
        self.item.is_required()
    }

    fn parse_at_element(&self, element: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        self.parse_items(self.item.element_path().find_all(element), state)
    }

    fn parse_from_parent(&self, parent: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        if self.nested.is_none() {
            return self.parse_at_element(parent, state);
        }
        match self.path.find(parent) {
            Some(wrapper) => self.parse_at_element(wrapper, state),
            None => self.parse_items(Vec::new(), state),
        }
    }

    fn serialize(&self, value: &Value, state: &mut ProcessorState) -> Result<XmlElement> {
        if self.nested.is_none() {
            return Err(self.non_nested_error(state, "be serialized to a new element"));
        }

        let items = self.items(value, state)?;
        if items.is_empty() && self.is_required() {
            return Err(self.missing_error(state));
        }

        build_element(&self.path, self.alias(), state, |element, state| {
            self.serialize_items(element, items, state)
        })
    }

    fn serialize_on_parent(
        &self,
        parent: &mut XmlElement,
        value: &Value,
        state: &mut ProcessorState,
    ) -> Result<()> {
        let items = self.items(value, state)?;
        if items.is_empty() {
            if self.is_required() {
                return Err(self.missing_error(state));
            }
            if self.effective_omit_empty() {
                return Ok(());
            }
            if self.omit_empty {
                tracing::warn!(
                    array = self.alias(),
                    "omit_empty ignored for non-nested arrays"
                );
            }
        }

        // Embedded arrays resolve to the parent itself.
        let element = self.path.find_or_create(parent);
        self.serialize_items(element, items, state)
    }

    fn as_root(&self) -> Option<&dyn RootProcessor> {
        self.nested.as_ref().map(|_| self as &dyn RootProcessor)
    }
}

impl RootProcessor for ArrayProcessor {
    fn parse_at_root(&self, root: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        if self.nested.is_none() {
            return Err(self.non_nested_error(state, "be the root element"));
        }
        match self.path.find_from_root(root) {
            Some(wrapper) => self.parse_at_element(wrapper, state),
            None => self.parse_items(Vec::new(), state),
        }
    }
}

/// An array of `item`s. Embedded unless [`nested`](ArrayProcessor::nested)
/// is set.
pub fn array(item: impl Processor + 'static) -> ArrayProcessor {
    ArrayProcessor::new(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::integer;
    use declxml_tree::parse;

    #[test]
    fn test_alias_precedence() {
        assert_eq!(array(integer("value")).alias(), "value");
        assert_eq!(array(integer("value")).nested("values").alias(), "values");
        assert_eq!(
            array(integer("value"))
                .nested("values")
                .with_alias("numbers")
                .alias(),
            "numbers"
        );
    }

    #[test]
    fn test_required_follows_item() {
        assert!(array(integer("v")).is_required());
        assert!(!array(integer("v").required(false)).is_required());
    }

    #[test]
    fn test_embedded_array_is_not_a_root() {
        assert!(array(integer("v")).as_root().is_none());
        assert!(array(integer("v")).nested("vs").as_root().is_some());

        let err = array(integer("v"))
            .serialize(&Value::from(vec![1]), &mut ProcessorState::new())
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidRootProcessor));
    }

    #[test]
    fn test_item_frames_carry_index() {
        let root = parse("<root><v>1</v><v>x</v></root>").unwrap();
        let mut state = ProcessorState::new();
        state.push_location(&ElementPath::parse("root"), None);

        let err = array(integer("v"))
            .parse_from_parent(&root, &mut state)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid integer value: \"x\" at root/v[1]");
    }

    #[test]
    fn test_optional_empty_nested_array_writes_wrapper() {
        let mut parent = XmlElement::new("root");
        array(integer("v").required(false))
            .nested("vs")
            .serialize_on_parent(&mut parent, &Value::Array(vec![]), &mut ProcessorState::new())
            .unwrap();
        assert_eq!(parent.children, vec![XmlElement::new("vs")]);
    }

    #[test]
    fn test_omit_empty_drops_wrapper() {
        let mut parent = XmlElement::new("root");
        array(integer("v").required(false))
            .nested("vs")
            .omit_empty(true)
            .serialize_on_parent(&mut parent, &Value::Null, &mut ProcessorState::new())
            .unwrap();
        assert!(parent.children.is_empty());
    }

    #[test]
    fn test_omit_empty_before_nested() {
        let processor = array(integer("v").required(false))
            .omit_empty(true)
            .nested("vs");
        assert!(processor.effective_omit_empty());

        let mut parent = XmlElement::new("root");
        processor
            .serialize_on_parent(&mut parent, &Value::Array(vec![]), &mut ProcessorState::new())
            .unwrap();
        assert!(parent.children.is_empty());
    }
}
