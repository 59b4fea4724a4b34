//! Record (dictionary) processors: a labelled group of fields.

use super::{Processor, RootProcessor, build_element};
use crate::error::{ErrorKind, Result};
use crate::path::ElementPath;
use crate::state::ProcessorState;
use crate::value::{Mapping, Value};
use declxml_tree::XmlElement;

/// An ordered group of named field processors sharing one element.
///
/// Parses to a [`Value::Record`] keyed by each field's alias. Fields are
/// processed in declaration order, which is also the order elements are
/// written in.
#[derive(Debug)]
pub struct RecordProcessor {
    name: String,
    path: ElementPath,
    children: Vec<Box<dyn Processor>>,
    required: bool,
    alias: Option<String>,
}

impl RecordProcessor {
    pub fn new(element_path: impl Into<String>, children: Vec<Box<dyn Processor>>) -> Self {
        let name = element_path.into();
        Self {
            path: ElementPath::parse(&name),
            name,
            children,
            required: true,
            alias: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn children(&self) -> &[Box<dyn Processor>] {
        &self.children
    }

    fn parse_fields(&self, element: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        let mut mapping = Mapping::with_capacity(self.children.len());
        for child in &self.children {
            let value = state.with_location(child.element_path(), None, |state| {
                child.parse_from_parent(element, state)
            })?;
            mapping.insert(child.alias().to_string(), value);
        }
        Ok(Value::Record(mapping))
    }

    /// The result for an absent element: an error when required, otherwise
    /// an empty record.
    fn parse_missing(&self, state: &ProcessorState) -> Result<Value> {
        if self.required {
            Err(self.missing_error(state))
        } else {
            Ok(Value::Record(Mapping::new()))
        }
    }

    fn missing_error(&self, state: &ProcessorState) -> crate::Error {
        state.error(
            ErrorKind::MissingValue,
            format!("Missing required aggregate: \"{}\"", self.path),
        )
    }

    /// The fields of a value about to be serialized. `Null` has none.
    fn fields<'v>(&self, value: &'v Value, state: &ProcessorState) -> Result<Option<&'v Mapping>> {
        match value {
            Value::Null => Ok(None),
            Value::Record(mapping) => Ok(Some(mapping)),
            other => Err(state.error(
                ErrorKind::Conversion,
                format!(
                    "Expected a record for \"{}\", found {}",
                    self.alias(),
                    other.type_name()
                ),
            )),
        }
    }

    fn serialize_fields(
        &self,
        element: &mut XmlElement,
        fields: Option<&Mapping>,
        state: &mut ProcessorState,
    ) -> Result<()> {
        for child in &self.children {
            let value = fields
                .and_then(|fields| fields.get(child.alias()))
                .unwrap_or(&Value::Null);
            state.with_location(child.element_path(), None, |state| {
                child.serialize_on_parent(element, value, state)
            })?;
        }
        Ok(())
    }
}

impl Processor for RecordProcessor {
    fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn element_path(&self) -> &ElementPath {
        &self.path
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn parse_at_element(&self, element: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        self.parse_fields(element, state)
    }

    fn parse_from_parent(&self, parent: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        match self.path.find(parent) {
            Some(element) => self.parse_fields(element, state),
            None => self.parse_missing(state),
        }
    }

    fn serialize(&self, value: &Value, state: &mut ProcessorState) -> Result<XmlElement> {
        if !value.is_truthy() && self.required {
            return Err(self.missing_error(state));
        }

        let fields = self.fields(value, state)?;
        build_element(&self.path, self.alias(), state, |element, state| {
            self.serialize_fields(element, fields, state)
        })
    }

    fn serialize_on_parent(
        &self,
        parent: &mut XmlElement,
        value: &Value,
        state: &mut ProcessorState,
    ) -> Result<()> {
        if !value.is_truthy() {
            return if self.required {
                Err(self.missing_error(state))
            } else {
                Ok(())
            };
        }

        let fields = self.fields(value, state)?;
        let element = self.path.find_or_create(parent);
        self.serialize_fields(element, fields, state)
    }

    fn as_root(&self) -> Option<&dyn RootProcessor> {
        Some(self)
    }
}

impl RootProcessor for RecordProcessor {
    fn parse_at_root(&self, root: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        match self.path.find_from_root(root) {
            Some(element) => self.parse_fields(element, state),
            None => self.parse_missing(state),
        }
    }
}

/// A record of `children` stored under the element at `element_path`.
pub fn dictionary(
    element_path: impl Into<String>,
    children: Vec<Box<dyn Processor>>,
) -> RecordProcessor {
    RecordProcessor::new(element_path, children)
}
