//! Aggregate processors: records converted to and from structured values.

use super::record::RecordProcessor;
use super::{Processor, RootProcessor};
use crate::error::{BoxError, ErrorKind, Result};
use crate::path::ElementPath;
use crate::state::ProcessorState;
use crate::value::{Mapping, StructuredValue, Value};
use declxml_tree::XmlElement;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

type ToStructuredFn = dyn Fn(Mapping) -> std::result::Result<Value, BoxError> + Send + Sync;
type ToMappingFn = dyn Fn(&Value) -> std::result::Result<Mapping, BoxError> + Send + Sync;

/// A pair of functions translating between a record's mapping and a
/// structured value.
#[derive(Clone)]
pub struct Converter {
    to_structured: Arc<ToStructuredFn>,
    to_mapping: Arc<ToMappingFn>,
}

impl Converter {
    pub fn new<S, M>(to_structured: S, to_mapping: M) -> Self
    where
        S: Fn(Mapping) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
        M: Fn(&Value) -> std::result::Result<Mapping, BoxError> + Send + Sync + 'static,
    {
        Self {
            to_structured: Arc::new(to_structured),
            to_mapping: Arc::new(to_mapping),
        }
    }

    /// Convert with serde into a fixed-shape type.
    ///
    /// Every non-`Option` field of `T` must be present in the mapping. An
    /// empty mapping (an absent optional element) converts to `Null`.
    pub fn named_tuple<T>() -> Self
    where
        T: StructuredValue + Serialize + DeserializeOwned,
    {
        Self::new(
            |mapping: Mapping| {
                if mapping.is_empty() {
                    return Ok(Value::Null);
                }
                let object: T = serde_json::from_value(Value::Record(mapping).to_json()?)?;
                Ok(Value::object(object))
            },
            structured_to_mapping,
        )
    }

    /// Convert with serde into a type with defaults.
    ///
    /// Starts from `T::default()` and overwrites each field present in the
    /// mapping. An empty mapping converts to `Null`.
    pub fn user_object<T>() -> Self
    where
        T: StructuredValue + Serialize + DeserializeOwned + Default,
    {
        Self::new(
            |mapping: Mapping| {
                if mapping.is_empty() {
                    return Ok(Value::Null);
                }
                let serde_json::Value::Object(mut fields) = serde_json::to_value(T::default())?
                else {
                    return Err(format!(
                        "{} does not serialize to an object",
                        std::any::type_name::<T>()
                    )
                    .into());
                };
                for (name, value) in mapping {
                    fields.insert(name, value.to_json()?);
                }
                let object: T = serde_json::from_value(serde_json::Value::Object(fields))?;
                Ok(Value::object(object))
            },
            structured_to_mapping,
        )
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").finish_non_exhaustive()
    }
}

/// The mapping form of a structured value. Records pass through unchanged.
fn structured_to_mapping(value: &Value) -> std::result::Result<Mapping, BoxError> {
    match value {
        Value::Record(mapping) => Ok(mapping.clone()),
        Value::Object(object) => match Value::from_json(object.to_json()?) {
            Value::Record(mapping) => Ok(mapping),
            other => Err(format!(
                "{} serializes to {}, not a record",
                object.type_name(),
                other.type_name()
            )
            .into()),
        },
        other => Err(format!("expected a structured value, found {}", other.type_name()).into()),
    }
}

/// A record whose values are converted to and from structured values.
#[derive(Debug)]
pub struct AggregateProcessor {
    record: RecordProcessor,
    converter: Converter,
}

impl AggregateProcessor {
    pub fn new(record: RecordProcessor, converter: Converter) -> Self {
        Self { record, converter }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.record = self.record.required(required);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.record = self.record.with_alias(alias);
        self
    }

    fn to_structured(&self, parsed: Value, state: &ProcessorState) -> Result<Value> {
        let Value::Record(mapping) = parsed else {
            return Ok(parsed);
        };
        (self.converter.to_structured)(mapping).map_err(|err| {
            state.error(
                ErrorKind::Conversion,
                format!("Cannot convert \"{}\": {}", self.alias(), err),
            )
        })
    }

    fn to_mapping(&self, value: &Value, state: &ProcessorState) -> Result<Value> {
        if !value.is_truthy() {
            return Ok(Value::Record(Mapping::new()));
        }
        (self.converter.to_mapping)(value)
            .map(Value::Record)
            .map_err(|err| {
                state.error(
                    ErrorKind::Conversion,
                    format!("Cannot convert \"{}\": {}", self.alias(), err),
                )
            })
    }
}

impl Processor for AggregateProcessor {
    fn alias(&self) -> &str {
        self.record.alias()
    }

    fn element_path(&self) -> &ElementPath {
        self.record.element_path()
    }

    fn is_required(&self) -> bool {
        self.record.is_required()
    }

    fn parse_at_element(&self, element: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        let parsed = self.record.parse_at_element(element, state)?;
        self.to_structured(parsed, state)
    }

    fn parse_from_parent(&self, parent: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        let parsed = self.record.parse_from_parent(parent, state)?;
        self.to_structured(parsed, state)
    }

    fn serialize(&self, value: &Value, state: &mut ProcessorState) -> Result<XmlElement> {
        let mapping = self.to_mapping(value, state)?;
        self.record.serialize(&mapping, state)
    }

    fn serialize_on_parent(
        &self,
        parent: &mut XmlElement,
        value: &Value,
        state: &mut ProcessorState,
    ) -> Result<()> {
        let mapping = self.to_mapping(value, state)?;
        self.record.serialize_on_parent(parent, &mapping, state)
    }

    fn as_root(&self) -> Option<&dyn RootProcessor> {
        Some(self)
    }
}

impl RootProcessor for AggregateProcessor {
    fn parse_at_root(&self, root: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        let parsed = self.record.parse_at_root(root, state)?;
        self.to_structured(parsed, state)
    }
}

/// An aggregate with caller-supplied conversion functions.
pub fn aggregate(
    element_path: impl Into<String>,
    children: Vec<Box<dyn Processor>>,
    converter: Converter,
) -> AggregateProcessor {
    AggregateProcessor::new(RecordProcessor::new(element_path, children), converter)
}

/// An aggregate over a fixed-shape serde type. See [`Converter::named_tuple`].
pub fn named_tuple<T>(
    element_path: impl Into<String>,
    children: Vec<Box<dyn Processor>>,
) -> AggregateProcessor
where
    T: StructuredValue + Serialize + DeserializeOwned,
{
    aggregate(element_path, children, Converter::named_tuple::<T>())
}

/// An aggregate over a serde type with defaults. See [`Converter::user_object`].
pub fn user_object<T>(
    element_path: impl Into<String>,
    children: Vec<Box<dyn Processor>>,
) -> AggregateProcessor
where
    T: StructuredValue + Serialize + DeserializeOwned + Default,
{
    aggregate(element_path, children, Converter::user_object::<T>())
}
