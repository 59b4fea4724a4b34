//! Leaf processors for booleans, integers, floats and strings.

use super::{Processor, build_element};
use crate::error::{ErrorKind, Result};
use crate::path::ElementPath;
use crate::state::ProcessorState;
use crate::value::Value;
use declxml_tree::XmlElement;

/// The primitive type a [`PrimitiveProcessor`] reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Float,
    String { strip_whitespace: bool },
}

impl PrimitiveKind {
    fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::String { .. } => "string",
        }
    }

    /// The value used for absent optional values unless overridden.
    pub fn default_value(self) -> Value {
        match self {
            PrimitiveKind::Boolean => Value::Bool(false),
            PrimitiveKind::Integer => Value::Int(0),
            PrimitiveKind::Float => Value::Float(0.0),
            PrimitiveKind::String { .. } => Value::String(String::new()),
        }
    }

    /// Convert raw text to a value. `None` is an element without text.
    ///
    /// On failure, returns the message for an invalid-primitive error.
    pub fn parse_text(self, text: Option<&str>) -> std::result::Result<Value, String> {
        let raw = text.unwrap_or("");
        match self {
            PrimitiveKind::Boolean => match raw.to_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(format!("Invalid boolean value: \"{raw}\"")),
            },
            PrimitiveKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("Invalid integer value: \"{raw}\"")),
            PrimitiveKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("Invalid float value: \"{raw}\"")),
            PrimitiveKind::String { strip_whitespace } => {
                let text = if strip_whitespace { raw.trim() } else { raw };
                Ok(Value::String(text.to_string()))
            }
        }
    }
}

/// Format a scalar as XML text. Returns `None` for collections and objects.
fn format_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(format!("{f:?}")),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Record(_) | Value::Object(_) => None,
    }
}

/// A primitive value stored as element text or as an attribute.
///
/// Missing-ness is `Null` only: a present `0`, `""` or `false` is never
/// replaced by the default. Emptiness for `omit_empty` is falsiness.
#[derive(Debug, Clone)]
pub struct PrimitiveProcessor {
    name: String,
    path: ElementPath,
    kind: PrimitiveKind,
    attribute: Option<String>,
    required: bool,
    alias: Option<String>,
    default: Value,
    omit_empty: bool,
}

impl PrimitiveProcessor {
    pub fn new(element_path: impl Into<String>, kind: PrimitiveKind) -> Self {
        let name = element_path.into();
        Self {
            path: ElementPath::parse(&name),
            name,
            kind,
            attribute: None,
            required: true,
            alias: None,
            default: kind.default_value(),
            omit_empty: false,
        }
    }

    /// Read and write the value as this attribute of the element.
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some(name.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Key for the value in the enclosing record. Defaults to the attribute
    /// name, else the element path.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Value used when an optional element or attribute is absent, and when
    /// serializing `Null`. [`Value::Null`] serializes as empty text.
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Skip falsy values when serializing. Only honoured when not required.
    pub fn omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = omit_empty;
        self
    }

    /// Whether parsed strings are trimmed. Defaults to `true`.
    pub fn strip_whitespace(mut self, strip_whitespace: bool) -> Self {
        match &mut self.kind {
            PrimitiveKind::String { strip_whitespace: strip } => *strip = strip_whitespace,
            other => tracing::warn!(
                element = %self.name,
                kind = other.name(),
                "strip_whitespace only applies to string values"
            ),
        }
        self
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    fn effective_omit_empty(&self) -> bool {
        self.omit_empty && !self.required
    }

    fn parse_raw(&self, text: Option<&str>, state: &ProcessorState) -> Result<Value> {
        self.kind
            .parse_text(text)
            .map_err(|message| state.error(ErrorKind::InvalidPrimitiveValue, message))
    }

    fn parse_attribute(
        &self,
        element: &XmlElement,
        attribute: &str,
        state: &ProcessorState,
    ) -> Result<Value> {
        match element.get_attribute(attribute).filter(|v| !v.is_empty()) {
            Some(raw) => self.parse_raw(Some(raw), state),
            None if self.required => Err(state.error(
                ErrorKind::MissingValue,
                format!(
                    "Missing required attribute \"{}\" on element \"{}\"",
                    attribute, element.name
                ),
            )),
            None => Ok(self.default.clone()),
        }
    }

    fn format(&self, value: &Value, state: &ProcessorState) -> Result<String> {
        let value = if value.is_null() { &self.default } else { value };
        format_scalar(value).ok_or_else(|| {
            state.error(
                ErrorKind::Conversion,
                format!(
                    "Cannot serialize {} value as {} \"{}\"",
                    value.type_name(),
                    self.kind.name(),
                    self.alias()
                ),
            )
        })
    }

    fn write(&self, element: &mut XmlElement, text: String) {
        match &self.attribute {
            Some(attribute) => element.set_attribute(attribute.as_str(), text),
            None => element.set_text(text),
        }
    }

    fn missing_value_message(&self, parent: &XmlElement) -> String {
        match (&self.attribute, self.path.is_current()) {
            (Some(attribute), true) => format!(
                "Missing required value for attribute \"{}\" on element \"{}\"",
                attribute, parent.name
            ),
            (Some(attribute), false) => format!(
                "Missing required value for attribute \"{}\" on element \"{}\"",
                attribute, self.path
            ),
            (None, _) => format!("Missing required value for element \"{}\"", self.path),
        }
    }
}

fn warn_omit_empty_ignored(element: &str) {
    tracing::warn!(
        element,
        "omit_empty ignored on primitive values when required is specified"
    );
}

impl Processor for PrimitiveProcessor {
    fn alias(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.attribute.as_deref())
            .unwrap_or(&self.name)
    }

    fn element_path(&self) -> &ElementPath {
        &self.path
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn parse_at_element(&self, element: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        match &self.attribute {
            Some(attribute) => self.parse_attribute(element, attribute, state),
            None => self.parse_raw(element.text(), state),
        }
    }

    fn parse_from_parent(&self, parent: &XmlElement, state: &mut ProcessorState) -> Result<Value> {
        match self.path.find(parent) {
            Some(element) => self.parse_at_element(element, state),
            None if self.required => Err(state.error(
                ErrorKind::MissingValue,
                format!("Missing required element: \"{}\"", self.path),
            )),
            None => Ok(self.default.clone()),
        }
    }

    fn serialize(&self, value: &Value, state: &mut ProcessorState) -> Result<XmlElement> {
        let text = self.format(value, state)?;
        build_element(&self.path, self.alias(), state, |element, _| {
            self.write(element, text);
            Ok(())
        })
    }

    fn serialize_on_parent(
        &self,
        parent: &mut XmlElement,
        value: &Value,
        state: &mut ProcessorState,
    ) -> Result<()> {
        if value.is_null() && self.required {
            return Err(state.error(ErrorKind::MissingValue, self.missing_value_message(parent)));
        }

        if !value.is_truthy() {
            if self.effective_omit_empty() {
                return Ok(());
            }
            if self.omit_empty {
                warn_omit_empty_ignored(&self.name);
            }
        }

        let text = self.format(value, state)?;
        let element = self.path.find_or_create(parent);
        self.write(element, text);
        Ok(())
    }
}

/// A boolean value. Parses `true`/`false` in any letter case.
pub fn boolean(element_path: impl Into<String>) -> PrimitiveProcessor {
    PrimitiveProcessor::new(element_path, PrimitiveKind::Boolean)
}

/// A 64-bit signed integer value.
pub fn integer(element_path: impl Into<String>) -> PrimitiveProcessor {
    PrimitiveProcessor::new(element_path, PrimitiveKind::Integer)
}

/// A 64-bit floating point value.
pub fn floating_point(element_path: impl Into<String>) -> PrimitiveProcessor {
    PrimitiveProcessor::new(element_path, PrimitiveKind::Float)
}

/// A string value, trimmed of surrounding whitespace unless disabled.
pub fn string(element_path: impl Into<String>) -> PrimitiveProcessor {
    PrimitiveProcessor::new(
        element_path,
        PrimitiveKind::String {
            strip_whitespace: true,
        },
    )
}
