//! The generic value model shared by every processor.
//!
//! Parsing produces [`Value`]s and serializing consumes them. Records are
//! insertion-ordered mappings from alias to value; aggregates additionally
//! carry user-defined structured values as [`Value::Object`].

use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::Error as _;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An insertion-ordered mapping from alias to value.
pub type Mapping = IndexMap<String, Value>;

/// A value parsed from, or serialized to, XML.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value. The only value treated as missing.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Record(Mapping),
    /// A user-defined structured value produced by an aggregate processor.
    Object(Structured),
}

impl Value {
    /// Build a record from `(alias, value)` pairs.
    ///
    /// ```rust
    /// use declxml::Value;
    ///
    /// let user = Value::record([("name", Value::from("Bob")), ("age", Value::from(27))]);
    /// assert_eq!(user.get("age"), Some(&Value::Int(27)));
    /// ```
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap a structured value.
    pub fn object<T: StructuredValue>(value: T) -> Self {
        Value::Object(Structured::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness of the value.
    ///
    /// `Null`, `false`, zero, the empty string and empty collections are
    /// falsy. Structured objects are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Record(mapping) => !mapping.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// A short name for the kind of value, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Object(_) => "object",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The value as a float. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Mapping> {
        match self {
            Value::Record(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Structured> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Look up a field of a record.
    pub fn get(&self, alias: &str) -> Option<&Value> {
        self.as_record().and_then(|mapping| mapping.get(alias))
    }

    /// Convert to a JSON value.
    ///
    /// Structured objects are converted through their `Serialize` impl.
    /// Non-finite floats become JSON `null`.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Convert from a JSON value.
    ///
    /// Numbers that fit an `i64` become [`Value::Int`]; every other number
    /// becomes [`Value::Float`]. Objects become records in their key order.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Record(mapping) => mapping.serialize(serializer),
            Value::Object(object) => object
                .to_json()
                .map_err(S::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Int(i64::from(i))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Mapping> for Value {
    fn from(mapping: Mapping) -> Self {
        Value::Record(mapping)
    }
}

impl From<Structured> for Value {
    fn from(object: Structured) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A user-defined type that can travel through the value model.
///
/// Implemented for every `Serialize + Debug + PartialEq` type that is
/// `Send + Sync + 'static`.
pub trait StructuredValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_dyn(&self, other: &dyn StructuredValue) -> bool;
    fn to_json(&self) -> serde_json::Result<serde_json::Value>;
    fn type_name(&self) -> &'static str;
}

impl<T> StructuredValue for T
where
    T: Serialize + fmt::Debug + PartialEq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_dyn(&self, other: &dyn StructuredValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A shared, type-erased structured value.
#[derive(Clone)]
pub struct Structured(Arc<dyn StructuredValue>);

impl Structured {
    pub fn new<T: StructuredValue>(value: T) -> Self {
        Structured(Arc::new(value))
    }

    /// Borrow the value as its concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        self.0.to_json()
    }

    /// The Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl PartialEq for Structured {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(other.0.as_ref())
    }
}

impl fmt::Debug for Structured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}
