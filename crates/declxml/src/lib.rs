//! Declarative, bidirectional XML data binding.
//!
//! Describe the shape of a document once, as a tree of processors, and use
//! that tree both to parse XML into [`Value`]s and to serialize values back
//! into XML.
//!
//! # Example
//!
//! ```rust
//! use declxml::{ProcessorExt, Value, array, dictionary, integer, string};
//!
//! let author = dictionary("author", vec![
//!     string("name").boxed(),
//!     integer("birth-year").boxed(),
//!     array(string("book")).with_alias("books").boxed(),
//! ]);
//!
//! let xml = r#"
//! <author>
//!     <name>Robert A. Heinlein</name>
//!     <birth-year>1907</birth-year>
//!     <book>Starship Troopers</book>
//!     <book>Stranger in a Strange Land</book>
//! </author>
//! "#;
//!
//! let value = declxml::parse_from_str(&author, xml).unwrap();
//! assert_eq!(value.get("birth-year"), Some(&Value::Int(1907)));
//! assert_eq!(
//!     value.get("books"),
//!     Some(&Value::from(vec!["Starship Troopers", "Stranger in a Strange Land"])),
//! );
//!
//! let round_trip = declxml::serialize_to_string(&author, &value, None).unwrap();
//! assert!(round_trip.starts_with("<author><name>Robert A. Heinlein</name>"));
//! ```
//!
//! # Processors
//!
//! - [`boolean`], [`integer`], [`floating_point`] and [`string`] read a
//!   primitive from element text or, with `.attribute(..)`, an attribute.
//! - [`dictionary`] groups named fields into a [`Value::Record`].
//! - [`array`] repeats an item processor, either embedded among its
//!   siblings or nested in a wrapper element.
//! - [`named_tuple`], [`user_object`] and [`aggregate`] convert records to
//!   and from user-defined serde types.
//! - [`ProcessorExt::hooks`] wraps any processor with [`Hooks`] that
//!   validate or transform values.
//!
//! Element paths may be a single name, a slash-separated chain such as
//! `location/coordinates/lat`, or `.` for the element currently being
//! processed.
//!
//! # Errors
//!
//! Errors raised during traversal end with the location of the failure,
//! for example `Missing required element: "year-published" at
//! genre-authors/authors/author[1]/book[0]/year-published`.

pub mod error;
pub mod path;
pub mod processor;
pub mod state;
pub mod value;

pub use error::{BoxError, Error, ErrorKind, Result};
pub use path::ElementPath;
pub use processor::{
    AggregateProcessor, ArrayProcessor, Converter, Hook, Hooked, Hooks, PrimitiveKind,
    PrimitiveProcessor, Processor, ProcessorExt, RecordProcessor, RootProcessor, aggregate, array,
    boolean, dictionary, floating_point, integer, named_tuple, string, user_object,
};
pub use state::{ProcessorLocation, ProcessorState, ProcessorStateView};
pub use value::{Mapping, Structured, StructuredValue, Value};

use declxml_tree::XmlElement;
use std::path::Path;

fn root_processor<'p>(
    processor: &'p dyn Processor,
    state: &ProcessorState,
) -> Result<&'p dyn RootProcessor> {
    processor.as_root().ok_or_else(|| {
        state.error(
            ErrorKind::InvalidRootProcessor,
            format!("Invalid root processor: \"{}\"", processor.alias()),
        )
    })
}

fn parse_element(processor: &dyn Processor, mut root: XmlElement) -> Result<Value> {
    let mut state = ProcessorState::new();
    let root_node = root_processor(processor, &state)?;

    root.strip_namespaces();
    tracing::debug!(
        processor = processor.alias(),
        root = %root.name,
        "Parsing document"
    );

    state.with_location(processor.element_path(), None, |state| {
        root_node.parse_at_root(&root, state)
    })
}

/// Parse an XML document held in a string.
///
/// # Errors
///
/// Fails with [`Error::InvalidRootProcessor`] if `processor` cannot be a
/// document root, [`Error::Xml`] if the text is not well-formed, and with
/// any error raised while traversing the document.
pub fn parse_from_str(processor: &dyn Processor, xml: &str) -> Result<Value> {
    parse_element(processor, declxml_tree::parse(xml)?)
}

/// Parse an XML document from UTF-8 bytes. A leading byte order mark is
/// ignored.
pub fn parse_from_bytes(processor: &dyn Processor, xml: &[u8]) -> Result<Value> {
    parse_element(processor, declxml_tree::parse_bytes(xml)?)
}

/// Parse the UTF-8 XML document at `path`.
pub fn parse_from_file(processor: &dyn Processor, path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Reading document");
    let bytes = std::fs::read(path)?;
    parse_from_bytes(processor, &bytes)
}

/// Serialize `value` to an XML string.
///
/// With `indent` unset, the output is compact and has no XML declaration.
/// With an indent string, the output starts with an XML declaration, places
/// each element on its own line indented once per level, and ends with a
/// newline.
pub fn serialize_to_string(
    processor: &dyn Processor,
    value: &Value,
    indent: Option<&str>,
) -> Result<String> {
    let mut state = ProcessorState::new();
    root_processor(processor, &state)?;

    tracing::debug!(processor = processor.alias(), "Serializing document");
    let root = state.with_location(processor.element_path(), None, |state| {
        processor.serialize(value, state)
    })?;

    let xml = match indent {
        Some(indent) => declxml_tree::to_string_pretty(&root, indent)?,
        None => declxml_tree::to_string(&root)?,
    };
    Ok(xml)
}

/// Serialize `value` and write it to `path` as UTF-8.
pub fn serialize_to_file(
    processor: &dyn Processor,
    value: &Value,
    path: impl AsRef<Path>,
    indent: Option<&str>,
) -> Result<()> {
    let xml = serialize_to_string(processor, value, indent)?;
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Writing document");
    std::fs::write(path, xml)?;
    Ok(())
}
