//! Owned XML element trees for declxml.
//!
//! This crate wraps [`quick-xml`] to read a document into a tree of
//! [`XmlElement`]s and to render such a tree back to text. It is the XML
//! collaborator of the `declxml` processor engine: the engine walks and
//! builds these trees, and never touches markup directly.
//!
//! # Overview
//!
//! The main types are:
//! - [`XmlElement`]: An XML element with name, attributes, text and child elements
//! - [`XmlAttribute`]: An attribute with name and value
//!
//! Mixed content is not modelled. An element keeps the text that appears
//! before its first child element; whitespace-only text next to child
//! elements is treated as formatting and dropped.
//!
//! # Example
//!
//! ```rust
//! use declxml_tree::{parse, to_string};
//!
//! let root = parse(r#"<files>
//!   <file name="a.txt" size="236"/>
//! </files>"#).unwrap();
//!
//! assert_eq!(root.name, "files");
//! let files: Vec<_> = root.get_children("file").collect();
//! assert_eq!(files[0].get_attribute("size"), Some("236"));
//!
//! assert_eq!(to_string(&root).unwrap(), r#"<files><file name="a.txt" size="236"/></files>"#);
//! ```
//!
//! # Namespaces
//!
//! Prefixes are split from local names while parsing and kept in the
//! `prefix` fields. [`XmlElement::strip_namespaces`] clears them, together
//! with any `xmlns` declarations.

pub mod error;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export main types
pub use error::{Error, Result};
pub use parser::{parse, parse_bytes};
pub use types::{XmlAttribute, XmlElement};
pub use writer::{to_string, to_string_pretty};
