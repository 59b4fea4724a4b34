//! XML parser that builds owned `XmlElement` trees.

use crate::{Error, Result, XmlAttribute, XmlElement};
use quick_xml::Reader;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};

/// Parse XML from a string, producing the document's root element.
///
/// # Example
///
/// ```rust
/// use declxml_tree::parse;
///
/// let root = parse("<root><child/></root>").unwrap();
/// assert_eq!(root.name, "root");
/// ```
///
/// # Errors
///
/// Returns an error if the XML is malformed or if parsing fails.
pub fn parse(content: &str) -> Result<XmlElement> {
    let mut parser = XmlParser::new(content);
    parser.parse()
}

/// Parse XML from raw bytes.
///
/// The bytes must be UTF-8; a leading byte order mark is skipped.
pub fn parse_bytes(content: &[u8]) -> Result<XmlElement> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    parse(std::str::from_utf8(content)?)
}

/// Internal parser state.
struct XmlParser<'a> {
    /// The quick-xml reader.
    reader: Reader<&'a [u8]>,

    /// Stack of elements being built.
    stack: Vec<BuildNode>,
}

/// A node being constructed during parsing.
struct BuildNode {
    element: XmlElement,

    /// Raw qualified name, for end tag matching.
    qualified_name: String,
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            stack: Vec::new(),
        }
    }

    fn parse(&mut self) -> Result<XmlElement> {
        let mut root: Option<XmlElement> = None;

        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    self.handle_start(e)?;
                }
                Ok(Event::End(e)) => {
                    let element = self.handle_end(e)?;
                    self.attach(element, &mut root)?;
                }
                Ok(Event::Empty(e)) => {
                    let element = self.handle_empty(e)?;
                    self.attach(element, &mut root)?;
                }
                Ok(Event::Text(e)) => {
                    self.handle_text(e)?;
                }
                Ok(Event::CData(e)) => {
                    self.handle_cdata(e);
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_)) => {
                    // Skip comments, processing instructions, and XML declarations
                }
                Ok(Event::DocType(_)) => {
                    // Skip DOCTYPE declarations
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position()),
                    });
                }
            }
        }

        // Check for unclosed elements
        if let Some(node) = self.stack.last() {
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", node.qualified_name),
            });
        }

        root.ok_or(Error::EmptyDocument)
    }

    /// Add a completed element to its parent, or make it the document root.
    fn attach(&mut self, element: XmlElement, root: &mut Option<XmlElement>) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                let parent = &mut parent.element;
                // Whitespace between child elements is formatting, not content.
                if parent.children.is_empty()
                    && parent.text.as_deref().is_some_and(|t| t.trim().is_empty())
                {
                    parent.text = None;
                }
                parent.children.push(element);
                Ok(())
            }
            None if root.is_some() => Err(Error::MultipleRoots),
            None => {
                *root = Some(element);
                Ok(())
            }
        }
    }

    fn handle_start(&mut self, e: BytesStart<'_>) -> Result<()> {
        let element = self.build_element(&e)?;
        let qualified_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

        self.stack.push(BuildNode {
            element,
            qualified_name,
        });

        Ok(())
    }

    fn handle_end(&mut self, e: BytesEnd<'_>) -> Result<XmlElement> {
        let end_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

        let node = self.stack.pop().ok_or_else(|| Error::InvalidStructure {
            message: format!("Unexpected closing tag </{}>", end_name),
        })?;

        // Verify tag names match
        if node.qualified_name != end_name {
            return Err(Error::MismatchedEndTag {
                expected: node.qualified_name,
                found: end_name,
            });
        }

        Ok(node.element)
    }

    fn handle_empty(&mut self, e: BytesStart<'_>) -> Result<XmlElement> {
        self.build_element(&e)
    }

    fn handle_text(&mut self, e: BytesText<'_>) -> Result<()> {
        let position = self.reader.buffer_position();
        let text = e.unescape().map_err(|err| Error::XmlSyntax {
            message: format!("Invalid text content: {}", err),
            position: Some(position),
        })?;

        if let Some(node) = self.stack.last_mut() {
            push_text(&mut node.element, &text);
        }
        Ok(())
    }

    fn handle_cdata(&mut self, e: BytesCData<'_>) {
        let text = String::from_utf8_lossy(e.as_ref()).to_string();

        if let Some(node) = self.stack.last_mut() {
            push_text(&mut node.element, &text);
        }
    }

    fn build_element(&self, e: &BytesStart<'_>) -> Result<XmlElement> {
        let (name, prefix) = split_name(&String::from_utf8_lossy(e.name().as_ref()));
        let attributes = self.parse_attributes(e)?;

        Ok(XmlElement {
            name,
            prefix,
            attributes,
            text: None,
            children: Vec::new(),
        })
    }

    fn parse_attributes(&self, e: &BytesStart<'_>) -> Result<Vec<XmlAttribute>> {
        let mut attributes = Vec::new();

        for attr_result in e.attributes() {
            let attr = attr_result?;

            let (name, prefix) = split_name(&String::from_utf8_lossy(attr.key.as_ref()));

            let value = attr.unescape_value().map_err(|err| Error::XmlSyntax {
                message: format!("Invalid attribute value: {}", err),
                position: Some(self.reader.buffer_position()),
            })?;

            attributes.push(XmlAttribute {
                name,
                prefix,
                value: value.into_owned(),
            });
        }

        Ok(attributes)
    }
}

/// Append a text run to an element.
///
/// Only text ahead of the first child element is kept; text following a
/// child would make the element mixed content.
fn push_text(element: &mut XmlElement, text: &str) {
    if element.has_elements() {
        return;
    }
    match &mut element.text {
        Some(existing) => existing.push_str(text),
        None => element.text = Some(text.to_string()),
    }
}

/// Split a qualified name into its local name and optional prefix.
fn split_name(full_name: &str) -> (String, Option<String>) {
    match full_name.split_once(':') {
        Some((prefix, local_name)) => (local_name.to_string(), Some(prefix.to_string())),
        None => (full_name.to_string(), None),
    }
}
