//! Rendering `XmlElement` trees back to XML text.

use crate::{Result, XmlElement};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Render an element tree as compact XML, without an XML declaration.
///
/// ```rust
/// use declxml_tree::{XmlElement, to_string};
///
/// let root = XmlElement::new("root").with_child(XmlElement::new("name").with_text("Bob"));
/// assert_eq!(to_string(&root).unwrap(), "<root><name>Bob</name></root>");
/// ```
pub fn to_string(root: &XmlElement) -> Result<String> {
    let mut serializer = XmlWriter::new(None);
    serializer.write_element(root, 0)?;
    serializer.finish()
}

/// Render an element tree as indented XML.
///
/// The output starts with an XML declaration, places every element on its
/// own line indented by `indent` once per nesting level, and ends with a
/// newline. Elements holding only text stay on a single line.
pub fn to_string_pretty(root: &XmlElement, indent: &str) -> Result<String> {
    let mut serializer = XmlWriter::new(Some(indent));
    serializer.write_declaration()?;
    serializer.write_element(root, 0)?;
    serializer.write_raw("\n")?;
    serializer.finish()
}

/// XML writer that walks an element tree and emits quick-xml events.
struct XmlWriter<'i> {
    writer: Writer<Vec<u8>>,
    indent: Option<&'i str>,
}

impl<'i> XmlWriter<'i> {
    fn new(indent: Option<&'i str>) -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            indent,
        }
    }

    fn finish(self) -> Result<String> {
        let bytes = self.writer.into_inner();
        // Everything written came from `&str` values, so this cannot fail.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write_declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_raw("\n")
    }

    /// Write already-escaped text such as line breaks and indentation.
    fn write_raw(&mut self, raw: &str) -> Result<()> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(raw)))?;
        Ok(())
    }

    fn write_newline_and_indent(&mut self, depth: usize) -> Result<()> {
        if let Some(indent) = self.indent {
            let raw = format!("\n{}", indent.repeat(depth));
            self.write_raw(&raw)?;
        }
        Ok(())
    }

    fn write_element(&mut self, element: &XmlElement, depth: usize) -> Result<()> {
        let name = element.qualified_name();
        let mut start = BytesStart::new(name.as_str());
        for attribute in &element.attributes {
            let attribute_name = match &attribute.prefix {
                Some(prefix) => format!("{}:{}", prefix, attribute.name),
                None => attribute.name.clone(),
            };
            start.push_attribute((attribute_name.as_str(), attribute.value.as_str()));
        }

        if element.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        self.writer.write_event(Event::Start(start))?;

        if let Some(text) = &element.text {
            self.writer.write_event(Event::Text(BytesText::new(text)))?;
        }

        if element.has_elements() {
            for child in &element.children {
                self.write_newline_and_indent(depth + 1)?;
                self.write_element(child, depth + 1)?;
            }
            self.write_newline_and_indent(depth)?;
        }

        self.writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))?;

        Ok(())
    }
}
