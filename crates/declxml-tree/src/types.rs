//! Core types for owned XML element trees.

/// An XML element.
///
/// Tracks the element name, attributes, an optional text run and the
/// child elements in document order. Mixed content is not modelled: text
/// that follows a child element is not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// The local name of the element (without namespace prefix).
    pub name: String,

    /// Namespace prefix, if any (e.g., "csl" in `<csl:text>`).
    pub prefix: Option<String>,

    /// Attributes of this element, in document order.
    pub attributes: Vec<XmlAttribute>,

    /// Text content appearing before the first child element.
    pub text: Option<String>,

    /// Child elements.
    pub children: Vec<XmlElement>,
}

/// An XML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// The local name of the attribute (without namespace prefix).
    pub name: String,

    /// Namespace prefix, if any.
    pub prefix: Option<String>,

    /// The attribute value (after unescaping XML entities).
    pub value: String,
}

impl XmlElement {
    /// Create a new empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style variant of [`XmlElement::set_attribute`].
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style variant of [`XmlElement::set_text`].
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Builder-style variant of [`XmlElement::push_child`].
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push_child(child);
        self
    }

    /// The qualified name as it appears in markup (`prefix:name`).
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing attribute with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(XmlAttribute::new(name, value)),
        }
    }

    /// Replace the text content of this element.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Check if this element has child elements.
    pub fn has_elements(&self) -> bool {
        !self.children.is_empty()
    }

    /// Check if this element has text content.
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// Check if this element has neither text nor child elements.
    ///
    /// An empty text run counts as no text.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(str::is_empty) && self.children.is_empty()
    }

    /// Get text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get child elements by name.
    ///
    /// The matches borrow from `self` only, not from `name`.
    pub fn get_children<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |e| e.name == name)
    }

    /// Get the first child element with the given name.
    pub fn get_child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|e| e.name == name)
    }

    /// Remove namespace information from this element and all descendants.
    ///
    /// Prefixes are cleared from element and attribute names and `xmlns`
    /// declarations are dropped, so that later lookups match on local
    /// names only.
    pub fn strip_namespaces(&mut self) {
        self.prefix = None;
        self.attributes
            .retain(|a| a.name != "xmlns" && a.prefix.as_deref() != Some("xmlns"));
        for attribute in &mut self.attributes {
            attribute.prefix = None;
        }
        for child in &mut self.children {
            child.strip_namespaces();
        }
    }
}

impl XmlAttribute {
    /// Create a new attribute without a namespace prefix.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_get_attribute() {
        let element = XmlElement::new("test").with_attribute("name", "value");

        assert_eq!(element.get_attribute("name"), Some("value"));
        assert_eq!(element.get_attribute("missing"), None);
    }

    #[test]
    fn test_set_attribute_replaces_existing() {
        let mut element = XmlElement::new("test").with_attribute("name", "old");
        element.set_attribute("name", "new");
        element.set_attribute("other", "x");

        assert_eq!(element.attributes.len(), 2);
        assert_eq!(element.get_attribute("name"), Some("new"));
    }

    #[test]
    fn test_element_children() {
        let parent = XmlElement::new("parent")
            .with_child(XmlElement::new("child"))
            .with_child(XmlElement::new("other"))
            .with_child(XmlElement::new("child"));

        assert!(parent.has_elements());
        assert!(!parent.has_text());
        assert_eq!(parent.get_children("child").count(), 2);
        assert_eq!(parent.get_child("other").map(|e| e.name.as_str()), Some("other"));
        assert!(parent.get_child("missing").is_none());
    }

    #[test]
    fn test_children_outlive_name() {
        let parent = XmlElement::new("parent").with_child(XmlElement::new("child"));
        let found: Vec<&XmlElement> = {
            let name = String::from("child");
            parent.get_children(&name).collect()
        };
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_element_text() {
        let element = XmlElement::new("text").with_text("Hello, world!");

        assert!(element.has_text());
        assert!(!element.has_elements());
        assert_eq!(element.text(), Some("Hello, world!"));
    }

    #[test]
    fn test_strip_namespaces() {
        let mut child = XmlElement::new("text");
        child.prefix = Some("csl".to_string());

        let mut lang = XmlAttribute::new("lang", "en");
        lang.prefix = Some("xml".to_string());
        let mut declaration = XmlAttribute::new("csl", "http://example.org");
        declaration.prefix = Some("xmlns".to_string());

        let mut root = XmlElement::new("style")
            .with_attribute("xmlns", "http://purl.org/net/xbiblio/csl")
            .with_child(child);
        root.prefix = Some("csl".to_string());
        root.attributes.push(lang);
        root.attributes.push(declaration);

        root.strip_namespaces();

        assert_eq!(root.qualified_name(), "style");
        assert_eq!(root.children[0].qualified_name(), "text");
        assert_eq!(root.attributes.len(), 1);
        assert_eq!(root.attributes[0].name, "lang");
        assert_eq!(root.attributes[0].prefix, None);
    }
}
