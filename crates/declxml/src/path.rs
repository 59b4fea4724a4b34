//! Element paths and their resolution against element trees.
//!
//! Processors are configured with slash-delimited paths such as `name`,
//! `location/coordinates/lat`, or the self-marker `.`. Paths are parsed
//! once at construction into an [`ElementPath`]; the functions here locate
//! existing elements for parsing and find or create elements for
//! serializing.

use declxml_tree::XmlElement;
use std::fmt;

/// The self-marker: the element currently being processed.
pub const SELF_PATH: &str = ".";

/// A parsed element path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementPath {
    /// `.`, the element the processor was handed.
    Current,
    /// A single child element name.
    Single(String),
    /// A chain of element names descending through wrapper elements.
    Segments(Vec<String>),
}

impl ElementPath {
    /// Parse a path string.
    ///
    /// `.` is never split. Empty segments (from leading, trailing or doubled
    /// slashes) are ignored; a path with no segments left is treated as `.`.
    pub fn parse(path: &str) -> Self {
        if path == SELF_PATH {
            return ElementPath::Current;
        }

        let mut segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        match segments.len() {
            0 => ElementPath::Current,
            1 => ElementPath::Single(segments.remove(0)),
            _ => ElementPath::Segments(segments),
        }
    }

    /// Whether this is the self-marker.
    pub fn is_current(&self) -> bool {
        matches!(self, ElementPath::Current)
    }

    /// The element names along this path, outermost first.
    pub fn segments(&self) -> &[String] {
        match self {
            ElementPath::Current => &[],
            ElementPath::Single(name) => std::slice::from_ref(name),
            ElementPath::Segments(segments) => segments,
        }
    }

    /// The name of the innermost element, or `None` for the self-marker.
    pub fn leaf_name(&self) -> Option<&str> {
        self.segments().last().map(String::as_str)
    }

    /// Locate the first element matching this path under `parent`.
    ///
    /// The self-marker resolves to `parent` itself.
    pub fn find<'a>(&self, parent: &'a XmlElement) -> Option<&'a XmlElement> {
        match self {
            ElementPath::Current => Some(parent),
            ElementPath::Single(name) => parent.get_child(name),
            ElementPath::Segments(_) => self.find_all(parent).into_iter().next(),
        }
    }

    /// Locate every element matching this path under `parent`, in document order.
    pub fn find_all<'a>(&self, parent: &'a XmlElement) -> Vec<&'a XmlElement> {
        find_all_segments(self.segments(), parent)
    }

    /// Locate this path starting at a document root.
    ///
    /// The first segment must name the root element itself; the remaining
    /// segments are resolved beneath it the same way [`find`](Self::find)
    /// resolves them. Returns `None` if no element matches.
    pub fn find_from_root<'a>(&self, root: &'a XmlElement) -> Option<&'a XmlElement> {
        match self.segments().split_first() {
            None => Some(root),
            Some((first, rest)) if *first == root.name => {
                find_all_segments(rest, root).into_iter().next()
            }
            Some(_) => None,
        }
    }

    /// Find or create the element chain for this path under `parent`.
    ///
    /// Existing elements are reused segment by segment; from the first
    /// missing segment on, fresh elements are appended. Values sharing a
    /// path prefix therefore share the created elements. The self-marker
    /// resolves to `parent` itself.
    pub fn find_or_create<'a>(&self, parent: &'a mut XmlElement) -> &'a mut XmlElement {
        let mut current = parent;
        for name in self.segments() {
            let index = match current.children.iter().position(|c| c.name == *name) {
                Some(index) => index,
                None => {
                    current.children.push(XmlElement::new(name.as_str()));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[index];
        }
        current
    }

    /// Build a new, unattached element chain for this path around `leaf`.
    ///
    /// `leaf` must already carry the innermost name; the outer segments are
    /// wrapped around it and the outermost element is returned.
    pub fn wrap(&self, leaf: XmlElement) -> XmlElement {
        let outer = self.segments().split_last().map_or(&[][..], |(_, outer)| outer);
        outer
            .iter()
            .rev()
            .fold(leaf, |child, name| XmlElement::new(name.as_str()).with_child(child))
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementPath::Current => f.write_str(SELF_PATH),
            ElementPath::Single(name) => f.write_str(name),
            ElementPath::Segments(segments) => f.write_str(&segments.join("/")),
        }
    }
}

impl From<&str> for ElementPath {
    fn from(path: &str) -> Self {
        ElementPath::parse(path)
    }
}

impl From<String> for ElementPath {
    fn from(path: String) -> Self {
        ElementPath::parse(&path)
    }
}

/// Match each segment against the children of every element the previous
/// segment matched, so `a/b` yields the `b` children of all `a` children.
fn find_all_segments<'a>(segments: &[String], parent: &'a XmlElement) -> Vec<&'a XmlElement> {
    let mut matches = vec![parent];
    for name in segments {
        matches = matches
            .into_iter()
            .flat_map(|element| element.get_children(name))
            .collect();
        if matches.is_empty() {
            break;
        }
    }
    matches
}
