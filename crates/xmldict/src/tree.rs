//! In-memory XML element tree.
//!
//! The encoder builds one of these and the writer serializes it; the reader
//! builds one from text and the decoder walks it. An element owns its
//! children, so a tree is freed as a unit and never shared between calls.

use indexmap::IndexMap;
use std::borrow::Cow;

/// A node in an element's content.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data, stored unescaped.
    Text(String),
    /// Character data written as a CDATA section.
    CData(String),
}

/// An XML element with its attributes and content in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: IndexMap<String, String>,
    nodes: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an element with no attributes and no content.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            nodes: Vec::new(),
        }
    }

    /// The tag name, including any namespace prefix as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document (or insertion) order.
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets an attribute, replacing an existing value but keeping its position.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// All content nodes in document order.
    pub fn nodes(&self) -> &[XmlNode] {
        &self.nodes
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.nodes.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn has_children(&self) -> bool {
        self.children().next().is_some()
    }

    /// The element's direct text: the run of text and CDATA nodes before
    /// its first child element. Text that follows a child is its tail and
    /// is not included. `None` when that run is empty.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        let mut segments = self.nodes.iter().map_while(|node| match node {
            XmlNode::Text(text) | XmlNode::CData(text) => Some(text.as_str()),
            XmlNode::Element(_) => None,
        });
        let first = segments.next()?;
        match segments.next() {
            None => Some(Cow::Borrowed(first)),
            Some(second) => {
                let mut joined = String::from(first);
                joined.push_str(second);
                segments.for_each(|segment| joined.push_str(segment));
                Some(Cow::Owned(joined))
            }
        }
    }

    /// Replaces the direct text with a plain text node placed before any children.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.replace_text(XmlNode::Text(text.into()));
    }

    /// Replaces the direct text with a CDATA section placed before any children.
    pub fn set_cdata(&mut self, text: impl Into<String>) {
        self.replace_text(XmlNode::CData(text.into()));
    }

    fn replace_text(&mut self, node: XmlNode) {
        self.nodes.retain(|n| matches!(n, XmlNode::Element(_)));
        self.nodes.insert(0, node);
    }

    /// Appends a child element after all existing content.
    pub fn append_child(&mut self, child: XmlElement) {
        self.nodes.push(XmlNode::Element(child));
    }

    /// Removes and returns the `index`-th child element (counting elements only).
    pub fn remove_child(&mut self, index: usize) -> Option<XmlElement> {
        let position = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, XmlNode::Element(_)))
            .nth(index)
            .map(|(position, _)| position)?;
        match self.nodes.remove(position) {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Appends a raw content node. Used while parsing, where text, CDATA and
    /// elements arrive interleaved.
    pub(crate) fn push_node(&mut self, node: XmlNode) {
        self.nodes.push(node);
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.nodes
    }

    /// Drops whitespace-only text nodes when the element also has child
    /// elements. A leaf keeps its whitespace.
    pub(crate) fn strip_blank_text(&mut self) {
        if !self.has_children() {
            return;
        }
        self.nodes.retain(|node| match node {
            XmlNode::Text(text) => !text.chars().all(char::is_whitespace),
            _ => true,
        });
    }

    /// `true` when the element has no attributes and no content.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.nodes.is_empty()
    }
}
