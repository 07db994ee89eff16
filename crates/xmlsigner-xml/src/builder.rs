#![forbid(unsafe_code)]

//! Owned element values for building new XML subtrees.
//!
//! Builders return plain values; composing them is just moving children
//! into parents, so no builder step shares document state with another.

use crate::writer::XmlWriter;
use xmlsigner_core::Error;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An owned XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any existing value for the same name.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Serialize this element and its subtree into `writer`.
    pub fn write(&self, writer: &mut XmlWriter) -> Result<(), Error> {
        let attrs: Vec<(&str, &str)> = self.attributes().collect();
        if self.children.is_empty() {
            return writer.empty_element(&self.name, &attrs);
        }
        writer.start_element(&self.name, &attrs)?;
        for child in &self.children {
            match child {
                Node::Element(e) => e.write(writer)?,
                Node::Text(t) => writer.write_text(t)?,
            }
        }
        writer.end_element(&self.name)
    }

    /// Serialize this element to a standalone XML string.
    pub fn to_xml(&self) -> Result<String, Error> {
        let mut writer = XmlWriter::new();
        self.write(&mut writer)?;
        writer.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_serialize() {
        let e = Element::new("Reference")
            .with_attr("URI", "")
            .with_child(Element::new("DigestValue").with_text("abc="));
        assert_eq!(
            e.to_xml().unwrap(),
            r#"<Reference URI=""><DigestValue>abc=</DigestValue></Reference>"#
        );
    }

    #[test]
    fn test_with_attr_replaces() {
        let e = Element::new("a").with_attr("x", "1").with_attr("x", "2");
        assert_eq!(e.attr("x"), Some("2"));
        assert_eq!(e.attributes().count(), 1);
    }

    #[test]
    fn test_child_lookup() {
        let e = Element::new("p")
            .with_text("t1")
            .with_child(Element::new("a"))
            .with_child(Element::new("b"))
            .with_text("t2");
        let names: Vec<_> = e.child_elements().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(e.child("b").is_some());
        assert!(e.child("c").is_none());
        assert_eq!(e.text(), "t1t2");
    }
}
