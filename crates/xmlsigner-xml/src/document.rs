#![forbid(unsafe_code)]

//! Source document wrapper over roxmltree.
//!
//! The parsed tree is read-only. Appending to the root element is done by
//! splicing serialized markup into a copy of the input text right before
//! the root's end tag, so everything outside the new subtree is preserved
//! byte-for-byte.

use std::collections::BTreeMap;

use xmlsigner_core::{ns, Error};

/// A parsed input document borrowing the caller's text.
pub struct SourceDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> SourceDocument<'input> {
    /// Parse XML text.
    ///
    /// Fails with [`Error::EmptyDocument`] when the text holds no document
    /// element, and with [`Error::XmlParse`] when it is not well-formed.
    pub fn parse(text: &'input str) -> Result<Self, Error> {
        if text.trim().is_empty() {
            return Err(Error::EmptyDocument);
        }
        let doc = roxmltree::Document::parse_with_options(text, crate::parsing_options())
            .map_err(|e| match e {
                roxmltree::Error::NoRootNode => Error::EmptyDocument,
                other => Error::XmlParse(other.to_string()),
            })?;
        Ok(Self { doc })
    }

    /// The parsed tree.
    pub fn tree(&self) -> &roxmltree::Document<'input> {
        &self.doc
    }

    /// The original input text.
    pub fn text(&self) -> &'input str {
        self.doc.input_text()
    }

    /// The document element.
    pub fn root(&self) -> roxmltree::Node<'_, 'input> {
        self.doc.root_element()
    }

    /// The root element's qualified name exactly as written in the input.
    pub fn root_qname(&self) -> &'input str {
        let text = self.text();
        let start = self.root().range().start + 1;
        let rest = &text[start..];
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(rest.len());
        &rest[..len]
    }

    /// Namespace and `xml:*` context that a new child of the root inherits.
    pub fn root_context(&self) -> AncestorContext {
        AncestorContext::of_element(self.root())
    }

    /// Return a copy of the input with `fragment` appended as the last
    /// child of the root element.
    ///
    /// A self-closing root (`<a/>`) is expanded to `<a>fragment</a>`.
    pub fn append_to_root(&self, fragment: &str) -> Result<String, Error> {
        let text = self.text();
        let range = self.root().range();
        let element_text = &text[range.clone()];

        let mut out = String::with_capacity(text.len() + fragment.len() + 16);
        if element_text.ends_with("/>") {
            let qname = self.root_qname();
            out.push_str(&text[..range.end - 2]);
            out.push('>');
            out.push_str(fragment);
            out.push_str("</");
            out.push_str(qname);
            out.push('>');
        } else {
            let close = element_text
                .rfind("</")
                .map(|offset| range.start + offset)
                .ok_or_else(|| Error::XmlWrite("root element has no end tag".into()))?;
            out.push_str(&text[..close]);
            out.push_str(fragment);
            out.push_str(&text[close..range.end]);
        }
        out.push_str(&text[range.end..]);
        Ok(out)
    }
}

/// Namespace declarations and `xml:*` attributes in scope at an element.
///
/// Canonical XML 1.0 renders both on the apex of a document subset, so a
/// subtree serialized on its own has to carry them to canonicalize the
/// same way it would in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorContext {
    /// Prefixed namespaces (prefix → URI). The default namespace is left
    /// out; the inserted subtree declares its own.
    namespaces: BTreeMap<String, String>,
    /// `xml:*` attributes (local name → value), nearest ancestor wins.
    xml_attributes: BTreeMap<String, String>,
}

impl AncestorContext {
    /// Collect the context a new child of `node` would inherit.
    pub fn of_element(node: roxmltree::Node<'_, '_>) -> Self {
        let mut namespaces = BTreeMap::new();
        for namespace in node.namespaces() {
            if let Some(prefix) = namespace.name() {
                if prefix != "xml" && !namespace.uri().is_empty() {
                    namespaces.insert(prefix.to_owned(), namespace.uri().to_owned());
                }
            }
        }

        let mut xml_attributes = BTreeMap::new();
        for ancestor in node.ancestors().filter(|n| n.is_element()) {
            for attr in ancestor.attributes() {
                if attr.namespace() == Some(ns::XML) {
                    xml_attributes
                        .entry(attr.name().to_owned())
                        .or_insert_with(|| attr.value().to_owned());
                }
            }
        }

        Self {
            namespaces,
            xml_attributes,
        }
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn xml_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.xml_attributes
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.xml_attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_malformed() {
        let err = SourceDocument::parse("<Invoice><Amount>").err().unwrap();
        assert!(matches!(err, Error::XmlParse(_)), "got {err:?}");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            SourceDocument::parse("").err().unwrap(),
            Error::EmptyDocument
        ));
        assert!(matches!(
            SourceDocument::parse("  \n ").err().unwrap(),
            Error::EmptyDocument
        ));
    }

    #[test]
    fn test_parse_prolog_only() {
        let err = SourceDocument::parse("<?xml version=\"1.0\"?>\n<!-- nothing here -->")
            .err()
            .unwrap();
        assert!(matches!(err, Error::EmptyDocument), "got {err:?}");
    }

    #[test]
    fn test_root_qname() {
        let doc = SourceDocument::parse("<p:Invoice xmlns:p=\"urn:x\"/>").unwrap();
        assert_eq!(doc.root_qname(), "p:Invoice");
        let doc = SourceDocument::parse("<?xml version=\"1.0\"?>\n<Invoice>\n</Invoice>").unwrap();
        assert_eq!(doc.root_qname(), "Invoice");
    }

    #[test]
    fn test_append_to_root() {
        let doc = SourceDocument::parse("<Invoice><Amount>100</Amount></Invoice>").unwrap();
        assert_eq!(
            doc.append_to_root("<Sig/>").unwrap(),
            "<Invoice><Amount>100</Amount><Sig/></Invoice>"
        );
    }

    #[test]
    fn test_append_preserves_prolog_and_trailer() {
        let input = "<?xml version=\"1.0\"?>\n<!-- head -->\n<a>\n  <b/>\n</a >\n<!-- tail -->\n";
        let doc = SourceDocument::parse(input).unwrap();
        assert_eq!(
            doc.append_to_root("<Sig/>").unwrap(),
            "<?xml version=\"1.0\"?>\n<!-- head -->\n<a>\n  <b/>\n<Sig/></a >\n<!-- tail -->\n"
        );
    }

    #[test]
    fn test_append_to_self_closing_root() {
        let doc = SourceDocument::parse("<ns:a xmlns:ns=\"urn:a\" x=\"1\" />").unwrap();
        assert_eq!(
            doc.append_to_root("<Sig/>").unwrap(),
            "<ns:a xmlns:ns=\"urn:a\" x=\"1\" ><Sig/></ns:a>"
        );
    }

    #[test]
    fn test_root_context() {
        let doc = SourceDocument::parse(
            "<a:r xmlns=\"urn:default\" xmlns:a=\"urn:a\" xmlns:b=\"urn:b\" xml:lang=\"sv\" id=\"1\"/>",
        )
        .unwrap();
        let ctx = doc.root_context();
        let namespaces: Vec<_> = ctx.namespaces().collect();
        assert_eq!(namespaces, vec![("a", "urn:a"), ("b", "urn:b")]);
        let xml_attrs: Vec<_> = ctx.xml_attributes().collect();
        assert_eq!(xml_attrs, vec![("lang", "sv")]);
    }

    #[test]
    fn test_root_context_plain() {
        let doc = SourceDocument::parse("<Invoice/>").unwrap();
        assert!(doc.root_context().is_empty());
    }
}
