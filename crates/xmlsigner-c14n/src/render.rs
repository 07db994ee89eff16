#![forbid(unsafe_code)]

//! Namespace declarations and attributes as they appear in a canonical
//! start tag, with the C14N ordering rules.

use crate::escape;

/// A namespace declaration to be rendered.
///
/// Ordered by prefix; the default namespace has the empty prefix and so
/// sorts first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NsDecl {
    /// The prefix ("" for default namespace).
    pub prefix: String,
    /// The namespace URI ("" to undeclare the default namespace).
    pub uri: String,
}

impl NsDecl {
    pub fn new(prefix: &str, uri: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            uri: uri.to_owned(),
        }
    }

    /// Append ` xmlns="uri"` or ` xmlns:prefix="uri"`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b" xmlns");
        if !self.prefix.is_empty() {
            out.push(b':');
            out.extend_from_slice(self.prefix.as_bytes());
        }
        out.extend_from_slice(b"=\"");
        escape::push_attr(out, &self.uri);
        out.push(b'"');
    }
}

/// An attribute to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// The namespace URI of the attribute ("" for no namespace).
    pub ns_uri: String,
    /// The local name.
    pub local_name: String,
    /// The qualified name (prefix:local or just local).
    pub qualified_name: String,
    /// The attribute value.
    pub value: String,
}

impl Attr {
    /// Append ` name="value"`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(b' ');
        out.extend_from_slice(self.qualified_name.as_bytes());
        out.extend_from_slice(b"=\"");
        escape::push_attr(out, &self.value);
        out.push(b'"');
    }
}

// Unqualified attributes have an empty namespace URI and therefore come
// first; the rest sort by (namespace URI, local name).
impl Ord for Attr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.ns_uri.as_str(), self.local_name.as_str())
            .cmp(&(other.ns_uri.as_str(), other.local_name.as_str()))
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(ns_uri: &str, qname: &str) -> Attr {
        let local = qname.rsplit(':').next().unwrap_or(qname);
        Attr {
            ns_uri: ns_uri.into(),
            local_name: local.into(),
            qualified_name: qname.into(),
            value: String::new(),
        }
    }

    #[test]
    fn test_ns_order_default_first() {
        let mut decls = vec![NsDecl::new("b", "urn:b"), NsDecl::new("", "urn:d"), NsDecl::new("a", "urn:a")];
        decls.sort();
        let prefixes: Vec<_> = decls.iter().map(|d| d.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["", "a", "b"]);
    }

    #[test]
    fn test_attr_order() {
        let mut attrs = vec![
            attr("urn:z", "z:a"),
            attr("", "b"),
            attr("urn:a", "p:z"),
            attr("", "a"),
        ];
        attrs.sort();
        let names: Vec<_> = attrs.iter().map(|a| a.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "p:z", "z:a"]);
    }

    #[test]
    fn test_write() {
        let mut out = Vec::new();
        NsDecl::new("", "urn:x").write(&mut out);
        NsDecl::new("p", "urn:p").write(&mut out);
        Attr {
            value: "1\"2".into(),
            ..attr("", "id")
        }
        .write(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#" xmlns="urn:x" xmlns:p="urn:p" id="1&quot;2""#
        );
    }
}
