#![forbid(unsafe_code)]

//! Inclusive Canonical XML 1.0 over a whole document.
//!
//! The canonical form:
//! - drops the XML declaration and DTD, expanding entity references
//! - renders namespace declarations sorted by prefix, default first
//! - renders attributes sorted by (namespace URI, local name)
//! - writes empty elements as start/end tag pairs
//! - keeps or strips comments depending on the mode

use std::collections::BTreeMap;

use roxmltree::{Node, NodeType};
use xmlsigner_core::{ns, Error};

use crate::escape;
use crate::render::{Attr, NsDecl};

/// Canonicalize a parsed document.
pub fn canonicalize(doc: &roxmltree::Document<'_>, with_comments: bool) -> Result<Vec<u8>, Error> {
    let mut output = Vec::with_capacity(doc.input_text().len());
    let ctx = C14nContext { with_comments };
    ctx.process_node(doc.root(), &mut output, &BTreeMap::new())?;
    Ok(output)
}

struct C14nContext {
    with_comments: bool,
}

impl C14nContext {
    fn process_node(
        &self,
        node: Node<'_, '_>,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        match node.node_type() {
            NodeType::Root => {
                for child in node.children() {
                    self.process_node(child, output, rendered_ns)?;
                }
            }
            NodeType::Element => self.process_element(node, output, rendered_ns)?,
            NodeType::Text => escape::push_text(output, node.text().unwrap_or("")),
            NodeType::Comment => {
                if self.with_comments {
                    with_document_newlines(node, output, |out| {
                        out.extend_from_slice(b"<!--");
                        out.extend_from_slice(node.text().unwrap_or("").as_bytes());
                        out.extend_from_slice(b"-->");
                    });
                }
            }
            NodeType::PI => {
                if let Some(pi) = node.pi() {
                    with_document_newlines(node, output, |out| {
                        out.extend_from_slice(b"<?");
                        out.extend_from_slice(pi.target.as_bytes());
                        if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
                            out.push(b' ');
                            escape::push_pi(out, value);
                        }
                        out.extend_from_slice(b"?>");
                    });
                }
            }
        }
        Ok(())
    }

    fn process_element(
        &self,
        node: Node<'_, '_>,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        let in_scope = collect_inscope_namespaces(node);

        let mut ns_decls: Vec<NsDecl> = in_scope
            .iter()
            .filter(|(prefix, uri)| rendered_ns.get(prefix.as_str()) != Some(uri))
            .map(|(prefix, uri)| NsDecl::new(prefix, uri))
            .collect();

        // A default namespace rendered above but not in scope here has to be
        // undeclared explicitly.
        if !in_scope.contains_key("") && rendered_ns.get("").is_some_and(|uri| !uri.is_empty()) {
            ns_decls.push(NsDecl::new("", ""));
        }
        ns_decls.sort();

        let mut attrs: Vec<Attr> = node
            .attributes()
            .map(|attr| Attr {
                ns_uri: attr.namespace().unwrap_or("").to_owned(),
                local_name: attr.name().to_owned(),
                qualified_name: attribute_qname(node, &attr),
                value: attr.value().to_owned(),
            })
            .collect();
        attrs.sort();

        let elem_name = element_qname(node);

        output.push(b'<');
        output.extend_from_slice(elem_name.as_bytes());
        for decl in &ns_decls {
            decl.write(output);
        }
        for attr in &attrs {
            attr.write(output);
        }
        output.push(b'>');

        for child in node.children() {
            self.process_node(child, output, &in_scope)?;
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(elem_name.as_bytes());
        output.push(b'>');
        Ok(())
    }
}

/// Comments and PIs that are siblings of the document element are separated
/// from it by a single line feed.
fn with_document_newlines(node: Node<'_, '_>, output: &mut Vec<u8>, write: impl FnOnce(&mut Vec<u8>)) {
    let top_level = node.parent().is_some_and(|p| p.is_root());
    if top_level && node.prev_siblings().any(|s| s.is_element()) {
        output.push(b'\n');
    }
    write(output);
    if top_level && node.next_siblings().any(|s| s.is_element()) {
        output.push(b'\n');
    }
}

/// Namespaces in scope at `node`, excluding the implicit `xml` prefix.
///
/// An empty default namespace counts as not declared.
fn collect_inscope_namespaces(node: Node<'_, '_>) -> BTreeMap<String, String> {
    let mut in_scope = BTreeMap::new();
    for namespace in node.namespaces() {
        let prefix = namespace.name().unwrap_or("");
        if prefix == "xml" || (prefix.is_empty() && namespace.uri().is_empty()) {
            continue;
        }
        in_scope
            .entry(prefix.to_owned())
            .or_insert_with(|| namespace.uri().to_owned());
    }
    in_scope
}

/// The element's qualified name as written in the source.
fn element_qname(node: Node<'_, '_>) -> String {
    let text = &node.document().input_text()[node.range()];
    let name = text
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .next()
        .unwrap_or("");
    if name.is_empty() {
        node.tag_name().name().to_owned()
    } else {
        name.to_owned()
    }
}

/// The attribute's qualified name as written. Two prefixes may be bound to
/// the same URI, so the prefix cannot be recovered from the namespace alone.
fn attribute_qname(node: Node<'_, '_>, attr: &roxmltree::Attribute<'_, '_>) -> String {
    match attr.namespace() {
        None => attr.name().to_owned(),
        Some(ns::XML) => format!("xml:{}", attr.name()),
        Some(_) => node.document().input_text()[attr.range_qname()].to_owned(),
    }
}
