#![forbid(unsafe_code)]

//! XML document handling for xmlsigner.
//!
//! Source documents are parsed with `roxmltree` and never mutated; new
//! subtrees are built as owned [`Element`] values and serialized with a
//! `quick-xml` writer.

pub mod builder;
pub mod document;
pub mod writer;

pub use builder::{Element, Node};
pub use document::{AncestorContext, SourceDocument};
pub use writer::XmlWriter;

/// roxmltree parsing options with DTDs allowed. Only internal entity
/// declarations are expanded; external entities are never fetched.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}
