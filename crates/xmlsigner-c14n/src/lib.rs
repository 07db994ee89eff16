#![forbid(unsafe_code)]

//! XML Canonicalization (C14N) for xmlsigner.
//!
//! Implements W3C Canonical XML 1.0, with and without comments, over
//! whole documents.

pub mod escape;
pub mod inclusive;
pub mod render;

use xmlsigner_core::{algorithm, Error};

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C14nMode {
    /// Canonical XML 1.0
    Inclusive,
    /// Canonical XML 1.0 with comments
    InclusiveWithComments,
}

impl C14nMode {
    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
        }
    }

    /// Parse a C14N mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::C14N => Some(Self::Inclusive),
            algorithm::C14N_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            _ => None,
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments)
    }
}

/// Canonicalize XML text.
pub fn canonicalize(xml: &str, mode: C14nMode) -> Result<Vec<u8>, Error> {
    let doc = roxmltree::Document::parse_with_options(xml, xmlsigner_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    canonicalize_doc(&doc, mode)
}

/// Convenience: canonicalize a pre-parsed document.
pub fn canonicalize_doc(doc: &roxmltree::Document<'_>, mode: C14nMode) -> Result<Vec<u8>, Error> {
    inclusive::canonicalize(doc, mode.with_comments())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_uri_roundtrip() {
        for mode in [C14nMode::Inclusive, C14nMode::InclusiveWithComments] {
            assert_eq!(C14nMode::from_uri(mode.uri()), Some(mode));
        }
        assert_eq!(
            C14nMode::from_uri("http://www.w3.org/2001/10/xml-exc-c14n#"),
            None
        );
    }

    #[test]
    fn test_canonicalize_rejects_malformed() {
        let err = canonicalize("<a><b></a>", C14nMode::Inclusive).unwrap_err();
        assert!(matches!(err, Error::XmlParse(_)));
    }

    #[test]
    fn test_declaration_and_dtd_dropped() {
        let xml = "<?xml version=\"1.0\"?>\n<!DOCTYPE doc [<!ENTITY e \"v\">]>\n<doc>&e;</doc>";
        let out = canonicalize(xml, C14nMode::Inclusive).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<doc>v</doc>");
    }
}
