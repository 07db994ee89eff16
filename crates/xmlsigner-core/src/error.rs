#![forbid(unsafe_code)]

/// Errors produced while building an enveloped XML signature.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The keystore could not be opened: wrong passphrase, malformed
    /// container, or no usable key/certificate inside.
    #[error("key load error: {0}")]
    KeyLoad(String),

    /// The input is not well-formed XML.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// The input parsed but has no document element to sign.
    #[error("document has no root element")]
    EmptyDocument,

    /// The private-key operation failed.
    #[error("signing error: {0}")]
    Signing(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("XML writing error: {0}")]
    XmlWrite(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::KeyLoad("bad MAC".into()).to_string(),
            "key load error: bad MAC"
        );
        assert_eq!(Error::EmptyDocument.to_string(), "document has no root element");
        assert_eq!(
            Error::XmlParse("unexpected end of stream".into()).to_string(),
            "XML parsing error: unexpected end of stream"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.p12");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
