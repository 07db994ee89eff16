#![forbid(unsafe_code)]

//! Algorithm suites a signature can be produced with.

use xmlsigner_c14n::C14nMode;
use xmlsigner_core::algorithm;

/// The algorithms named in `SignedInfo`.
///
/// Canonicalization is always Canonical XML 1.0 without comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureProfile {
    /// RSA-SHA1 signature over a SHA-1 digest, as most legacy verifiers
    /// expect.
    #[default]
    RsaSha1,
    /// RSA-SHA256 signature over a SHA-256 digest.
    RsaSha256,
}

impl SignatureProfile {
    pub fn c14n_mode(&self) -> C14nMode {
        C14nMode::Inclusive
    }

    pub fn canonicalization_uri(&self) -> &'static str {
        self.c14n_mode().uri()
    }

    pub fn signature_uri(&self) -> &'static str {
        match self {
            Self::RsaSha1 => algorithm::RSA_SHA1,
            Self::RsaSha256 => algorithm::RSA_SHA256,
        }
    }

    pub fn digest_uri(&self) -> &'static str {
        match self {
            Self::RsaSha1 => algorithm::SHA1,
            Self::RsaSha256 => algorithm::SHA256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_uris() {
        let profile = SignatureProfile::default();
        assert_eq!(profile, SignatureProfile::RsaSha1);
        assert_eq!(
            profile.canonicalization_uri(),
            "http://www.w3.org/TR/2001/REC-xml-c14n-20010315"
        );
        assert_eq!(profile.signature_uri(), "http://www.w3.org/2000/09/xmldsig#rsa-sha1");
        assert_eq!(profile.digest_uri(), "http://www.w3.org/2000/09/xmldsig#sha1");
    }

    #[test]
    fn test_sha256_profile_uris() {
        let profile = SignatureProfile::RsaSha256;
        assert_eq!(
            profile.signature_uri(),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"
        );
        assert_eq!(profile.digest_uri(), "http://www.w3.org/2001/04/xmlenc#sha256");
        assert_eq!(profile.canonicalization_uri(), algorithm::C14N);
    }
}
