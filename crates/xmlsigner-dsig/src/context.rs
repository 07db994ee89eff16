#![forbid(unsafe_code)]

//! Signer context: the key, certificate and profile used for every
//! signature, resolved once.

use std::path::Path;

use xmlsigner_core::Error;
use xmlsigner_keys::{Credentials, KeyProvider, Pkcs12Provider, SigningKey, X509Certificate};

use crate::profile::SignatureProfile;

/// Immutable signing state. Shareable across threads; each `sign` call
/// only reads it.
#[derive(Debug, Clone)]
pub struct SignerContext {
    key: SigningKey,
    certificate: X509Certificate,
    profile: SignatureProfile,
}

impl SignerContext {
    /// Build from an already loaded key and certificate.
    pub fn new(key: SigningKey, certificate: X509Certificate) -> Self {
        Self {
            key,
            certificate,
            profile: SignatureProfile::default(),
        }
    }

    /// Open a PKCS#12 keystore.
    pub fn from_pkcs12(data: &[u8], passphrase: &str) -> Result<Self, Error> {
        Self::load(&Pkcs12Provider, data, passphrase)
    }

    /// Open a PKCS#12 keystore file.
    pub fn from_pkcs12_file(path: impl AsRef<Path>, passphrase: &str) -> Result<Self, Error> {
        let data = std::fs::read(path)?;
        Self::from_pkcs12(&data, passphrase)
    }

    /// Load credentials through any provider.
    pub fn load(provider: &dyn KeyProvider, data: &[u8], passphrase: &str) -> Result<Self, Error> {
        Ok(provider.load(data, passphrase)?.into())
    }

    pub fn with_profile(mut self, profile: SignatureProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    pub fn certificate(&self) -> &X509Certificate {
        &self.certificate
    }

    pub fn profile(&self) -> SignatureProfile {
        self.profile
    }
}

impl From<Credentials> for SignerContext {
    fn from(credentials: Credentials) -> Self {
        Self::new(credentials.key, credentials.certificate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlsigner_keys::PemProvider;

    const KEYSTORE: &str = "../../test-data/keys/rsa-2048.p12";

    #[test]
    fn test_from_pkcs12() {
        let data = std::fs::read(KEYSTORE).unwrap();
        let ctx = SignerContext::from_pkcs12(&data, "secret123").unwrap();
        assert!(ctx.key().has_private_key());
        assert_eq!(ctx.profile(), SignatureProfile::RsaSha1);
        assert_eq!(
            ctx.certificate().subject_name(),
            "C=SE, ST=Stockholm, O=Example Org, CN=xml-signer-test"
        );
    }

    #[test]
    fn test_from_pkcs12_errors() {
        let data = std::fs::read(KEYSTORE).unwrap();
        let err = SignerContext::from_pkcs12(&data, "wrong").unwrap_err();
        assert!(matches!(err, Error::KeyLoad(_)), "got {err:?}");

        let err = SignerContext::from_pkcs12(b"garbage", "secret123").unwrap_err();
        assert!(matches!(err, Error::KeyLoad(_)), "got {err:?}");

        let err = SignerContext::from_pkcs12_file("../../test-data/keys/none.p12", "x").unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got {err:?}");
    }

    #[test]
    fn test_load_with_provider_and_profile() {
        let data = std::fs::read("../../test-data/keys/rsa-2048-bundle.pem").unwrap();
        let ctx = SignerContext::load(&PemProvider, &data, "")
            .unwrap()
            .with_profile(SignatureProfile::RsaSha256);
        assert_eq!(ctx.profile(), SignatureProfile::RsaSha256);
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SignerContext>();
    }
}
