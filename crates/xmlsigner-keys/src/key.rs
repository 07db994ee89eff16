#![forbid(unsafe_code)]

//! Key and certificate pairs.

use xmlsigner_core::Error;
use xmlsigner_crypto::SigningKey;

use crate::x509::X509Certificate;

/// A private key and the certificate that identifies it.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub key: SigningKey,
    pub certificate: X509Certificate,
}

impl Credentials {
    pub fn new(key: SigningKey, certificate: X509Certificate) -> Self {
        Self { key, certificate }
    }

    /// Check that the certificate carries the public half of `key`.
    pub fn check_pair(&self) -> Result<(), Error> {
        if self.certificate.rsa_public_key()? == self.key.public_key() {
            Ok(())
        } else {
            Err(Error::KeyLoad(
                "certificate does not match the private key".into(),
            ))
        }
    }
}
