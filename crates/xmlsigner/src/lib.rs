#![forbid(unsafe_code)]

//! Enveloped XML Digital Signatures.
//!
//! ```no_run
//! let keystore = std::fs::read("signer.p12")?;
//! let signer = xmlsigner::Signer::new(&keystore, "passphrase")?;
//! let signed = signer.sign("<Invoice><Amount>100</Amount></Invoice>")?;
//! # Ok::<(), xmlsigner::Error>(())
//! ```

pub use xmlsigner_c14n as c14n;
pub use xmlsigner_core as core;
pub use xmlsigner_crypto as crypto;
pub use xmlsigner_dsig as dsig;
pub use xmlsigner_keys as keys;
pub use xmlsigner_pkcs12 as pkcs12;
pub use xmlsigner_xml as xml;

pub use xmlsigner_core::{Error, Result};
pub use xmlsigner_dsig::{sign, SignatureProfile, SignerContext};
pub use xmlsigner_keys::{KeyProvider, PemProvider, Pkcs12Provider};

use std::path::Path;

/// Signs documents with one set of credentials.
///
/// Cheap to share: `sign` takes `&self`, so one `Signer` can serve many
/// threads.
#[derive(Debug, Clone)]
pub struct Signer {
    context: SignerContext,
}

impl Signer {
    /// Open a PKCS#12 keystore.
    pub fn new(keystore: &[u8], passphrase: &str) -> Result<Self> {
        Ok(Self::from_context(SignerContext::from_pkcs12(keystore, passphrase)?))
    }

    /// Open a PKCS#12 keystore or PEM bundle from disk.
    pub fn from_file(path: impl AsRef<Path>, passphrase: &str) -> Result<Self> {
        let credentials = xmlsigner_keys::load_credentials_file(path.as_ref(), passphrase)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded signer credentials");
        Ok(Self::from_context(credentials.into()))
    }

    pub fn from_context(context: SignerContext) -> Self {
        Self { context }
    }

    pub fn with_profile(self, profile: SignatureProfile) -> Self {
        Self::from_context(self.context.with_profile(profile))
    }

    pub fn context(&self) -> &SignerContext {
        &self.context
    }

    /// Return `xml` with an enveloped `Signature` appended to its document
    /// element.
    pub fn sign(&self, xml: &str) -> Result<String> {
        sign(xml, &self.context)
    }
}
