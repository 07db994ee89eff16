#![forbid(unsafe_code)]

//! PKCS#12 (.p12/.pfx) keystore reader for xmlsigner.
//!
//! Handles the legacy PBE (SHA-1 + 3DES-CBC) scheme and PBES2
//! (PBKDF2 + AES-256-CBC) as written by OpenSSL 3. Integrity is checked
//! with the keystore MAC before anything is decrypted.

mod kdf;
mod parse;

use xmlsigner_core::Error;

/// Raw material extracted from a keystore.
#[derive(Debug, Default)]
pub struct Pkcs12Bundle {
    /// PKCS#8 `PrivateKeyInfo` DER, one per shrouded key bag.
    pub private_keys: Vec<Vec<u8>>,
    /// X.509 certificate DER, in bag order.
    pub certificates: Vec<Vec<u8>>,
}

/// Open a PKCS#12 keystore with `passphrase`.
///
/// Every failure, including a wrong passphrase, is reported as
/// [`Error::KeyLoad`].
pub fn parse_pkcs12(data: &[u8], passphrase: &str) -> Result<Pkcs12Bundle, Error> {
    let bundle = parse::read_pfx(data, passphrase)?;
    tracing::debug!(
        keys = bundle.private_keys.len(),
        certificates = bundle.certificates.len(),
        "opened PKCS#12 keystore"
    );
    Ok(bundle)
}
