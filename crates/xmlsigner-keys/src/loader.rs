#![forbid(unsafe_code)]

//! Keystore providers.
//!
//! Only RSA private keys are accepted; any other key algorithm is reported
//! as [`Error::KeyLoad`].

use std::path::Path;

use xmlsigner_core::Error;
use xmlsigner_crypto::SigningKey;

use crate::key::Credentials;
use crate::x509::X509Certificate;

const RSA_ENCRYPTION_OID: &str = "1.2.840.113549.1.1.1";

/// Opens a keystore blob with a passphrase.
pub trait KeyProvider {
    fn load(&self, data: &[u8], passphrase: &str) -> Result<Credentials, Error>;
}

/// PKCS#12 (.p12/.pfx) keystores.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pkcs12Provider;

impl KeyProvider for Pkcs12Provider {
    /// Uses the first private key and the certificate carrying its public
    /// key, falling back to the first certificate.
    fn load(&self, data: &[u8], passphrase: &str) -> Result<Credentials, Error> {
        let bundle = xmlsigner_pkcs12::parse_pkcs12(data, passphrase)?;

        let key_der = bundle
            .private_keys
            .first()
            .ok_or_else(|| Error::KeyLoad("PKCS#12 contains no private key".into()))?;
        let key = load_private_key_pkcs8_der(key_der)?;

        let certificates = bundle
            .certificates
            .iter()
            .map(|der| X509Certificate::from_der(der))
            .collect::<Result<Vec<_>, _>>()?;
        let public = key.public_key();
        let certificate = match certificates
            .iter()
            .position(|c| c.rsa_public_key().is_ok_and(|k| k == public))
        {
            Some(idx) => certificates.into_iter().nth(idx),
            None => certificates.into_iter().next(),
        }
        .ok_or_else(|| Error::KeyLoad("PKCS#12 contains no certificate".into()))?;

        tracing::debug!(subject = %certificate.subject_name(), "loaded PKCS#12 credentials");
        Ok(Credentials::new(key, certificate))
    }
}

/// PEM bundles holding a private key block and a `CERTIFICATE` block.
///
/// The passphrase is only used for `ENCRYPTED PRIVATE KEY` blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PemProvider;

impl KeyProvider for PemProvider {
    fn load(&self, data: &[u8], passphrase: &str) -> Result<Credentials, Error> {
        let blocks = pem::parse_many(data)
            .map_err(|e| Error::KeyLoad(format!("failed to parse PEM bundle: {e}")))?;

        let key_block = blocks
            .iter()
            .find(|block| block.tag().ends_with("PRIVATE KEY"))
            .ok_or_else(|| Error::KeyLoad("PEM bundle contains no private key".into()))?;
        let key = load_private_key_block(key_block.tag(), key_block.contents(), passphrase)?;

        let cert_block = blocks
            .iter()
            .find(|block| block.tag() == "CERTIFICATE")
            .ok_or_else(|| Error::KeyLoad("PEM bundle contains no certificate".into()))?;
        let certificate = X509Certificate::from_der(cert_block.contents())?;

        tracing::debug!(subject = %certificate.subject_name(), "loaded PEM credentials");
        Ok(Credentials::new(key, certificate))
    }
}

/// Load credentials from a file, picking the provider by content: PEM
/// text if it contains a `-----BEGIN` line, PKCS#12 otherwise.
pub fn load_credentials_file(path: &Path, passphrase: &str) -> Result<Credentials, Error> {
    let data = std::fs::read(path)?;
    if data.windows(11).any(|w| w == b"-----BEGIN ") {
        PemProvider.load(&data, passphrase)
    } else {
        Pkcs12Provider.load(&data, passphrase)
    }
}

/// Load an RSA private key from a single PEM block.
pub fn load_private_key_pem(pem: &str, passphrase: &str) -> Result<SigningKey, Error> {
    let block = pem::parse(pem.trim())
        .map_err(|e| Error::KeyLoad(format!("failed to decode PEM: {e}")))?;
    load_private_key_block(block.tag(), block.contents(), passphrase)
}

/// Decode a private key by PEM label. The passphrase only applies to
/// `ENCRYPTED PRIVATE KEY`.
fn load_private_key_block(label: &str, der: &[u8], passphrase: &str) -> Result<SigningKey, Error> {
    use pkcs1::DecodeRsaPrivateKey;

    match label {
        "ENCRYPTED PRIVATE KEY" => {
            let encrypted = pkcs8::EncryptedPrivateKeyInfo::try_from(der)
                .map_err(|e| Error::KeyLoad(format!("invalid encrypted PKCS#8: {e}")))?;
            let document = encrypted.decrypt(passphrase).map_err(|e| {
                Error::KeyLoad(format!("failed to decrypt private key (wrong passphrase?): {e}"))
            })?;
            load_private_key_pkcs8_der(document.as_bytes())
        }
        "RSA PRIVATE KEY" => rsa::RsaPrivateKey::from_pkcs1_der(der)
            .map(SigningKey::Rsa)
            .map_err(|e| Error::KeyLoad(format!("invalid PKCS#1 RSA private key: {e}"))),
        "PRIVATE KEY" => load_private_key_pkcs8_der(der),
        other => Err(Error::KeyLoad(format!("unsupported private key PEM block: {other}"))),
    }
}

/// Load an RSA private key from PKCS#8 `PrivateKeyInfo` DER.
pub fn load_private_key_pkcs8_der(der: &[u8]) -> Result<SigningKey, Error> {
    use pkcs8::DecodePrivateKey;

    if let Ok(key) = rsa::RsaPrivateKey::from_pkcs8_der(der) {
        return Ok(SigningKey::Rsa(key));
    }
    let info = pkcs8::PrivateKeyInfo::try_from(der)
        .map_err(|e| Error::KeyLoad(format!("invalid PKCS#8 private key: {e}")))?;
    let algorithm = info.algorithm.oid.to_string();
    if algorithm == RSA_ENCRYPTION_OID {
        Err(Error::KeyLoad("malformed RSA private key".into()))
    } else {
        Err(Error::KeyLoad(format!(
            "unsupported private key algorithm {algorithm}; an RSA key is required"
        )))
    }
}
