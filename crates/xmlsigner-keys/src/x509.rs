#![forbid(unsafe_code)]

//! X.509 certificates as far as signing needs them: the DER bytes, the
//! subject distinguished name and the subject public key.

use der::{Decode, Encode, Tag, Tagged};
use xmlsigner_core::Error;

/// A parsed certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Certificate {
    der: Vec<u8>,
    subject: Vec<(String, String)>,
    spki_der: Vec<u8>,
}

impl X509Certificate {
    /// Parse a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let cert = x509_cert::Certificate::from_der(der)
            .map_err(|e| Error::KeyLoad(format!("invalid X.509 certificate: {e}")))?;
        let tbs = &cert.tbs_certificate;

        let subject = tbs
            .subject
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .map(|atv| (attribute_name(&atv.oid.to_string()), attribute_value(&atv.value)))
            .collect();

        let spki_der = tbs
            .subject_public_key_info
            .to_der()
            .map_err(|e| Error::KeyLoad(format!("failed to encode SPKI: {e}")))?;

        Ok(Self {
            der: der.to_vec(),
            subject,
            spki_der,
        })
    }

    /// Parse a single PEM `CERTIFICATE` block.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let (label, der) = pem_rfc7468::decode_vec(pem.trim().as_bytes())
            .map_err(|e| Error::KeyLoad(format!("failed to decode certificate PEM: {e}")))?;
        if label != "CERTIFICATE" {
            return Err(Error::KeyLoad(format!(
                "expected CERTIFICATE PEM label, got: {label}"
            )));
        }
        Self::from_der(&der)
    }

    /// The certificate exactly as encoded.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject attributes as `(short name, value)` pairs in encoding order.
    pub fn subject(&self) -> &[(String, String)] {
        &self.subject
    }

    /// The subject rendered as `Name=Value` pairs joined by `", "`,
    /// e.g. `C=SE, ST=Stockholm, O=Example Org, CN=xml-signer-test`.
    pub fn subject_name(&self) -> String {
        self.subject
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The subject public key, which must be RSA.
    pub fn rsa_public_key(&self) -> Result<rsa::RsaPublicKey, Error> {
        use pkcs8::DecodePublicKey;
        rsa::RsaPublicKey::from_public_key_der(&self.spki_der)
            .map_err(|e| Error::KeyLoad(format!("certificate key is not RSA: {e}")))
    }
}

/// OpenSSL short names for the common DN attribute types; anything else is
/// shown as a dotted OID.
fn attribute_name(oid: &str) -> String {
    let name = match oid {
        "2.5.4.3" => "CN",
        "2.5.4.4" => "SN",
        "2.5.4.5" => "serialNumber",
        "2.5.4.6" => "C",
        "2.5.4.7" => "L",
        "2.5.4.8" => "ST",
        "2.5.4.9" => "street",
        "2.5.4.10" => "O",
        "2.5.4.11" => "OU",
        "2.5.4.12" => "title",
        "2.5.4.17" => "postalCode",
        "2.5.4.41" => "name",
        "2.5.4.42" => "GN",
        "2.5.4.43" => "initials",
        "2.5.4.46" => "dnQualifier",
        "2.5.4.97" => "organizationIdentifier",
        "1.2.840.113549.1.9.1" => "emailAddress",
        "0.9.2342.19200300.100.1.1" => "UID",
        "0.9.2342.19200300.100.1.25" => "DC",
        other => other,
    };
    name.to_owned()
}

fn attribute_value(value: &der::Any) -> String {
    let bytes = value.value();
    match value.tag() {
        Tag::BmpString => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}
