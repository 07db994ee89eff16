#![forbid(unsafe_code)]

//! `SignatureValue` computation.
//!
//! Canonical XML 1.0 renders every namespace in scope, and every inherited
//! `xml:*` attribute, on the apex of a document subset. `SignedInfo` is
//! canonicalized on its own, so it is first given the declarations it will
//! inherit once it sits inside `Signature` under the document element.

use xmlsigner_core::{ns, Error};
use xmlsigner_crypto::{sign, SigningKey};
use xmlsigner_xml::{AncestorContext, Element};

use crate::profile::SignatureProfile;

/// Sign `signed_info` and return the Base64 signature value.
pub fn compute_signature_value(
    signed_info: &Element,
    context: &AncestorContext,
    key: &SigningKey,
    profile: &SignatureProfile,
) -> Result<String, Error> {
    let canonical = canonical_signed_info(signed_info, context, profile)?;
    let algorithm = sign::from_uri(profile.signature_uri())?;
    let signature = algorithm.sign(key, &canonical)?;
    tracing::debug!(
        canonical_len = canonical.len(),
        signature_len = signature.len(),
        "signed SignedInfo"
    );
    Ok(crate::base64_encode(&signature))
}

/// The bytes that get signed: `SignedInfo` canonicalized as it will appear
/// in the signed document.
pub fn canonical_signed_info(
    signed_info: &Element,
    context: &AncestorContext,
    profile: &SignatureProfile,
) -> Result<Vec<u8>, Error> {
    let mut standalone = signed_info.clone().with_attr(ns::attr::XMLNS, ns::DSIG);
    for (prefix, uri) in context.namespaces() {
        standalone = standalone.with_attr(format!("{}:{prefix}", ns::attr::XMLNS), uri);
    }
    for (name, value) in context.xml_attributes() {
        standalone = standalone.with_attr(format!("xml:{name}"), value);
    }
    xmlsigner_c14n::canonicalize(&standalone.to_xml()?, profile.c14n_mode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlsigner_keys::{KeyProvider, Pkcs12Provider};
    use xmlsigner_xml::SourceDocument;

    use crate::signed_info::build_signed_info;

    fn test_key() -> SigningKey {
        let data = std::fs::read("../../test-data/keys/rsa-2048.p12").unwrap();
        Pkcs12Provider.load(&data, "secret123").unwrap().key
    }

    #[test]
    fn test_canonical_form_plain_root() {
        let doc = SourceDocument::parse("<Invoice><Amount>100</Amount></Invoice>").unwrap();
        let signed_info = build_signed_info(&doc, &SignatureProfile::RsaSha1).unwrap();
        let canonical =
            canonical_signed_info(&signed_info, &doc.root_context(), &SignatureProfile::RsaSha1)
                .unwrap();
        let canonical = String::from_utf8(canonical).unwrap();
        assert!(canonical.starts_with(
            "<SignedInfo xmlns=\"http://www.w3.org/2000/09/xmldsig#\"><CanonicalizationMethod \
             Algorithm=\"http://www.w3.org/TR/2001/REC-xml-c14n-20010315\"></CanonicalizationMethod>"
        ));
        assert!(canonical.ends_with("</DigestValue></Reference></SignedInfo>"));
    }

    #[test]
    fn test_canonical_form_carries_root_context() {
        let doc = SourceDocument::parse(
            "<inv:Invoice xmlns:inv=\"urn:example:invoice\" xmlns=\"urn:default\" xml:lang=\"sv\"><inv:Amount/></inv:Invoice>",
        )
        .unwrap();
        let signed_info = build_signed_info(&doc, &SignatureProfile::RsaSha1).unwrap();
        let canonical =
            canonical_signed_info(&signed_info, &doc.root_context(), &SignatureProfile::RsaSha1)
                .unwrap();
        let canonical = String::from_utf8(canonical).unwrap();
        assert!(
            canonical.starts_with(
                "<SignedInfo xmlns=\"http://www.w3.org/2000/09/xmldsig#\" \
                 xmlns:inv=\"urn:example:invoice\" xml:lang=\"sv\">"
            ),
            "{canonical}"
        );
    }

    #[test]
    fn test_signature_value_is_deterministic_base64() {
        let doc = SourceDocument::parse("<Invoice><Amount>100</Amount></Invoice>").unwrap();
        let profile = SignatureProfile::RsaSha1;
        let signed_info = build_signed_info(&doc, &profile).unwrap();
        let key = test_key();
        let first = compute_signature_value(&signed_info, &doc.root_context(), &key, &profile).unwrap();
        let second = compute_signature_value(&signed_info, &doc.root_context(), &key, &profile).unwrap();
        assert_eq!(first, second);
        // 256-byte RSA-2048 signature, no line breaks
        assert_eq!(first.len(), 344);
        assert!(!first.contains('\n'));
    }

    #[test]
    fn test_signature_verifies() {
        let doc = SourceDocument::parse("<Invoice><Amount>100</Amount></Invoice>").unwrap();
        for profile in [SignatureProfile::RsaSha1, SignatureProfile::RsaSha256] {
            let signed_info = build_signed_info(&doc, &profile).unwrap();
            let key = test_key();
            let value = compute_signature_value(&signed_info, &doc.root_context(), &key, &profile)
                .unwrap();

            use base64::Engine;
            let signature = base64::engine::general_purpose::STANDARD.decode(value).unwrap();
            let canonical = canonical_signed_info(&signed_info, &doc.root_context(), &profile).unwrap();
            let algorithm = sign::from_uri(profile.signature_uri()).unwrap();
            assert!(algorithm.verify(&key, &canonical, &signature).unwrap());
        }
    }

    #[test]
    fn test_public_key_cannot_sign() {
        let doc = SourceDocument::parse("<Invoice/>").unwrap();
        let profile = SignatureProfile::RsaSha1;
        let signed_info = build_signed_info(&doc, &profile).unwrap();
        let public = SigningKey::RsaPublic(test_key().public_key());
        let err = compute_signature_value(&signed_info, &doc.root_context(), &public, &profile)
            .unwrap_err();
        assert!(matches!(err, Error::Signing(_)), "got {err:?}");
    }
}
