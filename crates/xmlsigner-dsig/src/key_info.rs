#![forbid(unsafe_code)]

//! `KeyInfo` construction.

use xmlsigner_core::ns;
use xmlsigner_keys::X509Certificate;
use xmlsigner_xml::Element;

/// `KeyInfo/X509Data` holding the certificate and its subject name. The
/// certificate is only serialized, never validated.
pub fn build_key_info(certificate: &X509Certificate) -> Element {
    let x509_data = Element::new(ns::node::X509_DATA)
        .with_child(
            Element::new(ns::node::X509_CERTIFICATE)
                .with_text(crate::base64_encode(certificate.der())),
        )
        .with_child(Element::new(ns::node::X509_SUBJECT_NAME).with_text(certificate.subject_name()));
    Element::new(ns::node::KEY_INFO).with_child(x509_data)
}
