#![forbid(unsafe_code)]

//! `SignedInfo` construction.

use xmlsigner_core::{algorithm, ns, Error};
use xmlsigner_crypto::digest;
use xmlsigner_xml::{Element, SourceDocument};

use crate::profile::SignatureProfile;

/// Build `SignedInfo` with a single `Reference URI=""` covering the whole
/// document.
///
/// The digest is taken over the canonical form of `doc` as parsed, which
/// holds no signature yet; this is the octet stream the
/// enveloped-signature transform yields on the signed document.
pub fn build_signed_info(doc: &SourceDocument<'_>, profile: &SignatureProfile) -> Result<Element, Error> {
    let canonical = xmlsigner_c14n::canonicalize_doc(doc.tree(), profile.c14n_mode())?;
    let digest_value = crate::base64_encode(&digest::digest(profile.digest_uri(), &canonical)?);
    tracing::debug!(
        canonical_len = canonical.len(),
        digest = %digest_value,
        "computed document digest"
    );

    let reference = Element::new(ns::node::REFERENCE)
        .with_attr(ns::attr::URI, "")
        .with_child(
            Element::new(ns::node::TRANSFORMS).with_child(
                Element::new(ns::node::TRANSFORM)
                    .with_attr(ns::attr::ALGORITHM, algorithm::ENVELOPED_SIGNATURE),
            ),
        )
        .with_child(
            Element::new(ns::node::DIGEST_METHOD).with_attr(ns::attr::ALGORITHM, profile.digest_uri()),
        )
        .with_child(Element::new(ns::node::DIGEST_VALUE).with_text(digest_value));

    Ok(Element::new(ns::node::SIGNED_INFO)
        .with_child(
            Element::new(ns::node::CANONICALIZATION_METHOD)
                .with_attr(ns::attr::ALGORITHM, profile.canonicalization_uri()),
        )
        .with_child(
            Element::new(ns::node::SIGNATURE_METHOD)
                .with_attr(ns::attr::ALGORITHM, profile.signature_uri()),
        )
        .with_child(reference))
}
