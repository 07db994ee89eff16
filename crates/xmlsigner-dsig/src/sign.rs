#![forbid(unsafe_code)]

//! Enveloped signature creation.

use xmlsigner_core::{ns, Error};
use xmlsigner_xml::{Element, SourceDocument};

use crate::context::SignerContext;
use crate::key_info::build_key_info;
use crate::signature_value::compute_signature_value;
use crate::signed_info::build_signed_info;

/// Sign `xml` and return it with a `Signature` element appended as the
/// last child of the document element.
///
/// Everything outside the appended element is returned exactly as given.
/// Fails with [`Error::XmlParse`] on malformed input, [`Error::EmptyDocument`]
/// when there is no document element, and [`Error::Signing`] when the key
/// cannot sign.
#[tracing::instrument(skip_all, fields(profile = ?ctx.profile()))]
pub fn sign(xml: &str, ctx: &SignerContext) -> Result<String, Error> {
    let doc = SourceDocument::parse(xml)?;
    let profile = ctx.profile();

    let signed_info = build_signed_info(&doc, &profile)?;
    let signature_value =
        compute_signature_value(&signed_info, &doc.root_context(), ctx.key(), &profile)?;
    let key_info = build_key_info(ctx.certificate());

    let signature = assemble_signature(signed_info, signature_value, key_info);
    let signed = doc.append_to_root(&signature.to_xml()?)?;
    tracing::debug!(root = doc.root_qname(), "appended Signature to document element");
    Ok(signed)
}

/// Compose `Signature` from its three parts, in the order
/// `SignedInfo`, `SignatureValue`, `KeyInfo`.
pub fn assemble_signature(signed_info: Element, signature_value: String, key_info: Element) -> Element {
    Element::new(ns::node::SIGNATURE)
        .with_attr(ns::attr::XMLNS, ns::DSIG)
        .with_child(signed_info)
        .with_child(Element::new(ns::node::SIGNATURE_VALUE).with_text(signature_value))
        .with_child(key_info)
}
