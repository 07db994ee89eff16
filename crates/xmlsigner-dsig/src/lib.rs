#![forbid(unsafe_code)]

//! Enveloped XML Digital Signatures.
//!
//! [`sign`] runs four steps in order: [`build_signed_info`],
//! [`compute_signature_value`], [`build_key_info`] and
//! [`assemble_signature`], then appends the result as the last child of
//! the document element.

pub mod context;
pub mod key_info;
pub mod profile;
pub mod sign;
pub mod signature_value;
pub mod signed_info;

pub use context::SignerContext;
pub use key_info::build_key_info;
pub use profile::SignatureProfile;
pub use sign::{assemble_signature, sign};
pub use signature_value::compute_signature_value;
pub use signed_info::build_signed_info;

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
