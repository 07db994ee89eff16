#![forbid(unsafe_code)]

//! Cryptographic primitives for xmlsigner: message digests and RSA
//! PKCS#1 v1.5 signatures, both selected by XML-DSig algorithm URI.

pub mod digest;
pub mod sign;

pub use digest::DigestAlgorithm;
pub use sign::{SignatureAlgorithm, SigningKey};
