#![forbid(unsafe_code)]

//! Signing credentials for xmlsigner.
//!
//! A [`KeyProvider`] turns keystore bytes and a passphrase into
//! [`Credentials`]: an RSA private key plus the X.509 certificate that is
//! embedded in the signature's `KeyInfo`. PKCS#12 and PEM bundles are
//! supported.

pub mod key;
pub mod loader;
pub mod x509;

pub use key::Credentials;
pub use loader::{load_credentials_file, KeyProvider, PemProvider, Pkcs12Provider};
pub use x509::X509Certificate;
pub use xmlsigner_crypto::SigningKey;
