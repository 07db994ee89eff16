#![forbid(unsafe_code)]

//! RSA PKCS#1 v1.5 signature algorithms.

use signature::SignatureEncoding;
use xmlsigner_core::{algorithm, Error};

/// Key material for signature operations.
#[derive(Clone)]
pub enum SigningKey {
    Rsa(rsa::RsaPrivateKey),
    RsaPublic(rsa::RsaPublicKey),
}

impl SigningKey {
    /// The public half of the key.
    pub fn public_key(&self) -> rsa::RsaPublicKey {
        match self {
            Self::Rsa(pk) => pk.to_public_key(),
            Self::RsaPublic(pk) => pk.clone(),
        }
    }

    pub fn has_private_key(&self) -> bool {
        matches!(self, Self::Rsa(_))
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use rsa::traits::PublicKeyParts;
        let (kind, bits) = match self {
            Self::Rsa(pk) => ("Rsa", pk.size() * 8),
            Self::RsaPublic(pk) => ("RsaPublic", pk.size() * 8),
        };
        f.debug_struct("SigningKey")
            .field("kind", &kind)
            .field("bits", &bits)
            .finish()
    }
}

/// Trait for signature algorithms.
pub trait SignatureAlgorithm: Send + Sync {
    fn uri(&self) -> &'static str;
    fn sign(&self, key: &SigningKey, data: &[u8]) -> Result<Vec<u8>, Error>;
    fn verify(&self, key: &SigningKey, data: &[u8], signature: &[u8]) -> Result<bool, Error>;
}

/// Create a signature algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn SignatureAlgorithm>, Error> {
    match uri {
        algorithm::RSA_SHA1 => Ok(Box::new(RsaPkcs1v15 {
            uri: algorithm::RSA_SHA1,
            hash: HashType::Sha1,
        })),
        algorithm::RSA_SHA256 => Ok(Box::new(RsaPkcs1v15 {
            uri: algorithm::RSA_SHA256,
            hash: HashType::Sha256,
        })),
        _ => Err(Error::UnsupportedAlgorithm(format!("signature algorithm: {uri}"))),
    }
}

#[derive(Debug, Clone, Copy)]
enum HashType {
    Sha1,
    Sha256,
}

struct RsaPkcs1v15 {
    uri: &'static str,
    hash: HashType,
}

impl RsaPkcs1v15 {
    fn sign_with_key(&self, private_key: &rsa::RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        use signature::Signer;
        macro_rules! do_sign {
            ($hasher:ty) => {{
                let sk = rsa::pkcs1v15::SigningKey::<$hasher>::new(private_key.clone());
                sk.try_sign(data)
                    .map(|sig| sig.to_vec())
                    .map_err(|e| Error::Signing(format!("RSA PKCS#1 v1.5: {e}")))
            }};
        }
        match self.hash {
            HashType::Sha1 => do_sign!(sha1::Sha1),
            HashType::Sha256 => do_sign!(sha2::Sha256),
        }
    }

    fn verify_with_key(
        &self,
        public_key: &rsa::RsaPublicKey,
        data: &[u8],
        sig_bytes: &[u8],
    ) -> Result<bool, Error> {
        use signature::Verifier;
        let sig = rsa::pkcs1v15::Signature::try_from(sig_bytes)
            .map_err(|e| Error::Signing(format!("invalid RSA signature: {e}")))?;
        macro_rules! do_verify {
            ($hasher:ty) => {{
                let vk = rsa::pkcs1v15::VerifyingKey::<$hasher>::new(public_key.clone());
                Ok(vk.verify(data, &sig).is_ok())
            }};
        }
        match self.hash {
            HashType::Sha1 => do_verify!(sha1::Sha1),
            HashType::Sha256 => do_verify!(sha2::Sha256),
        }
    }
}

impl SignatureAlgorithm for RsaPkcs1v15 {
    fn uri(&self) -> &'static str {
        self.uri
    }

    fn sign(&self, key: &SigningKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        match key {
            SigningKey::Rsa(pk) => self.sign_with_key(pk, data),
            SigningKey::RsaPublic(_) => Err(Error::Signing("RSA private key required".into())),
        }
    }

    fn verify(&self, key: &SigningKey, data: &[u8], sig_bytes: &[u8]) -> Result<bool, Error> {
        self.verify_with_key(&key.public_key(), data, sig_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use rsa::pkcs8::DecodePrivateKey;

    // `openssl dgst -sha1 -sign rsa-2048-key.pem` over "hello".
    const HELLO_RSA_SHA1: &str = "u4pxpR3N+/UQqaVyHkccs8X0wmU1IGjZgMehompeL6JledXPPcH53ig4nWIhoZ/bgfMtD1J7e6h0+P6AmQ1Cwuxn48HytN1SSUiOrFOUAt95zKqRqAfOyq+vbz1AR4dtLbetI6eeMM1yni9MJlsYo5+GVyFQfyBVsl2lwZiDLMrfWRqfvgp797xx/0ocx2NBqfANwW4YhDapQ6/BxhErMLIj/EYhK3+iyoH3bWVBT4X0ioVwVBNtOx+6wKNgj+Xy0E3wgX17FXZEN80wFSWXyQSpNm4XJQVwOuF/z3zAWvWzB/eTemqC+CE7qVyH/QFKP5RJ/emLP2C0b9oPBQJzAw==";

    fn test_key() -> SigningKey {
        let pem = std::fs::read_to_string("../../test-data/keys/rsa-2048-key.pem").unwrap();
        SigningKey::Rsa(rsa::RsaPrivateKey::from_pkcs8_pem(&pem).unwrap())
    }

    #[test]
    fn test_rsa_sha1_matches_openssl() {
        let alg = from_uri(algorithm::RSA_SHA1).unwrap();
        let sig = alg.sign(&test_key(), b"hello").unwrap();
        let expected = base64::engine::general_purpose::STANDARD
            .decode(HELLO_RSA_SHA1)
            .unwrap();
        assert_eq!(sig, expected);
    }

    #[test]
    fn test_rsa_sha256_sign_verify() {
        let key = test_key();
        let alg = from_uri(algorithm::RSA_SHA256).unwrap();
        assert_eq!(alg.uri(), algorithm::RSA_SHA256);
        let sig = alg.sign(&key, b"payload").unwrap();
        assert_eq!(sig.len(), 256);

        let public = SigningKey::RsaPublic(key.public_key());
        assert!(alg.verify(&public, b"payload", &sig).unwrap());
        assert!(!alg.verify(&public, b"tampered", &sig).unwrap());
    }

    #[test]
    fn test_sign_requires_private_key() {
        let public = SigningKey::RsaPublic(test_key().public_key());
        assert!(!public.has_private_key());
        let err = from_uri(algorithm::RSA_SHA1)
            .unwrap()
            .sign(&public, b"hello")
            .unwrap_err();
        assert!(matches!(err, Error::Signing(_)), "got {err:?}");
    }

    #[test]
    fn test_unknown_signature_uri() {
        let err = from_uri("http://www.w3.org/2000/09/xmldsig#dsa-sha1").err().unwrap();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }
}
