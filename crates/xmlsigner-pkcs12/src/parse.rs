#![forbid(unsafe_code)]

//! BER decoding of the PFX structure (RFC 7292).
//!
//! PKCS#12 files are BER, not strict DER, so everything goes through
//! `yasna::parse_ber`.

use xmlsigner_core::Error;
use yasna::models::ObjectIdentifier;
use yasna::{ASN1Error, ASN1ErrorKind, BERReader, BERReaderSeq, Tag};

use crate::kdf::{self, HashKind, Purpose};
use crate::Pkcs12Bundle;

// PKCS#7 content types
const OID_DATA: &[u64] = &[1, 2, 840, 113549, 1, 7, 1];
const OID_ENCRYPTED_DATA: &[u64] = &[1, 2, 840, 113549, 1, 7, 6];

// PKCS#12 bag types
const OID_SHROUDED_KEY_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 2];
const OID_CERT_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 3];
const OID_X509_CERT: &[u64] = &[1, 2, 840, 113549, 1, 9, 22, 1];

// Password-based encryption
const OID_PBE_SHA1_3DES: &[u64] = &[1, 2, 840, 113549, 1, 12, 1, 3];
const OID_PBES2: &[u64] = &[1, 2, 840, 113549, 1, 5, 13];
const OID_PBKDF2: &[u64] = &[1, 2, 840, 113549, 1, 5, 12];
const OID_AES_256_CBC: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 42];

// Hashes and PRFs
const OID_SHA1: &[u64] = &[1, 3, 14, 3, 2, 26];
const OID_SHA256: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 1];
const OID_HMAC_SHA1: &[u64] = &[1, 2, 840, 113549, 2, 7];
const OID_HMAC_SHA256: &[u64] = &[1, 2, 840, 113549, 2, 9];

fn is(actual: &ObjectIdentifier, expected: &[u64]) -> bool {
    actual.components().as_slice() == expected
}

fn invalid() -> ASN1Error {
    ASN1Error::new(ASN1ErrorKind::Invalid)
}

/// How a bag or content block was encrypted.
#[derive(Debug)]
enum Encryption {
    LegacyTripleDes {
        salt: Vec<u8>,
        iterations: u32,
    },
    Pbes2 {
        prf: HashKind,
        salt: Vec<u8>,
        iterations: u32,
        iv: Vec<u8>,
    },
}

impl Encryption {
    fn decrypt(&self, ciphertext: &[u8], password: &str) -> Result<Vec<u8>, Error> {
        match self {
            Self::LegacyTripleDes { salt, iterations } => kdf::decrypt_pbe_sha1_3des(
                ciphertext,
                &kdf::bmp_password(password),
                salt,
                *iterations,
            ),
            Self::Pbes2 {
                prf,
                salt,
                iterations,
                iv,
            } => kdf::decrypt_pbes2_aes256(ciphertext, password, *prf, salt, *iterations, iv),
        }
    }
}

struct MacData {
    hash: HashKind,
    digest: Vec<u8>,
    salt: Vec<u8>,
    iterations: u32,
}

impl MacData {
    fn verify(&self, auth_safe: &[u8], password: &str) -> Result<(), Error> {
        let key = kdf::derive(
            self.hash,
            Purpose::Mac,
            &kdf::bmp_password(password),
            &self.salt,
            self.iterations,
            self.hash.output_len(),
        );
        if kdf::hmac(self.hash, &key, auth_safe)? != self.digest {
            return Err(Error::KeyLoad(
                "PKCS#12 MAC verification failed (wrong passphrase?)".into(),
            ));
        }
        Ok(())
    }
}

enum Content {
    Plain(Vec<u8>),
    Encrypted(Encryption, Vec<u8>),
}

enum Bag {
    ShroudedKey(Encryption, Vec<u8>),
    Certificate(Vec<u8>),
    Other,
}

pub(crate) fn read_pfx(data: &[u8], password: &str) -> Result<Pkcs12Bundle, Error> {
    let (auth_safe, mac) = yasna::parse_ber(data, |r| {
        r.read_sequence(|r| {
            if r.next().read_u32()? != 3 {
                return Err(invalid());
            }
            let auth_safe = read_data_content_info(r.next())?;
            let mac = r.read_optional(read_mac_data)?;
            Ok((auth_safe, mac))
        })
    })
    .map_err(|e| Error::KeyLoad(format!("not a PKCS#12 keystore: {e}")))?;

    match mac {
        Some(mac) => mac.verify(&auth_safe, password)?,
        None => tracing::debug!("PKCS#12 keystore has no MAC"),
    }

    let contents = yasna::parse_ber(&auth_safe, |r| r.collect_sequence_of(read_content_info))
        .map_err(|e| Error::KeyLoad(format!("malformed PKCS#12 authenticated safe: {e}")))?;

    let mut bundle = Pkcs12Bundle::default();
    for content in contents {
        let bags_der = match content {
            Content::Plain(der) => der,
            Content::Encrypted(encryption, ciphertext) => encryption.decrypt(&ciphertext, password)?,
        };
        let bags = yasna::parse_ber(&bags_der, |r| r.collect_sequence_of(read_safe_bag))
            .map_err(|e| Error::KeyLoad(format!("malformed PKCS#12 safe contents: {e}")))?;

        for bag in bags {
            match bag {
                Bag::ShroudedKey(encryption, ciphertext) => {
                    bundle.private_keys.push(encryption.decrypt(&ciphertext, password)?);
                }
                Bag::Certificate(der) => bundle.certificates.push(der),
                Bag::Other => {}
            }
        }
    }
    Ok(bundle)
}

/// The outer ContentInfo, which must be of type `data`.
fn read_data_content_info(r: BERReader) -> Result<Vec<u8>, ASN1Error> {
    r.read_sequence(|r| {
        if !is(&r.next().read_oid()?, OID_DATA) {
            return Err(invalid());
        }
        r.next().read_tagged(Tag::context(0), |r| r.read_bytes())
    })
}

fn read_content_info(r: BERReader) -> Result<Content, ASN1Error> {
    r.read_sequence(|r| {
        let content_type = r.next().read_oid()?;
        if is(&content_type, OID_DATA) {
            let der = r.next().read_tagged(Tag::context(0), |r| r.read_bytes())?;
            return Ok(Content::Plain(der));
        }
        if !is(&content_type, OID_ENCRYPTED_DATA) {
            return Err(invalid());
        }
        // EncryptedData ::= SEQUENCE { version, EncryptedContentInfo }
        r.next().read_tagged(Tag::context(0), |r| {
            r.read_sequence(|r| {
                r.next().read_u32()?;
                r.next().read_sequence(|r| {
                    r.next().read_oid()?;
                    let encryption = read_encryption(r.next())?;
                    let ciphertext = r
                        .next()
                        .read_tagged_implicit(Tag::context(0), |r| r.read_bytes())?;
                    Ok(Content::Encrypted(encryption, ciphertext))
                })
            })
        })
    })
}

fn read_safe_bag(r: BERReader) -> Result<Bag, ASN1Error> {
    r.read_sequence(|r| {
        let bag_type = r.next().read_oid()?;
        let bag = if is(&bag_type, OID_SHROUDED_KEY_BAG) {
            // EncryptedPrivateKeyInfo
            r.next().read_tagged(Tag::context(0), |r| {
                r.read_sequence(|r| {
                    let encryption = read_encryption(r.next())?;
                    let ciphertext = r.next().read_bytes()?;
                    Ok(Bag::ShroudedKey(encryption, ciphertext))
                })
            })?
        } else if is(&bag_type, OID_CERT_BAG) {
            r.next().read_tagged(Tag::context(0), |r| {
                r.read_sequence(|r| {
                    if !is(&r.next().read_oid()?, OID_X509_CERT) {
                        return Err(invalid());
                    }
                    let der = r.next().read_tagged(Tag::context(0), |r| r.read_bytes())?;
                    Ok(Bag::Certificate(der))
                })
            })?
        } else {
            r.next().read_tagged(Tag::context(0), |r| r.read_der())?;
            Bag::Other
        };
        skip_bag_attributes(r)?;
        Ok(bag)
    })
}

/// friendlyName, localKeyId and friends.
fn skip_bag_attributes(r: &mut BERReaderSeq) -> Result<(), ASN1Error> {
    r.read_optional(|r| {
        r.read_set_of(|r| {
            r.read_sequence(|r| {
                r.next().read_oid()?;
                r.next().read_set_of(|r| r.read_der().map(drop))
            })
        })
    })?;
    Ok(())
}

fn read_encryption(r: BERReader) -> Result<Encryption, ASN1Error> {
    r.read_sequence(|r| {
        let algorithm = r.next().read_oid()?;
        if is(&algorithm, OID_PBE_SHA1_3DES) {
            r.next().read_sequence(|r| {
                let salt = r.next().read_bytes()?;
                let iterations = r.next().read_u32()?;
                Ok(Encryption::LegacyTripleDes { salt, iterations })
            })
        } else if is(&algorithm, OID_PBES2) {
            r.next().read_sequence(|r| {
                let (salt, iterations, prf) = r.next().read_sequence(read_pbkdf2)?;
                let iv = r.next().read_sequence(|r| {
                    if !is(&r.next().read_oid()?, OID_AES_256_CBC) {
                        return Err(invalid());
                    }
                    r.next().read_bytes()
                })?;
                Ok(Encryption::Pbes2 {
                    prf,
                    salt,
                    iterations,
                    iv,
                })
            })
        } else {
            Err(invalid())
        }
    })
}

/// PBKDF2 AlgorithmIdentifier. The parameters are
/// `SEQUENCE { salt, iterationCount, keyLength OPTIONAL, prf DEFAULT hmacWithSHA1 }`.
fn read_pbkdf2(r: &mut BERReaderSeq) -> Result<(Vec<u8>, u32, HashKind), ASN1Error> {
    if !is(&r.next().read_oid()?, OID_PBKDF2) {
        return Err(invalid());
    }
    r.next().read_sequence(|r| {
        let salt = r.next().read_bytes()?;
        let iterations = r.next().read_u32()?;
        let mut prf = HashKind::Sha1;
        // keyLength is an INTEGER, prf a SEQUENCE; either may be absent.
        for _ in 0..2 {
            match r.read_optional(|r| r.read_der())? {
                Some(der) if der.first() == Some(&0x30) => prf = read_prf(&der)?,
                Some(_) => {}
                None => break,
            }
        }
        Ok((salt, iterations, prf))
    })
}

fn read_prf(der: &[u8]) -> Result<HashKind, ASN1Error> {
    yasna::parse_der(der, |r| {
        r.read_sequence(|r| {
            let algorithm = r.next().read_oid()?;
            r.read_optional(|r| r.read_null())?;
            if is(&algorithm, OID_HMAC_SHA256) {
                Ok(HashKind::Sha256)
            } else if is(&algorithm, OID_HMAC_SHA1) {
                Ok(HashKind::Sha1)
            } else {
                Err(invalid())
            }
        })
    })
}

fn read_mac_data(r: BERReader) -> Result<MacData, ASN1Error> {
    r.read_sequence(|r| {
        let (hash, digest) = r.next().read_sequence(|r| {
            let hash = r.next().read_sequence(|r| {
                let algorithm = r.next().read_oid()?;
                r.read_optional(|r| r.read_null())?;
                if is(&algorithm, OID_SHA256) {
                    Ok(HashKind::Sha256)
                } else if is(&algorithm, OID_SHA1) {
                    Ok(HashKind::Sha1)
                } else {
                    Err(invalid())
                }
            })?;
            Ok((hash, r.next().read_bytes()?))
        })?;
        let salt = r.next().read_bytes()?;
        let iterations = r.read_optional(|r| r.read_u32())?.unwrap_or(1);
        Ok(MacData {
            hash,
            digest,
            salt,
            iterations,
        })
    })
}
