#![forbid(unsafe_code)]

//! Key derivation, MAC and content decryption for PKCS#12.
//!
//! - The PKCS#12 KDF (RFC 7292 Appendix B) derives MAC keys and the
//!   key/IV pair of the legacy `pbeWithSHAAnd3-KeyTripleDES-CBC` scheme.
//! - PBES2 uses PBKDF2 with an HMAC-SHA1 or HMAC-SHA256 PRF and
//!   AES-256-CBC, which is what OpenSSL 3 writes by default.

use cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use digest::{Digest, FixedOutputReset};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use xmlsigner_core::Error;

/// Diversifier bytes (RFC 7292 B.3).
#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum Purpose {
    Key = 1,
    Iv = 2,
    Mac = 3,
}

/// Hash function used by the PKCS#12 KDF, a MAC, or a PBKDF2 PRF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Sha1,
    Sha256,
}

impl HashKind {
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }
}

/// Encode a password as BMPString bytes: UTF-16BE plus a 0x0000
/// terminator. An empty password encodes to nothing.
pub fn bmp_password(password: &str) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let mut bmp: Vec<u8> = password.encode_utf16().flat_map(u16::to_be_bytes).collect();
    bmp.extend_from_slice(&[0, 0]);
    bmp
}

/// Derive `len` bytes with the PKCS#12 KDF.
pub fn derive(
    hash: HashKind,
    purpose: Purpose,
    bmp_password: &[u8],
    salt: &[u8],
    iterations: u32,
    len: usize,
) -> Vec<u8> {
    match hash {
        HashKind::Sha1 => derive_with::<Sha1>(purpose as u8, bmp_password, salt, iterations, len),
        HashKind::Sha256 => derive_with::<Sha256>(purpose as u8, bmp_password, salt, iterations, len),
    }
}

// Both SHA-1 and SHA-256 have a 64-byte input block.
const BLOCK_LEN: usize = 64;

fn derive_with<D: Digest + FixedOutputReset>(
    id: u8,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    len: usize,
) -> Vec<u8> {
    let diversifier = [id; BLOCK_LEN];

    let mut input = fill_blocks(salt);
    input.extend_from_slice(&fill_blocks(password));

    let mut out = Vec::with_capacity(len + <D as Digest>::output_size());
    let mut hasher = D::new();
    loop {
        Digest::update(&mut hasher, diversifier);
        Digest::update(&mut hasher, &input);
        let mut a = hasher.finalize_reset();
        for _ in 1..iterations {
            Digest::update(&mut hasher, &a);
            a = hasher.finalize_reset();
        }
        out.extend_from_slice(&a);
        if out.len() >= len {
            break;
        }

        let b = fill_blocks(&a);
        for chunk in input.chunks_mut(BLOCK_LEN) {
            add_with_carry(chunk, &b);
        }
    }
    out.truncate(len);
    out
}

/// Repeat `data` up to the next multiple of the block length.
fn fill_blocks(data: &[u8]) -> Vec<u8> {
    let len = data.len().div_ceil(BLOCK_LEN) * BLOCK_LEN;
    data.iter().copied().cycle().take(len).collect()
}

/// `block = (block + b + 1) mod 2^(8 * BLOCK_LEN)`
fn add_with_carry(block: &mut [u8], b: &[u8]) {
    let mut carry = 1u16;
    for (x, y) in block.iter_mut().zip(b).rev() {
        let sum = u16::from(*x) + u16::from(*y) + carry;
        *x = sum as u8;
        carry = sum >> 8;
    }
}

/// HMAC over `data` with the given hash.
pub fn hmac(hash: HashKind, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    fn run<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut mac = <M as Mac>::new_from_slice(key)
            .map_err(|e| Error::KeyLoad(format!("PKCS#12 MAC key: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
    match hash {
        HashKind::Sha1 => run::<Hmac<Sha1>>(key, data),
        HashKind::Sha256 => run::<Hmac<Sha256>>(key, data),
    }
}

/// Decrypt with `pbeWithSHAAnd3-KeyTripleDES-CBC`.
pub fn decrypt_pbe_sha1_3des(
    ciphertext: &[u8],
    bmp_password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Vec<u8>, Error> {
    let key = derive(HashKind::Sha1, Purpose::Key, bmp_password, salt, iterations, 24);
    let iv = derive(HashKind::Sha1, Purpose::Iv, bmp_password, salt, iterations, 8);
    cbc_decrypt::<cbc::Decryptor<des::TdesEde3>>(&key, &iv, ciphertext, "3DES-CBC")
}

/// Decrypt with PBES2 (PBKDF2 + AES-256-CBC).
pub fn decrypt_pbes2_aes256(
    ciphertext: &[u8],
    password: &str,
    prf: HashKind,
    salt: &[u8],
    iterations: u32,
    iv: &[u8],
) -> Result<Vec<u8>, Error> {
    let mut key = [0u8; 32];
    match prf {
        HashKind::Sha1 => pbkdf2::pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, iterations, &mut key),
        HashKind::Sha256 => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key)
        }
    }
    cbc_decrypt::<cbc::Decryptor<aes::Aes256>>(&key, iv, ciphertext, "AES-256-CBC")
}

fn cbc_decrypt<C: KeyIvInit + BlockDecryptMut>(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    name: &str,
) -> Result<Vec<u8>, Error> {
    let decryptor = C::new_from_slices(key, iv)
        .map_err(|e| Error::KeyLoad(format!("{name} init failed: {e}")))?;
    let mut buf = ciphertext.to_vec();
    let plaintext = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|e| Error::KeyLoad(format!("{name} decryption failed: {e}")))?;
    Ok(plaintext.to_vec())
}
