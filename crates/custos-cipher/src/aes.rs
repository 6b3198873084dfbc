//! AES-GCM wrapping for ceremony payloads
//!
//! Stateless authenticated encryption with a fresh random nonce per call.
//! The nonce can be prefixed to the ciphertext for single-blob transport.

use aes::cipher::consts::U12;
use aes::Aes192;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use zeroize::Zeroizing;

use crate::errors::{CipherError, Result};

/// AES-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

type Aes192Gcm = AesGcm<Aes192, U12>;

enum GcmKind {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

/// AES-GCM cipher keeping the raw key bytes (zeroized on drop).
pub struct AeadCipher {
    kind: GcmKind,
    key_bytes: Zeroizing<Vec<u8>>,
}

impl AeadCipher {
    /// Builds an AES-GCM cipher from 16, 24 or 32 raw key bytes.
    pub fn new(key_bytes: &[u8]) -> Result<Self> {
        let invalid = |actual| CipherError::InvalidKeyLength {
            cipher: "AES",
            expected: "16, 24 or 32",
            actual,
        };

        let kind = match key_bytes.len() {
            16 => GcmKind::Aes128(
                Aes128Gcm::new_from_slice(key_bytes).map_err(|_| invalid(key_bytes.len()))?,
            ),
            24 => GcmKind::Aes192(
                Aes192Gcm::new_from_slice(key_bytes).map_err(|_| invalid(key_bytes.len()))?,
            ),
            32 => GcmKind::Aes256(
                Aes256Gcm::new_from_slice(key_bytes).map_err(|_| invalid(key_bytes.len()))?,
            ),
            other => return Err(invalid(other)),
        };

        Ok(Self {
            kind,
            key_bytes: Zeroizing::new(key_bytes.to_vec()),
        })
    }

    /// Raw key bytes.
    pub fn key_bytes(&self) -> &[u8] {
        &self.key_bytes
    }

    /// Encrypts `plain` under a fresh random nonce.
    ///
    /// Returns the ciphertext and the nonce; with `prefix_nonce` the nonce
    /// is prepended to the ciphertext so the pair travels as one blob.
    pub fn encrypt(&self, plain: &[u8], prefix_nonce: bool) -> Result<(Vec<u8>, Vec<u8>)> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let cipher_bytes = match &self.kind {
            GcmKind::Aes128(cipher) => cipher.encrypt(&nonce, plain),
            GcmKind::Aes192(cipher) => cipher.encrypt(&nonce, plain),
            GcmKind::Aes256(cipher) => cipher.encrypt(&nonce, plain),
        }
        .map_err(|_| CipherError::Aead)?;

        let cipher_bytes = if prefix_nonce {
            let mut out = nonce.to_vec();
            out.extend_from_slice(&cipher_bytes);
            out
        } else {
            cipher_bytes
        };

        Ok((cipher_bytes, nonce.to_vec()))
    }

    /// Decrypts `cipher_bytes`, taking the nonce from the argument or, when
    /// `None`, from the first 12 bytes of the ciphertext.
    pub fn decrypt(&self, cipher_bytes: &[u8], nonce: Option<&[u8]>) -> Result<Vec<u8>> {
        let (nonce_bytes, payload) = match nonce {
            Some(nonce_bytes) => (nonce_bytes, cipher_bytes),
            None => {
                if cipher_bytes.len() < NONCE_SIZE {
                    return Err(CipherError::NonceLength {
                        expected: NONCE_SIZE,
                        actual: cipher_bytes.len(),
                    });
                }
                cipher_bytes.split_at(NONCE_SIZE)
            }
        };
        if nonce_bytes.len() != NONCE_SIZE {
            return Err(CipherError::NonceLength {
                expected: NONCE_SIZE,
                actual: nonce_bytes.len(),
            });
        }

        let nonce = Nonce::<U12>::from_slice(nonce_bytes);
        match &self.kind {
            GcmKind::Aes128(cipher) => cipher.decrypt(nonce, payload),
            GcmKind::Aes192(cipher) => cipher.decrypt(nonce, payload),
            GcmKind::Aes256(cipher) => cipher.decrypt(nonce, payload),
        }
        .map_err(|_| CipherError::Aead)
    }
}
