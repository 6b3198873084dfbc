//! Error types for cipher operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("input is not in correct hex format")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("{cipher} key must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        cipher: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("input length {len} is not a multiple of block size {block_size}")]
    BlockLength { len: usize, block_size: usize },

    #[error("check value truncation must be between {min} and {max} bytes, got {actual}")]
    CheckValueLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("nonce must be {expected} bytes, got {actual}")]
    NonceLength { expected: usize, actual: usize },

    #[error("AEAD encryption or decryption failed")]
    Aead,

    #[error("RSA operation failed: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("PKCS#1 encoding failed: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    #[error("base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("OpenPGP operation failed: {0}")]
    Pgp(#[from] pgp::errors::Error),

    #[error("message carries no literal data")]
    EmptyMessage,
}

pub type Result<T> = std::result::Result<T, CipherError>;
