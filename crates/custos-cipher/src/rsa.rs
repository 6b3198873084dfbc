//! RSA-OAEP wrapping for ceremony transport
//!
//! Custodian components travel to the ceremony host under RSA-OAEP; the
//! public key is exchanged as base64 PKCS#1 with a SHA-256 fingerprint for
//! out-of-band verification.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::errors::Result;

/// Default modulus size for generated ceremony key pairs.
pub const DEFAULT_KEY_BITS: usize = 4096;

/// Generates an RSA key pair at the ceremony default size.
pub fn generate_keypair() -> Result<RsaPrivateKey> {
    generate_keypair_with_bits(DEFAULT_KEY_BITS)
}

/// Generates an RSA key pair with an explicit modulus size.
pub fn generate_keypair_with_bits(bits: usize) -> Result<RsaPrivateKey> {
    let mut rng = OsRng;
    Ok(RsaPrivateKey::new(&mut rng, bits)?)
}

/// Base64 SHA-256 fingerprint of the PKCS#1 encoding of the public key.
pub fn eval_hash(public_key: &RsaPublicKey) -> Result<String> {
    let der = public_key.to_pkcs1_der()?;
    let digest = Sha256::digest(der.as_bytes());
    Ok(BASE64.encode(digest))
}

/// Encodes a public key as base64 PKCS#1 DER.
pub fn encode(public_key: &RsaPublicKey) -> Result<String> {
    let der = public_key.to_pkcs1_der()?;
    Ok(BASE64.encode(der.as_bytes()))
}

/// Decodes a base64 PKCS#1 DER public key.
pub fn decode(encoded: &str) -> Result<RsaPublicKey> {
    let der = BASE64.decode(encoded)?;
    Ok(RsaPublicKey::from_pkcs1_der(&der)?)
}

/// Encrypts with RSA-OAEP over SHA-256.
pub fn encrypt(public_key: &RsaPublicKey, plain: &[u8]) -> Result<Vec<u8>> {
    let mut rng = OsRng;
    Ok(public_key.encrypt(&mut rng, Oaep::new::<Sha256>(), plain)?)
}

/// Decrypts with RSA-OAEP over SHA-256.
pub fn decrypt(private_key: &RsaPrivateKey, cipher_bytes: &[u8]) -> Result<Vec<u8>> {
    Ok(private_key.decrypt(Oaep::new::<Sha256>(), cipher_bytes)?)
}
