//! OpenPGP armored-message wrapping
//!
//! Ceremony records and custodian payloads are exchanged as armored PGP
//! messages between parties that already operate PGP keys. Keys are held
//! in armored form and only parsed at the point of use.

use pgp::composed::{Deserializable, Message, SignedPublicKey, SignedSecretKey};
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::types::KeyTrait;
use rand::rngs::OsRng;

use crate::errors::{CipherError, Result};

/// An armored OpenPGP key pair.
///
/// Either half may be empty when only one direction is needed (encrypting
/// hosts hold the public key only).
#[derive(Debug, Clone, Default)]
pub struct ArmoredKeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl ArmoredKeyPair {
    /// Lowercase hex fingerprint of the armored public key.
    pub fn fingerprint(&self) -> Result<String> {
        let (key, _) = SignedPublicKey::from_string(&self.public_key)?;
        Ok(hex::encode(key.fingerprint()))
    }

    /// Encrypts `plain` to the public key and returns an armored message.
    ///
    /// Targets the first encryption-capable subkey, falling back to the
    /// primary key for bare keys without subkeys.
    pub fn encrypt(&self, plain: &[u8]) -> Result<String> {
        let (key, _) = SignedPublicKey::from_string(&self.public_key)?;
        let message = Message::new_literal_bytes("", plain);
        let mut rng = OsRng;

        let encrypted = match key
            .public_subkeys
            .iter()
            .find(|subkey| subkey.is_encryption_key())
        {
            Some(subkey) => {
                message.encrypt_to_keys(&mut rng, SymmetricKeyAlgorithm::AES256, &[subkey])?
            }
            None => message.encrypt_to_keys(&mut rng, SymmetricKeyAlgorithm::AES256, &[&key])?,
        };

        Ok(encrypted.to_armored_string(None)?)
    }

    /// Decrypts an armored message with the private key.
    ///
    /// `passphrase` unlocks a protected private key; pass `None` for
    /// unprotected keys.
    pub fn decrypt(&self, armored: &str, passphrase: Option<&str>) -> Result<Vec<u8>> {
        let (secret_key, _) = SignedSecretKey::from_string(&self.private_key)?;
        let (message, _) = Message::from_string(armored)?;

        let password = passphrase.unwrap_or_default().to_owned();
        let (mut decrypter, _) = message.decrypt(move || password, &[&secret_key])?;
        let decrypted = decrypter.next().ok_or(CipherError::EmptyMessage)??;
        decrypted.get_content()?.ok_or(CipherError::EmptyMessage)
    }
}
