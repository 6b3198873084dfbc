//! DES and Triple-DES check-value cipher
//!
//! Payment-ceremony conventions: raw ECB over whole blocks, and key check
//! values derived by encrypting an all-zero reference block and truncating
//! the result. A 16-byte 3DES key is expanded to 24 bytes by repeating the
//! first 8 bytes as the third sub-key (two-key 3DES).

use des::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde3};
use zeroize::Zeroizing;

use crate::errors::{CipherError, Result};

/// DES block size in bytes.
pub const BLOCK_SIZE: usize = 8;
/// Single-DES raw key length in bytes.
pub const DES_KEY_LEN: usize = 8;
/// Triple-DES expanded key length in bytes.
pub const TDES_KEY_LEN: usize = 24;

/// Default check-value truncation in bytes.
pub const CHECK_VALUE_DEFAULT_BYTES: usize = 3;
/// Minimum check-value truncation accepted during verification.
pub const CHECK_VALUE_MIN_BYTES: usize = 2;
/// Maximum check-value truncation (one full block).
pub const CHECK_VALUE_MAX_BYTES: usize = BLOCK_SIZE;

/// Reference plaintext encrypted to derive a key check value.
const CHECK_VALUE_PLAINTEXT: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

#[derive(Debug)]
enum BlockKind {
    Single(Des),
    Triple(TdesEde3),
}

/// A DES or 3DES block cipher together with its raw key bytes.
///
/// Key bytes are kept because ceremony flows need them back out (XOR
/// combination, key export records); they are zeroized on drop.
#[derive(Debug)]
pub struct BlockCipher {
    kind: BlockKind,
    key_bytes: Zeroizing<Vec<u8>>,
}

impl BlockCipher {
    /// Builds a single-DES cipher from 8 raw key bytes.
    pub fn from_des_key_bytes(key_bytes: &[u8]) -> Result<Self> {
        if key_bytes.len() != DES_KEY_LEN {
            return Err(CipherError::InvalidKeyLength {
                cipher: "DES",
                expected: "8",
                actual: key_bytes.len(),
            });
        }
        let block = Des::new_from_slice(key_bytes).map_err(|_| CipherError::InvalidKeyLength {
            cipher: "DES",
            expected: "8",
            actual: key_bytes.len(),
        })?;
        Ok(Self {
            kind: BlockKind::Single(block),
            key_bytes: Zeroizing::new(key_bytes.to_vec()),
        })
    }

    /// Builds a single-DES cipher from a hex key string.
    pub fn from_des_key_hex(key: &str) -> Result<Self> {
        let key_bytes = Zeroizing::new(hex::decode(key)?);
        Self::from_des_key_bytes(&key_bytes)
    }

    /// Builds a 3DES cipher from 16 or 24 raw key bytes.
    ///
    /// A 16-byte key is expanded to 24 bytes by reusing its first 8 bytes
    /// as the third sub-key; [`key_bytes`](Self::key_bytes) reports the
    /// expanded form.
    pub fn from_tdes_key_bytes(key_bytes: &[u8]) -> Result<Self> {
        if key_bytes.len() != 16 && key_bytes.len() != TDES_KEY_LEN {
            return Err(CipherError::InvalidKeyLength {
                cipher: "3DES",
                expected: "16 or 24",
                actual: key_bytes.len(),
            });
        }

        let mut expanded = Zeroizing::new(key_bytes.to_vec());
        if expanded.len() == 16 {
            let head = expanded[..DES_KEY_LEN].to_vec();
            expanded.extend_from_slice(&head);
        }

        let block =
            TdesEde3::new_from_slice(&expanded).map_err(|_| CipherError::InvalidKeyLength {
                cipher: "3DES",
                expected: "16 or 24",
                actual: key_bytes.len(),
            })?;
        Ok(Self {
            kind: BlockKind::Triple(block),
            key_bytes: expanded,
        })
    }

    /// Builds a 3DES cipher from a hex key string.
    pub fn from_tdes_key_hex(key: &str) -> Result<Self> {
        let key_bytes = Zeroizing::new(hex::decode(key)?);
        Self::from_tdes_key_bytes(&key_bytes)
    }

    /// Raw key bytes (expanded 24-byte form for 3DES).
    pub fn key_bytes(&self) -> &[u8] {
        &self.key_bytes
    }

    /// Lowercase hex encoding of the raw key bytes.
    pub fn key_hex(&self) -> String {
        hex::encode(self.key_bytes.as_slice())
    }

    /// Encrypts whole blocks in ECB mode.
    ///
    /// The input length must be a multiple of the 8-byte block size; zero
    /// blocks are allowed and produce empty output.
    pub fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>> {
        if plain.len() % BLOCK_SIZE != 0 {
            return Err(CipherError::BlockLength {
                len: plain.len(),
                block_size: BLOCK_SIZE,
            });
        }

        let mut out = Vec::with_capacity(plain.len());
        for chunk in plain.chunks_exact(BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            match &self.kind {
                BlockKind::Single(cipher) => cipher.encrypt_block(&mut block),
                BlockKind::Triple(cipher) => cipher.encrypt_block(&mut block),
            }
            out.extend_from_slice(&block);
        }
        Ok(out)
    }

    /// Hex front end for [`encrypt`](Self::encrypt).
    pub fn encrypt_hex(&self, plaintext: &str) -> Result<Vec<u8>> {
        let plain = hex::decode(plaintext)?;
        self.encrypt(&plain)
    }

    /// Decrypts whole blocks in ECB mode.
    pub fn decrypt(&self, cipher_bytes: &[u8]) -> Result<Vec<u8>> {
        if cipher_bytes.len() % BLOCK_SIZE != 0 {
            return Err(CipherError::BlockLength {
                len: cipher_bytes.len(),
                block_size: BLOCK_SIZE,
            });
        }

        let mut out = Vec::with_capacity(cipher_bytes.len());
        for chunk in cipher_bytes.chunks_exact(BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            match &self.kind {
                BlockKind::Single(cipher) => cipher.decrypt_block(&mut block),
                BlockKind::Triple(cipher) => cipher.decrypt_block(&mut block),
            }
            out.extend_from_slice(&block);
        }
        Ok(out)
    }

    /// Hex front end for [`decrypt`](Self::decrypt).
    pub fn decrypt_hex(&self, ciphertext: &str) -> Result<Vec<u8>> {
        let cipher_bytes = hex::decode(ciphertext)?;
        self.decrypt(&cipher_bytes)
    }

    /// Key check value at the default 3-byte truncation, lowercase hex.
    pub fn check_value(&self) -> String {
        let cipher_block = self.encrypt_reference_block();
        hex::encode(&cipher_block[..CHECK_VALUE_DEFAULT_BYTES])
    }

    /// Key check value truncated to `bytes` bytes (1..=8), lowercase hex.
    pub fn check_value_truncated(&self, bytes: usize) -> Result<String> {
        if !(1..=CHECK_VALUE_MAX_BYTES).contains(&bytes) {
            return Err(CipherError::CheckValueLength {
                min: 1,
                max: CHECK_VALUE_MAX_BYTES,
                actual: bytes,
            });
        }
        let cipher_block = self.encrypt_reference_block();
        Ok(hex::encode(&cipher_block[..bytes]))
    }

    /// Verifies a hex check value against this key.
    ///
    /// The truncation length is inferred from the candidate's length;
    /// candidates outside 2..=8 bytes never verify, and the comparison is
    /// case-insensitive. Truncations below 3 bytes materially weaken the
    /// integrity guarantee and should only be accepted from trusted
    /// ceremony documents.
    pub fn verify_check_value(&self, candidate: &str) -> bool {
        let bytes = candidate.len() / 2;
        if !(CHECK_VALUE_MIN_BYTES..=CHECK_VALUE_MAX_BYTES).contains(&bytes) {
            return false;
        }
        let cipher_block = self.encrypt_reference_block();
        hex::encode(&cipher_block[..bytes]).eq_ignore_ascii_case(candidate)
    }

    fn encrypt_reference_block(&self) -> [u8; BLOCK_SIZE] {
        let mut block = GenericArray::clone_from_slice(&CHECK_VALUE_PLAINTEXT);
        match &self.kind {
            BlockKind::Single(cipher) => cipher.encrypt_block(&mut block),
            BlockKind::Triple(cipher) => cipher.encrypt_block(&mut block),
        }
        block.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn des_cipher(key: &str) -> BlockCipher {
        BlockCipher::from_des_key_hex(key).unwrap()
    }

    fn tdes_cipher(key: &str) -> BlockCipher {
        BlockCipher::from_tdes_key_hex(key).unwrap()
    }

    #[test]
    fn des_encryption_vectors() {
        let cipher = des_cipher("0123456789ABCDEF");

        for (plain, expected) in [
            ("", ""),
            ("4123456789012345", "B76ADDCE71CCC6BE"),
            ("41234567890123454123456789012345", "B76ADDCE71CCC6BEB76ADDCE71CCC6BE"),
        ] {
            let out = cipher.encrypt_hex(plain).unwrap();
            assert!(hex::encode(out).eq_ignore_ascii_case(expected));
        }

        assert!(matches!(
            cipher.encrypt_hex("1234"),
            Err(CipherError::BlockLength { .. })
        ));
    }

    #[test]
    fn tdes_encryption_vectors() {
        let cipher = tdes_cipher("A1FA4BF45ECDA0C1198CF971365C148CA1FA4BF45ECDA0C1");

        for (plain, expected) in [
            ("", ""),
            ("4123456789012345", "26ECB8D84DDFF9E3"),
            ("41234567890123454123456789012345", "26ECB8D84DDFF9E326ECB8D84DDFF9E3"),
        ] {
            let out = cipher.encrypt_hex(plain).unwrap();
            assert!(hex::encode(out).eq_ignore_ascii_case(expected));
        }
    }

    #[test]
    fn des_decryption_vectors() {
        let cipher = des_cipher("0123456789ABCDEF");

        for (ciphertext, expected) in [
            ("", ""),
            ("B76ADDCE71CCC6BE", "4123456789012345"),
            ("B76ADDCE71CCC6BEB76ADDCE71CCC6BE", "41234567890123454123456789012345"),
        ] {
            let out = cipher.decrypt_hex(ciphertext).unwrap();
            assert!(hex::encode(out).eq_ignore_ascii_case(expected));
        }
    }

    #[test]
    fn tdes_decryption_vectors() {
        let cipher = tdes_cipher("A1FA4BF45ECDA0C1198CF971365C148CA1FA4BF45ECDA0C1");

        for (ciphertext, expected) in [
            ("26ECB8D84DDFF9E3", "4123456789012345"),
            ("26ECB8D84DDFF9E326ECB8D84DDFF9E3", "41234567890123454123456789012345"),
        ] {
            let out = cipher.decrypt_hex(ciphertext).unwrap();
            assert!(hex::encode(out).eq_ignore_ascii_case(expected));
        }
    }

    #[test]
    fn des_check_value() {
        let cipher = des_cipher("0123456789ABCDEF");

        assert!(cipher.check_value().eq_ignore_ascii_case("D5D44F"));
        assert!(cipher.verify_check_value("D5D44F"));
        assert!(!cipher.verify_check_value("D5D44E"));
    }

    #[test]
    fn tdes_check_value_truncations() {
        let cipher = tdes_cipher("F94AC55104B0E5532D0A61D2D2C6C655F94AC55104B0E553");

        assert!(cipher.check_value().eq_ignore_ascii_case("6FAAD3"));
        assert!(cipher.verify_check_value("6FAAD3"));
        // 2-byte truncation is the accepted minimum.
        assert!(cipher.verify_check_value("6FAA"));
        assert!(!cipher.verify_check_value("6FAAD4"));
        // 1 byte is below the minimum, 24 bytes above the block size.
        assert!(!cipher.verify_check_value("6F"));
        assert!(!cipher.verify_check_value("F94AC55104B0E5532D0A61D2D2C6C655F94AC55104B0E553"));
    }

    #[test]
    fn check_value_case_insensitive() {
        let cipher = des_cipher("0123456789ABCDEF");
        assert!(cipher.verify_check_value("d5d44f"));
    }

    #[test]
    fn check_value_truncated_bounds() {
        let cipher = des_cipher("0123456789ABCDEF");
        assert_eq!(cipher.check_value_truncated(2).unwrap(), "d5d4");
        assert!(cipher.check_value_truncated(0).is_err());
        assert!(cipher.check_value_truncated(9).is_err());
    }

    #[test]
    fn invalid_des_keys_rejected() {
        for key in [
            "",
            "sme",
            "844e5fb5-96d1-4b19-9ce0-b90f252ea370",
            "8AC325EAE53E1C2X",
            "        naksn",
            "8AC325EAE53E1 C2X",
            "1C7EB5",
        ] {
            assert!(BlockCipher::from_des_key_hex(key).is_err(), "key {key:?}");
        }
    }

    #[test]
    fn valid_des_keys_accepted() {
        for key in ["0091CFE3ACFA3EAF", "812BF1D20A4EAE1D", "2C45FA08A4CC2C85"] {
            assert!(BlockCipher::from_des_key_hex(key).is_ok(), "key {key:?}");
        }
    }

    #[test]
    fn invalid_tdes_keys_rejected() {
        for key in [
            "",
            "sme",
            "844e5fb5-96d1-4b19-9ce0-b90f252ea370",
            "        naksn",
            "2C45FA08A4CC2C85",
            "0091CFE3ACFA3EAF0091CFE3ACF",
        ] {
            assert!(BlockCipher::from_tdes_key_hex(key).is_err(), "key {key:?}");
        }
    }

    #[test]
    fn valid_tdes_keys_accepted() {
        for key in [
            "0091CFE3ACFA3EAF0091CFE3ACFA3EAF",
            "812BF1D20A4EAE1D812BF1D20A4EAE1D",
            "2C45FA08A4CC2C852C45FA08A4CC2C85",
        ] {
            assert!(BlockCipher::from_tdes_key_hex(key).is_ok(), "key {key:?}");
        }
    }

    #[test]
    fn two_key_tdes_expands_to_24_bytes() {
        let cipher = tdes_cipher("0091CFE3ACFA3EAF0091CFE3ACFA3EAF");
        assert_eq!(cipher.key_bytes().len(), TDES_KEY_LEN);
        assert_eq!(&cipher.key_bytes()[16..], &cipher.key_bytes()[..8]);
        assert_eq!(
            cipher.key_hex(),
            "0091cfe3acfa3eaf0091cfe3acfa3eaf0091cfe3acfa3eaf"
        );
    }

    #[test]
    fn two_key_and_three_key_forms_agree() {
        let short = tdes_cipher("A1FA4BF45ECDA0C1198CF971365C148C");
        let long = tdes_cipher("A1FA4BF45ECDA0C1198CF971365C148CA1FA4BF45ECDA0C1");
        assert_eq!(short.check_value(), long.check_value());
    }
}
