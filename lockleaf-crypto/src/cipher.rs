//! Symmetric cipher registry.
//!
//! Ciphers are selected by a persisted registry name; only the name is ever
//! serialized, never behavior. Decoding an unknown name fails with
//! [`CryptoError::UnknownAlgorithm`] instead of falling back to anything.

use crate::error::{CryptoError, CryptoResult};
use aes::Aes128;
use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// A registered symmetric cipher, identified on the wire by its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CipherType {
    /// AES-128 in CBC mode. The only cipher existing documents use.
    Aes128,
}

impl CipherType {
    /// The persisted registry name.
    pub const fn name(self) -> &'static str {
        match self {
            CipherType::Aes128 => "AES_128",
        }
    }

    /// Resolves a registry name.
    pub fn from_name(name: &str) -> CryptoResult<CipherType> {
        match name {
            "AES_128" => Ok(CipherType::Aes128),
            _ => Err(CryptoError::UnknownAlgorithm {
                kind: "cipher",
                name: name.to_string(),
            }),
        }
    }

    pub const fn key_size(self) -> usize {
        match self {
            CipherType::Aes128 => 16,
        }
    }

    pub const fn block_size(self) -> usize {
        match self {
            CipherType::Aes128 => 16,
        }
    }

    /// IV length. Sized to the key rather than the cipher block, a quirk of
    /// the persisted format that existing documents depend on.
    pub const fn iv_size(self) -> usize {
        self.key_size()
    }

    /// Pads `plaintext` to whole blocks and chain-encrypts it with `iv`. Only
    /// the leading [`key_size`](Self::key_size) bytes of `key` are used.
    pub(crate) fn encrypt(self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = leading_key(key, self.key_size())?;
        let padded = pad(plaintext, self.block_size());
        match self {
            CipherType::Aes128 => {
                let enc = Aes128CbcEnc::new_from_slices(key, iv)
                    .map_err(|e| CryptoError::Cipher(format!("bad key or IV length: {e}")))?;
                Ok(enc.encrypt_padded_vec_mut::<NoPadding>(&padded))
            }
        }
    }

    /// Reverses the chain and strips padding.
    pub(crate) fn decrypt(self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = leading_key(key, self.key_size())?;
        match self {
            CipherType::Aes128 => {
                let dec = Aes128CbcDec::new_from_slices(key, iv)
                    .map_err(|e| CryptoError::Cipher(format!("bad key or IV length: {e}")))?;
                let padded = dec
                    .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
                    .map_err(|e| CryptoError::Cipher(format!("ciphertext not block-aligned: {e}")))?;
                Ok(unpad(padded))
            }
        }
    }
}

impl fmt::Display for CipherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherType {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<CipherType> {
        CipherType::from_name(s)
    }
}

impl Serialize for CipherType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for CipherType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<CipherType, D::Error> {
        let name = String::deserialize(deserializer)?;
        CipherType::from_name(&name).map_err(serde::de::Error::custom)
    }
}

/// Key material may be longer than the cipher key (a 64-byte base key or
/// digest feeds a 16-byte AES key); the cipher uses the leading bytes.
fn leading_key(key: &[u8], size: usize) -> CryptoResult<&[u8]> {
    key.get(..size).ok_or(CryptoError::InvalidKeyLength {
        expected: size,
        actual: key.len(),
    })
}

/// Pads to a whole number of blocks; every pad byte holds the pad length.
/// Already-aligned input gains one full block, so the pad is never empty.
fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - data.len() % block_size;
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Strips padding by trusting the trailing byte as the pad length. A length
/// larger than the buffer returns the buffer unpadded instead of failing:
/// the plaintext digest check one layer up still rejects corrupt output, and
/// old documents rely on this exact behavior.
fn unpad(mut data: Vec<u8>) -> Vec<u8> {
    let Some(&last) = data.last() else {
        return data;
    };
    let pad_len = last as usize;
    if pad_len <= data.len() {
        data.truncate(data.len() - pad_len);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_appends_full_block_for_aligned_input() {
        let padded = pad(&[0u8; 16], 16);
        assert_eq!(padded.len(), 32);
        assert!(padded[16..].iter().all(|&b| b == 16));
    }

    #[test]
    fn pad_fills_remainder_with_pad_length() {
        let padded = pad(b"hello", 16);
        assert_eq!(padded.len(), 16);
        assert!(padded[5..].iter().all(|&b| b == 11));
    }

    #[test]
    fn unpad_reverses_pad() {
        for len in [0usize, 1, 15, 16, 17, 33] {
            let data = vec![0xABu8; len];
            assert_eq!(unpad(pad(&data, 16)), data);
        }
    }

    #[test]
    fn unpad_is_lenient_about_oversized_pad_length() {
        // Trailing byte claims more padding than there is data.
        let data = vec![1, 2, 0xFF];
        assert_eq!(unpad(data.clone()), data);
    }

    #[test]
    fn encrypt_rejects_short_key() {
        let err = CipherType::Aes128
            .encrypt(&[0u8; 8], &[0u8; 16], b"x")
            .unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength { .. }));
    }

    #[test]
    fn encrypt_uses_leading_key_bytes_only() {
        let iv = [7u8; 16];
        let short = CipherType::Aes128.encrypt(&[1u8; 16], &iv, b"data").unwrap();
        let mut long_key = vec![1u8; 16];
        long_key.extend_from_slice(&[9u8; 48]);
        let long = CipherType::Aes128.encrypt(&long_key, &iv, b"data").unwrap();
        assert_eq!(short, long);
    }
}
