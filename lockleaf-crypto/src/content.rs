//! Encrypted-and-authenticated content blocks.
//!
//! A `ContentBlock` is the single encryption primitive in the store: document
//! content and wrapped key material both go through it. Each block records
//! the cipher and digest it was built with, so the defaults can move without
//! breaking anything already persisted.

use crate::cipher::CipherType;
use crate::digest::DigestType;
use crate::error::{CryptoError, CryptoResult};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Algorithms stamped onto newly encrypted blocks. AES-128 + SHA-1 match
/// every document persisted by earlier clients; decryption never consults
/// these constants because blocks self-describe.
pub(crate) const DEFAULT_CONTENT_CIPHER: CipherType = CipherType::Aes128;
pub(crate) const DEFAULT_CONTENT_DIGEST: DigestType = DigestType::Sha1;

/// An encrypted byte blob carrying everything needed to decrypt and verify
/// it except the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub cipher_type: CipherType,
    pub digest_type: DigestType,
    #[serde(with = "b64")]
    pub iv: Vec<u8>,
    /// Digest of the *plaintext*, verified after decryption.
    #[serde(with = "b64")]
    pub digest: Vec<u8>,
    /// The ciphertext. Persisted under the name `content`.
    #[serde(with = "b64", rename = "content")]
    pub ciphertext: Vec<u8>,
}

impl ContentBlock {
    /// Encrypts `plaintext` under the leading bytes of `key` with the
    /// default algorithms, a fresh random IV, and a plaintext digest.
    pub fn encrypt(key: &[u8], plaintext: &[u8]) -> CryptoResult<ContentBlock> {
        let cipher_type = DEFAULT_CONTENT_CIPHER;
        let digest_type = DEFAULT_CONTENT_DIGEST;

        let mut iv = vec![0u8; cipher_type.iv_size()];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| CryptoError::Rng(format!("failed generating IV: {e}")))?;

        let ciphertext = cipher_type.encrypt(key, &iv, plaintext)?;
        let digest = digest_type.digest(plaintext);

        Ok(ContentBlock {
            cipher_type,
            digest_type,
            iv,
            digest,
            ciphertext,
        })
    }

    /// Decrypts with the block's own algorithm tags and IV, then verifies
    /// the plaintext digest. A mismatch means the wrong key or a tampered
    /// block, indistinguishably.
    pub fn decrypt(&self, key: &[u8]) -> CryptoResult<Vec<u8>> {
        let plaintext = self
            .cipher_type
            .decrypt(key, &self.iv, &self.ciphertext)?;
        let digest = self.digest_type.digest(&plaintext);
        if bool::from(digest.ct_eq(&self.digest)) {
            Ok(plaintext)
        } else {
            Err(CryptoError::AuthenticationFailure)
        }
    }
}

/// Byte fields persist as standard base64 strings, the form every existing
/// client reads and writes.
mod b64 {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}
