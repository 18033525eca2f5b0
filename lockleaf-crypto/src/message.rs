//! The persisted message and its decrypted session counterpart.

use crate::content::ContentBlock;
use crate::error::{CryptoError, CryptoResult};
use crate::key::{KeyEntry, KeyLabel};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Size of the random base key wrapped by every entry.
pub const BASE_KEY_SIZE: usize = 64;

/// The persisted unit: encrypted content plus every credential's wrapping of
/// the one base key that decrypts it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub keys: Vec<KeyEntry>,
    pub content: ContentBlock,
}

impl Message {
    /// New message with the same keys and different content.
    pub fn with_content(&self, content: ContentBlock) -> Message {
        Message {
            keys: self.keys.clone(),
            content,
        }
    }

    /// Serializes to the persisted JSON form.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parses the persisted JSON form. Unknown algorithm or label tags fail
    /// here, before any key material is touched.
    pub fn decode(bytes: &[u8]) -> serde_json::Result<Message> {
        serde_json::from_slice(bytes)
    }

    /// Attempts one entry: unwrap the base key, then decrypt content with
    /// it. The steps fail independently; either failure aborts only this
    /// entry's attempt.
    pub fn unlock(&self, entry: &KeyEntry, unlock_secret: &[u8]) -> CryptoResult<DecryptedMessage> {
        let base_key = entry.unwrap_key(unlock_secret)?;
        let content = self.content.decrypt(&base_key)?;
        Ok(DecryptedMessage {
            message: self.clone(),
            base_key,
            content,
        })
    }

    /// Tries `candidate` against every passphrase-labeled entry in stored
    /// order, deriving the unlock secret under each entry's own digest. The
    /// first success wins; if every matching entry fails, the underlying
    /// failures are aggregated into one [`CryptoError::WrongPassphrase`].
    pub fn decrypt_passphrase(&self, candidate: &[u8]) -> CryptoResult<DecryptedMessage> {
        let mut causes = Vec::new();
        let mut any_passphrase = false;
        for entry in &self.keys {
            if !matches!(entry.label, KeyLabel::Passphrase { .. }) {
                continue;
            }
            any_passphrase = true;
            let attempt = entry
                .label
                .derive_unlock_secret(candidate)
                .and_then(|secret| self.unlock(entry, &secret));
            match attempt {
                Ok(decrypted) => return Ok(decrypted),
                Err(e) => causes.push(e),
            }
        }
        if !any_passphrase {
            // A message nobody holds a passphrase for must fail loudly, not
            // decrypt to nothing.
            return Err(CryptoError::NoPassphraseKeys);
        }
        Err(CryptoError::WrongPassphrase { causes })
    }
}

/// An unlocked session: the message, its base key, and the current
/// plaintext. The base key exists only inside this value, is zeroized on
/// drop, and is never persisted.
#[derive(Clone)]
pub struct DecryptedMessage {
    pub message: Message,
    base_key: Zeroizing<Vec<u8>>,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for DecryptedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptedMessage")
            .field("message", &self.message)
            .field("base_key", &"<redacted>")
            .field("content", &self.content)
            .finish()
    }
}

impl DecryptedMessage {
    /// Creates a fresh document: a random base key, empty content encrypted
    /// through the ordinary path (no special empty representation), and one
    /// passphrase entry wrapping the key.
    pub fn new(passphrase: &[u8]) -> CryptoResult<DecryptedMessage> {
        let mut base_key = Zeroizing::new(vec![0u8; BASE_KEY_SIZE]);
        OsRng
            .try_fill_bytes(&mut base_key)
            .map_err(|e| CryptoError::Rng(format!("failed generating base key: {e}")))?;

        let content_block = ContentBlock::encrypt(&base_key, b"")?;

        let label = KeyLabel::passphrase();
        let secret = label.derive_unlock_secret(passphrase)?;
        let entry = KeyEntry::wrap(label, &secret, &base_key)?;

        Ok(DecryptedMessage {
            message: Message {
                keys: vec![entry],
                content: content_block,
            },
            base_key,
            content: Vec::new(),
        })
    }

    /// Re-encrypts `content` under the unchanged base key. The key entries
    /// carry over untouched.
    pub fn with_content(&self, content: &[u8]) -> CryptoResult<DecryptedMessage> {
        let block = ContentBlock::encrypt(&self.base_key, content)?;
        Ok(DecryptedMessage {
            message: self.message.with_content(block),
            base_key: self.base_key.clone(),
            content: content.to_vec(),
        })
    }

    /// Wraps the unchanged base key under an additional passphrase. Content
    /// is untouched; the new entry unlocks the same document.
    pub fn with_passphrase_added(&self, passphrase: &[u8]) -> CryptoResult<DecryptedMessage> {
        let label = KeyLabel::passphrase();
        let secret = label.derive_unlock_secret(passphrase)?;
        let entry = KeyEntry::wrap(label, &secret, &self.base_key)?;
        let mut keys = self.message.keys.clone();
        keys.push(entry);
        Ok(self.with_keys(keys))
    }

    /// Revokes one key entry. The last entry cannot be removed; the message
    /// would become permanently unreadable.
    pub fn with_key_removed(&self, index: usize) -> CryptoResult<DecryptedMessage> {
        let count = self.message.keys.len();
        if index >= count {
            return Err(CryptoError::NoSuchKeyEntry { index, count });
        }
        if count == 1 {
            return Err(CryptoError::LastKeyEntry);
        }
        let mut keys = self.message.keys.clone();
        keys.remove(index);
        Ok(self.with_keys(keys))
    }

    /// Replaces one entry with a wrapping under a new passphrase, leaving
    /// the base key and content untouched.
    pub fn with_passphrase_changed(
        &self,
        index: usize,
        passphrase: &[u8],
    ) -> CryptoResult<DecryptedMessage> {
        let count = self.message.keys.len();
        if index >= count {
            return Err(CryptoError::NoSuchKeyEntry { index, count });
        }
        let label = KeyLabel::passphrase();
        let secret = label.derive_unlock_secret(passphrase)?;
        let entry = KeyEntry::wrap(label, &secret, &self.base_key)?;
        let mut keys = self.message.keys.clone();
        keys[index] = entry;
        Ok(self.with_keys(keys))
    }

    fn with_keys(&self, keys: Vec<KeyEntry>) -> DecryptedMessage {
        DecryptedMessage {
            message: Message {
                keys,
                content: self.message.content.clone(),
            },
            base_key: self.base_key.clone(),
            content: self.content.clone(),
        }
    }
}
