//! Document orchestration for Lockleaf.
//!
//! Sits above the synchronizer and the crypto layer: decodes the
//! authoritative bytes into a message, unlocks it with a passphrase, and
//! persists edits, skipping the write entirely when an edit changes
//! nothing. Prompting for passphrases and spawning editors is the caller's
//! business; this crate only moves and transforms the document.

use lockleaf_crypto::{CryptoError, DecryptedMessage, Message};
use lockleaf_storage::{StorageError, Synchronizer};
use tracing::{debug, info};

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Backend bytes that are not a valid persisted message. Distinct from
    /// backend I/O failure: storage delivered bytes, but they do not decode.
    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Opening a document that no backend holds.
    #[error("no document found on any backend")]
    NoDocument,
}

pub type VaultResult<T> = Result<T, VaultError>;

// ============================================================================
// Vault — the replicated document
// ============================================================================

/// The replicated encrypted document: the synchronizer plus the decode step.
#[derive(Clone)]
pub struct Vault {
    sync: Synchronizer,
}

impl Vault {
    pub fn new(sync: Synchronizer) -> Vault {
        Vault { sync }
    }

    /// Reads and decodes the authoritative message, repairing lagging
    /// replicas along the way. `None` means a fresh install.
    pub async fn load(&self) -> VaultResult<Option<Message>> {
        let outcome = self.sync.read().await?;
        match outcome.revision {
            Some(revision) => Ok(Some(Message::decode(&revision.bytes)?)),
            None => Ok(None),
        }
    }

    /// Encodes and writes the message to every backend.
    pub async fn store(&self, message: &Message) -> VaultResult<()> {
        let bytes = message.encode()?;
        self.sync.write(bytes).await?;
        Ok(())
    }
}

// ============================================================================
// Session — an unlocked document
// ============================================================================

/// An unlocked editing session over the vault's document.
///
/// Holds the decrypted message and writes back only when something actually
/// changed. The base key lives inside the session value and dies with it.
pub struct Session {
    vault: Vault,
    current: DecryptedMessage,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Starts a session on a brand-new document. Nothing is persisted until
    /// the first effective edit; aborting before writing leaves no trace,
    /// exactly like an existing document with an abandoned edit.
    pub fn create(vault: Vault, passphrase: &[u8]) -> VaultResult<Session> {
        info!("creating a fresh document");
        let current = DecryptedMessage::new(passphrase)?;
        Ok(Session { vault, current })
    }

    /// Loads the authoritative document and unlocks it with `passphrase`.
    /// Fails with [`VaultError::NoDocument`] when no backend holds one;
    /// callers decide whether that means [`Session::create`].
    pub async fn open(vault: Vault, passphrase: &[u8]) -> VaultResult<Session> {
        let message = vault.load().await?.ok_or(VaultError::NoDocument)?;
        let current = message.decrypt_passphrase(passphrase)?;
        Ok(Session { vault, current })
    }

    /// The current plaintext.
    pub fn content(&self) -> &[u8] {
        &self.current.content
    }

    /// The message as currently persisted (or pending first persistence).
    pub fn message(&self) -> &Message {
        &self.current.message
    }

    /// Applies an edit. Byte-identical content is a no-op: nothing is
    /// re-encrypted and no backend write happens. Returns whether a write
    /// was performed.
    pub async fn apply_edit(&mut self, new_content: &[u8]) -> VaultResult<bool> {
        if new_content == self.current.content.as_slice() {
            debug!("edit left content unchanged; skipping write");
            return Ok(false);
        }
        let updated = self.current.with_content(new_content)?;
        self.vault.store(&updated.message).await?;
        self.current = updated;
        Ok(true)
    }

    /// Wraps the unchanged base key under an additional passphrase and
    /// persists. Content is not re-encrypted.
    pub async fn add_passphrase(&mut self, passphrase: &[u8]) -> VaultResult<()> {
        let updated = self.current.with_passphrase_added(passphrase)?;
        self.vault.store(&updated.message).await?;
        self.current = updated;
        Ok(())
    }

    /// Revokes one key entry and persists.
    pub async fn remove_key(&mut self, index: usize) -> VaultResult<()> {
        let updated = self.current.with_key_removed(index)?;
        self.vault.store(&updated.message).await?;
        self.current = updated;
        Ok(())
    }

    /// Replaces one entry's passphrase and persists. The base key and
    /// content stay put.
    pub async fn change_passphrase(
        &mut self,
        index: usize,
        passphrase: &[u8],
    ) -> VaultResult<()> {
        let updated = self.current.with_passphrase_changed(index, passphrase)?;
        self.vault.store(&updated.message).await?;
        self.current = updated;
        Ok(())
    }
}
