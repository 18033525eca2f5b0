//! Key-wrapping and content encryption for Lockleaf.
//!
//! One 64-byte base key protects the document; every credential wraps that
//! same key independently, so content is never re-encrypted per credential:
//!
//! 1. **Base key**: random, generated once per document, never persisted in
//!    the clear.
//! 2. **Key entries**: each credential derives an unlock secret and wraps
//!    the base key with the same block primitive used for content; there is
//!    no separate key-encryption code path.
//!
//! Adding, removing, or re-wrapping a credential touches only the entry
//! list; the content block and base key stay put. Every encrypted block
//! records its own cipher and digest tags, so algorithm defaults can change
//! for new writes without breaking anything already persisted.

mod cipher;
mod content;
mod digest;
mod error;
mod key;
mod message;

pub use cipher::CipherType;
pub use content::ContentBlock;
pub use digest::DigestType;
pub use error::{CryptoError, CryptoResult};
pub use key::{KeyEntry, KeyLabel};
pub use message::{BASE_KEY_SIZE, DecryptedMessage, Message};
