//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while encrypting, decrypting, or decoding.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unknown {kind}: {name}")]
    UnknownAlgorithm { kind: &'static str, name: String },

    #[error("malformed key label: {0}")]
    MalformedLabel(String),

    #[error("{variant} unlock requires a platform keystore")]
    UnsupportedLabel { variant: &'static str },

    #[error("authentication failure: plaintext digest mismatch")]
    AuthenticationFailure,

    #[error("wrong passphrase: {}", format_causes(.causes))]
    WrongPassphrase { causes: Vec<CryptoError> },

    #[error("message has no passphrase-labeled keys")]
    NoPassphraseKeys,

    #[error("no key entry at index {index} (message has {count})")]
    NoSuchKeyEntry { index: usize, count: usize },

    #[error("cannot remove the last key entry")]
    LastKeyEntry,

    #[error("key material too short: need {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("random generator failure: {0}")]
    Rng(String),

    #[error("cipher operation failed: {0}")]
    Cipher(String),
}

fn format_causes(causes: &[CryptoError]) -> String {
    causes
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
