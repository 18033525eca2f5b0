//! Credential labels and wrapped key entries.

use crate::content::ContentBlock;
use crate::digest::DigestType;
use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Digest used for newly created passphrase labels: the stronger of the two
/// registered digests. Existing entries keep whatever their label recorded.
pub(crate) const DEFAULT_PASSPHRASE_DIGEST: DigestType = DigestType::Sha512;

/// A credential descriptor: how an unlock secret is derived, not the secret
/// itself. Persisted as `"<VARIANT>/<payload>"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyLabel {
    /// Unlock secret = digest(passphrase) under the label's own algorithm,
    /// so passphrase hashing can be strengthened without breaking entries
    /// wrapped under the older one.
    Passphrase { digest: DigestType },
    /// Platform-keystore credential. Round-trips through the persisted form
    /// but cannot derive an unlock secret in this crate.
    Biometric { created_at: String },
}

impl KeyLabel {
    /// A passphrase label with the current default digest.
    pub fn passphrase() -> KeyLabel {
        KeyLabel::Passphrase {
            digest: DEFAULT_PASSPHRASE_DIGEST,
        }
    }

    /// The persisted variant tag.
    pub fn variant(&self) -> &'static str {
        match self {
            KeyLabel::Passphrase { .. } => "PASSPHRASE",
            KeyLabel::Biometric { .. } => "BIOMETRIC",
        }
    }

    /// Derives the unlock secret from user-supplied material.
    pub fn derive_unlock_secret(&self, input: &[u8]) -> CryptoResult<Zeroizing<Vec<u8>>> {
        match self {
            KeyLabel::Passphrase { digest } => Ok(Zeroizing::new(digest.digest(input))),
            KeyLabel::Biometric { .. } => Err(CryptoError::UnsupportedLabel {
                variant: self.variant(),
            }),
        }
    }
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyLabel::Passphrase { digest } => write!(f, "PASSPHRASE/{digest}"),
            KeyLabel::Biometric { created_at } => write!(f, "BIOMETRIC/{created_at}"),
        }
    }
}

impl FromStr for KeyLabel {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<KeyLabel> {
        let Some((variant, payload)) = s.split_once('/') else {
            return Err(CryptoError::MalformedLabel(s.to_string()));
        };
        match variant {
            "PASSPHRASE" => Ok(KeyLabel::Passphrase {
                digest: payload.parse()?,
            }),
            "BIOMETRIC" => Ok(KeyLabel::Biometric {
                created_at: payload.to_string(),
            }),
            _ => Err(CryptoError::UnknownAlgorithm {
                kind: "key label",
                name: variant.to_string(),
            }),
        }
    }
}

impl Serialize for KeyLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<KeyLabel, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// One credential's wrapping of the document base key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub label: KeyLabel,
    /// A [`ContentBlock`] whose plaintext is the base key, the same
    /// primitive used for document content, applied to key material.
    /// Persisted under the name `content`.
    #[serde(rename = "content")]
    pub wrapped: ContentBlock,
}

impl KeyEntry {
    /// Wraps `base_key` under a label's derived unlock secret.
    pub fn wrap(label: KeyLabel, unlock_secret: &[u8], base_key: &[u8]) -> CryptoResult<KeyEntry> {
        Ok(KeyEntry {
            label,
            wrapped: ContentBlock::encrypt(unlock_secret, base_key)?,
        })
    }

    /// Recovers the base key, or [`CryptoError::AuthenticationFailure`] for
    /// a wrong secret.
    pub fn unwrap_key(&self, unlock_secret: &[u8]) -> CryptoResult<Zeroizing<Vec<u8>>> {
        self.wrapped.decrypt(unlock_secret).map(Zeroizing::new)
    }
}
