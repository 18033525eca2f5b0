//! Hash algorithm registry.
//!
//! Same shape as the cipher registry: the persisted form is a bare name, the
//! behavior lives here, and unknown names fail explicitly.

use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha512};
use std::fmt;
use std::str::FromStr;

/// A registered hash algorithm, identified on the wire by its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestType {
    /// Legacy content digest. Kept for documents written by older clients;
    /// the authentication it provides is integrity, not collision resistance.
    Sha1,
    /// Passphrase digest, and the default for anything new.
    Sha512,
}

impl DigestType {
    /// The persisted registry name.
    pub const fn name(self) -> &'static str {
        match self {
            DigestType::Sha1 => "SHA_1",
            DigestType::Sha512 => "SHA_512",
        }
    }

    /// Resolves a registry name.
    pub fn from_name(name: &str) -> CryptoResult<DigestType> {
        match name {
            "SHA_1" => Ok(DigestType::Sha1),
            "SHA_512" => Ok(DigestType::Sha512),
            _ => Err(CryptoError::UnknownAlgorithm {
                kind: "digest",
                name: name.to_string(),
            }),
        }
    }

    /// Hashes `data`.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestType::Sha1 => Sha1::digest(data).to_vec(),
            DigestType::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for DigestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestType {
    type Err = CryptoError;

    fn from_str(s: &str) -> CryptoResult<DigestType> {
        DigestType::from_name(s)
    }
}

impl Serialize for DigestType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for DigestType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<DigestType, D::Error> {
        let name = String::deserialize(deserializer)?;
        DigestType::from_name(&name).map_err(serde::de::Error::custom)
    }
}
