//! The drive identifier.
//!
//! A [`DriveKey`] is the fixed 32-byte public key of a drive — the unit
//! of ownership for paths in the virtual tree. Keys are opaque on the
//! wire (hex text) and display as 64 lowercase hex characters. The
//! `short()` form (first 8 hex chars) is for human-facing UI — never
//! used as a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::url::DRIVE_SCHEME;

/// Error parsing a [`DriveKey`] from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    /// The input was not 64 hex characters.
    #[error("expected 64 hex characters, got {0}")]
    BadLength(usize),

    /// The input contained a non-hex character.
    #[error("invalid hex: {0}")]
    BadHex(String),
}

/// A drive identifier: a fixed 32-byte key, hex-encoded on the wire.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DriveKey([u8; 32]);

impl DriveKey {
    /// Construct from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from exactly 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, KeyParseError> {
        if s.len() != 64 {
            return Err(KeyParseError::BadLength(s.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| KeyParseError::BadHex(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Parse a drive reference: either bare hex or a `drive://` URL.
    ///
    /// Accepts `drive://<hex>`, `drive://<hex>/some/path`, or the bare
    /// 64-character hex key. Anything else fails.
    pub fn from_reference(reference: &str) -> Result<Self, KeyParseError> {
        let rest = reference
            .strip_prefix(DRIVE_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .unwrap_or(reference);
        let hex_part = rest.split('/').next().unwrap_or(rest);
        Self::from_hex(hex_part)
    }

    /// Full 64-character hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters — for human display only, not lookup.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for DriveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for DriveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DriveKey({})", self.short())
    }
}

impl TryFrom<String> for DriveKey {
    type Error = KeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<DriveKey> for String {
    fn from(key: DriveKey) -> Self {
        key.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DriveKey {
        DriveKey::from_bytes([0xab; 32])
    }

    #[test]
    fn hex_round_trip() {
        let key = sample();
        let parsed = DriveKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn rejects_bad_length() {
        assert_eq!(DriveKey::from_hex("abcd"), Err(KeyParseError::BadLength(4)));
    }

    #[test]
    fn rejects_bad_hex() {
        let s = "zz".repeat(32);
        assert!(matches!(DriveKey::from_hex(&s), Err(KeyParseError::BadHex(_))));
    }

    #[test]
    fn from_reference_accepts_url_and_hex() {
        let key = sample();
        let hex = key.to_hex();
        assert_eq!(DriveKey::from_reference(&hex).unwrap(), key);
        assert_eq!(
            DriveKey::from_reference(&format!("drive://{hex}")).unwrap(),
            key
        );
        assert_eq!(
            DriveKey::from_reference(&format!("drive://{hex}/sub/dir")).unwrap(),
            key
        );
        assert!(DriveKey::from_reference("drive://not-a-key").is_err());
    }

    #[test]
    fn serde_as_hex_string() {
        let key = sample();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.to_hex()));
        let back: DriveKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn short_is_prefix() {
        let key = sample();
        assert_eq!(key.short(), key.to_hex()[..8]);
    }
}
