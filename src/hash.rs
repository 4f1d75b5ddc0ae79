//! Content-derived identifiers used by the engine.
//!
//! A [`Hash`] is always 32 bytes on the wire and base58 in text form,
//! which is how the engine hands instance and runner identities to
//! the process through its environment.

use std::fmt;
use std::str::FromStr;

/// Length in bytes of every engine hash.
pub const HASH_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    #[error("value is empty")]
    Empty,

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    pub fn new(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode the base58 text form.
    pub fn decode(s: &str) -> Result<Self, HashError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HashError::Empty);
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| HashError::InvalidBase58(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        let array: [u8; HASH_LEN] = bytes
            .try_into()
            .map_err(|_| HashError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl FromStr for Hash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(&self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hash").field(&self.to_string()).finish()
    }
}

/// Base58 form of raw hash bytes as received on the wire, whatever their length.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}
