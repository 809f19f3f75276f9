//! Strong type definitions for Courier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::symbols::{is_symbol_string, FILLER};

/// Width of the injected checksum in bytes.
pub const CHECKSUM_LEN: usize = 2;

/// Width of the injected mask seed in bytes.
pub const MASK_SEED_LEN: usize = 2;

/// Number of symbols in a ledger tag.
pub const TAG_LEN: usize = 27;

/// The two-byte integrity tag injected into a locked message.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum(pub [u8; CHECKSUM_LEN]);

impl Checksum {
    /// Take the checksum from the first two bytes of a derived key.
    pub fn from_key(key: &[u8; 32]) -> Self {
        Self([key[0], key[1]])
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", self.to_hex())
    }
}

/// The two random bytes that salt a message's mask keystream.
///
/// These are the only plaintext bytes of a locked message.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskSeed(pub [u8; MASK_SEED_LEN]);

impl MaskSeed {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; MASK_SEED_LEN]) -> Self {
        Self(bytes)
    }

    /// Draw a fresh mask seed from the thread RNG.
    pub fn random() -> Self {
        use rand::Rng;
        Self(rand::thread_rng().gen())
    }

    /// Lowercase hex, as used inside mask labels.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for MaskSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaskSeed({})", self.to_hex())
    }
}

/// A ledger tag: up to 27 alphabet symbols, right-padded with `9`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Validate and pad a tag.
    pub fn new(tag: &str) -> Result<Self, CoreError> {
        if tag.len() > TAG_LEN {
            return Err(CoreError::InvalidTag(format!(
                "tag longer than {} symbols: {}",
                TAG_LEN,
                tag.len()
            )));
        }
        if !is_symbol_string(tag) {
            return Err(CoreError::InvalidTag(format!("non-alphabet symbol in {:?}", tag)));
        }
        let mut padded = String::with_capacity(TAG_LEN);
        padded.push_str(tag);
        padded.extend(std::iter::repeat(FILLER).take(TAG_LEN - tag.len()));
        Ok(Self(padded))
    }

    /// The all-filler tag.
    pub fn empty() -> Self {
        Self(FILLER.to_string().repeat(TAG_LEN))
    }

    /// Get the padded tag symbols.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0.trim_end_matches(FILLER))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Tag {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}
