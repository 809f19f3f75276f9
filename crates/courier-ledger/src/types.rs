//! Ledger-side data: entries, bundles and their identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use courier_core::symbols::is_symbol_string;
use courier_core::{ChannelAddress, Tag};

use crate::error::{LedgerError, Result};

/// Domain prefix for bundle id hashing.
const BUNDLE_ID_DOMAIN: &[u8] = b"courier-bundle-v1";

/// Domain prefix for entry reference hashing.
const ENTRY_REF_DOMAIN: &[u8] = b"courier-entry-v1";

/// A 32-byte bundle identifier, computed as Blake3 over the bundle content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleId(pub [u8; 32]);

impl BundleId {
    /// Create a new BundleId from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BundleId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl TryFrom<&[u8]> for BundleId {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> std::result::Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// Reference to a single ledger entry (one fragment of a bundle).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRef(pub [u8; 32]);

impl EntryRef {
    /// Derive the reference of fragment `fragment_index` in `bundle`.
    pub fn derive(bundle: &BundleId, fragment_index: u32) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ENTRY_REF_DOMAIN);
        hasher.update(bundle.as_bytes());
        hasher.update(&fragment_index.to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryRef({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl TryFrom<&[u8]> for EntryRef {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> std::result::Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// One fragment of a bundle as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Address the bundle was sent to.
    pub address: ChannelAddress,
    /// Bundle this fragment belongs to.
    pub bundle_id: BundleId,
    /// Position of this fragment inside its bundle, starting at 0.
    pub fragment_index: u32,
    /// Fixed-width payload symbols.
    pub fragment: String,
    /// Ledger-side tag.
    pub tag: Tag,
    /// Attachment time (Unix ms).
    pub timestamp: i64,
    /// Reference to this entry.
    pub entry_ref: EntryRef,
}

/// A bundle ready for submission: one address, one tag, ordered fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingBundle {
    pub address: ChannelAddress,
    pub tag: Tag,
    pub fragments: Vec<String>,
}

impl OutgoingBundle {
    /// Create a new outgoing bundle.
    pub fn new(address: ChannelAddress, tag: Tag, fragments: Vec<String>) -> Self {
        Self {
            address,
            tag,
            fragments,
        }
    }

    /// Check the bundle shape before it is accepted by a ledger.
    ///
    /// Fragments must be non-empty, share one width and use only alphabet
    /// symbols.
    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.fragments.first() else {
            return Err(LedgerError::Rejected("bundle has no fragments".into()));
        };
        if first.is_empty() {
            return Err(LedgerError::Rejected("empty fragment".into()));
        }
        for (i, fragment) in self.fragments.iter().enumerate() {
            if fragment.len() != first.len() {
                return Err(LedgerError::Rejected(format!(
                    "fragment {} has width {}, expected {}",
                    i,
                    fragment.len(),
                    first.len()
                )));
            }
            if !is_symbol_string(fragment) {
                return Err(LedgerError::Rejected(format!(
                    "fragment {} contains non-alphabet symbols",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Compute the bundle id for this content attached at `timestamp`.
    ///
    /// `nonce` distinguishes otherwise identical submissions.
    pub fn compute_id(&self, timestamp: i64, nonce: u64) -> BundleId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(BUNDLE_ID_DOMAIN);
        hasher.update(self.address.as_str().as_bytes());
        hasher.update(self.tag.as_str().as_bytes());
        hasher.update(&timestamp.to_le_bytes());
        hasher.update(&nonce.to_le_bytes());
        for fragment in &self.fragments {
            hasher.update(&(fragment.len() as u64).to_le_bytes());
            hasher.update(fragment.as_bytes());
        }
        BundleId(*hasher.finalize().as_bytes())
    }

    /// Expand the bundle into its ledger entries.
    pub fn into_entries(self, bundle_id: BundleId, timestamp: i64) -> Vec<LedgerEntry> {
        let Self {
            address,
            tag,
            fragments,
        } = self;

        fragments
            .into_iter()
            .enumerate()
            .map(|(i, fragment)| {
                let fragment_index = i as u32;
                LedgerEntry {
                    address: address.clone(),
                    bundle_id,
                    fragment_index,
                    fragment,
                    tag: tag.clone(),
                    timestamp,
                    entry_ref: EntryRef::derive(&bundle_id, fragment_index),
                }
            })
            .collect()
    }
}
