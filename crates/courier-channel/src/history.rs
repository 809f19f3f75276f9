//! Reading channel history.
//!
//! A read derives the addresses of a set of indices, fetches everything
//! stored there in one lookup, and turns each bundle back into a message.
//! Anything that does not unlock under the channel seed is foreign or
//! damaged and is dropped without failing the read.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use courier_core::{derive_address, reassemble, unlock, ChannelAddress, CoreError, Tag};
use courier_ledger::{BundleId, EntryRef, LedgerClient, LedgerEntry};

use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::finder::IndexFinder;
use crate::pacing::Pacer;

/// A verified message read back from the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Channel slot the message was written to.
    pub index: u64,
    /// Address of that slot.
    pub address: ChannelAddress,
    /// Unlocked message bytes.
    pub message: Bytes,
    /// Attachment time of the head fragment (Unix ms).
    pub timestamp: i64,
    /// Reference to the head fragment.
    pub entry_ref: EntryRef,
    /// Bundle the message arrived in.
    pub bundle_id: BundleId,
    /// Tag the bundle was submitted with.
    pub tag: Tag,
}

impl ChannelRecord {
    /// The message as UTF-8 text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.message).ok()
    }
}

/// Reads verified records from a channel.
pub struct HistoryReader<'a, L: ?Sized> {
    ledger: &'a L,
    pacer: &'a dyn Pacer,
    config: &'a ChannelConfig,
}

impl<'a, L: LedgerClient + ?Sized> HistoryReader<'a, L> {
    /// Create a reader over `ledger`.
    pub fn new(ledger: &'a L, pacer: &'a dyn Pacer, config: &'a ChannelConfig) -> Self {
        Self {
            ledger,
            pacer,
            config,
        }
    }

    /// Read the records stored at `indexes`.
    ///
    /// Records come back sorted by timestamp, then index. Bundles that fail
    /// to decode or verify are skipped.
    pub async fn data_list_from_indexes(
        &self,
        seed: &[u8],
        indexes: &[u64],
    ) -> Result<Vec<ChannelRecord>> {
        let mut index_of: HashMap<ChannelAddress, u64> = HashMap::with_capacity(indexes.len());
        for &index in indexes {
            index_of.insert(derive_address(seed, index), index);
        }
        if index_of.is_empty() {
            return Ok(Vec::new());
        }

        let addresses: Vec<ChannelAddress> = index_of.keys().cloned().collect();
        let entries = self
            .ledger
            .find_by_addresses(&addresses)
            .await
            .map_err(ChannelError::TransientQuery)?;

        let mut bundles: BTreeMap<BundleId, Vec<LedgerEntry>> = BTreeMap::new();
        for entry in entries {
            bundles.entry(entry.bundle_id).or_default().push(entry);
        }

        let mut records = Vec::with_capacity(bundles.len());
        for (bundle_id, mut fragments) in bundles {
            fragments.sort_by_key(|e| e.fragment_index);

            let head = &fragments[0];
            let Some(&index) = index_of.get(&head.address) else {
                tracing::warn!(bundle = %bundle_id, "bundle at unrequested address, dropping");
                continue;
            };

            let contiguous = fragments
                .iter()
                .enumerate()
                .all(|(i, e)| e.fragment_index as usize == i);
            if !contiguous {
                tracing::warn!(bundle = %bundle_id, index, "incomplete bundle, dropping");
                continue;
            }

            match open_bundle(seed, index, &fragments) {
                Ok(message) => records.push(ChannelRecord {
                    index,
                    address: head.address.clone(),
                    message: Bytes::from(message),
                    timestamp: head.timestamp,
                    entry_ref: head.entry_ref,
                    bundle_id,
                    tag: head.tag.clone(),
                }),
                Err(e) => {
                    tracing::warn!(
                        bundle = %bundle_id,
                        index,
                        integrity = e.is_integrity(),
                        error = %e,
                        "unreadable bundle, dropping"
                    );
                }
            }
        }

        records.sort_by_key(|r| (r.timestamp, r.index));
        Ok(records)
    }

    /// Read the records at indices `[start, start + count)`.
    pub async fn data_list(&self, seed: &[u8], start: u64, count: u64) -> Result<Vec<ChannelRecord>> {
        let end = start.checked_add(count).ok_or_else(|| {
            ChannelError::InvalidArgument(format!("index range {} + {} overflows", start, count))
        })?;
        let indexes: Vec<u64> = (start..end).collect();
        self.data_list_from_indexes(seed, &indexes).await
    }

    /// Read the most recent records below `from_index`.
    ///
    /// Pages of `page_size` indices are read backward from `from_index`
    /// (exclusive) until at least `page_size` records are collected or index
    /// 0 has been read. With no `from_index`, the next writable index is
    /// discovered first. A failed page lookup is paced and read again.
    pub async fn channel_history(
        &self,
        seed: &[u8],
        from_index: Option<u64>,
        page_size: usize,
    ) -> Result<Vec<ChannelRecord>> {
        if page_size == 0 {
            return Err(ChannelError::InvalidArgument(
                "page size must be non-zero".into(),
            ));
        }

        let mut end = match from_index {
            Some(index) => index,
            None => {
                IndexFinder::new(self.ledger, self.pacer, self.config)
                    .find_channel_index(seed, 0)
                    .await?
            }
        };

        let page = page_size as u64;
        let mut records: Vec<ChannelRecord> = Vec::new();
        while end > 0 && records.len() < page_size {
            let start = end.saturating_sub(page);
            let mut older = match self.data_list(seed, start, end - start).await {
                Ok(older) => older,
                Err(ChannelError::TransientQuery(e)) => {
                    tracing::warn!(start, end, error = %e, "history page lookup failed, retrying");
                    self.pacer.wait().await;
                    continue;
                }
                Err(e) => return Err(e),
            };
            tracing::debug!(start, end, found = older.len(), "read history page");

            older.append(&mut records);
            records = older;
            end = start;
        }

        Ok(records)
    }
}

/// Reassemble and unlock one bundle's fragments.
fn open_bundle(
    seed: &[u8],
    index: u64,
    fragments: &[LedgerEntry],
) -> std::result::Result<Vec<u8>, CoreError> {
    let symbols: Vec<&str> = fragments.iter().map(|e| e.fragment.as_str()).collect();
    let locked = reassemble(&symbols)?;
    unlock(seed, &locked, index)
}
