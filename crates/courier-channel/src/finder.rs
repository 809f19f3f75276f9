//! Channel index discovery.
//!
//! Channel slots are written in index order, but the ledger can only answer
//! "what is stored at these addresses". The finder locates the first slot
//! that satisfies a predicate (by default: the first empty slot) with a
//! forward probe that skips ahead in growing steps, followed by a batched
//! backward scan that pins down the exact boundary.
//!
//! ```text
//! INIT ─▶ SNAPSHOT_CHECK ─▶ PROBE ⇄ (skip) ─▶ BACKWARD_VERIFY ─▶ DONE
//!          (from > 0)          │                  (retries > 1)
//!                              └──────────────────────────────▶ DONE
//! ```
//!
//! Transient lookup failures never abort discovery: they are logged, paced,
//! and the same lookup is issued again.

use std::collections::HashMap;
use std::slice;

use courier_core::{derive_address, ChannelAddress};
use courier_ledger::{LedgerClient, LedgerEntry};

use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::pacing::Pacer;

/// The default slot predicate: nothing has been written there.
pub fn empty_slot(entries: &[LedgerEntry]) -> bool {
    entries.is_empty()
}

/// Locates channel indices on a ledger.
pub struct IndexFinder<'a, L: ?Sized> {
    ledger: &'a L,
    pacer: &'a dyn Pacer,
    config: &'a ChannelConfig,
}

impl<'a, L: LedgerClient + ?Sized> IndexFinder<'a, L> {
    /// Create a finder over `ledger`.
    pub fn new(ledger: &'a L, pacer: &'a dyn Pacer, config: &'a ChannelConfig) -> Self {
        Self {
            ledger,
            pacer,
            config,
        }
    }

    /// Find the next writable index at or after `from`.
    ///
    /// Returns 0 if index 0 is found empty while `from > 0`: the ledger has
    /// been pruned and the channel restarts.
    pub async fn find_channel_index(&self, seed: &[u8], from: u64) -> Result<u64> {
        self.find_index_matching(seed, from, empty_slot).await
    }

    /// Find the first index at or after `from` whose entries satisfy
    /// `predicate`.
    pub async fn find_index_matching<F>(&self, seed: &[u8], from: u64, predicate: F) -> Result<u64>
    where
        F: Fn(&[LedgerEntry]) -> bool,
    {
        self.config.validate()?;

        if from > 0 && self.snapshot_detected(seed).await {
            tracing::info!(from, "index 0 is empty, ledger snapshot detected; restarting at 0");
            return Ok(0);
        }

        let mut current = from;
        let mut retries: u64 = 0;

        loop {
            let address = derive_address(seed, current);
            let entries = match self.ledger.find_by_addresses(slice::from_ref(&address)).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(index = current, error = %e, "probe lookup failed, retrying");
                    self.pacer.wait().await;
                    continue;
                }
            };

            if predicate(&entries) {
                if retries > 1 {
                    tracing::debug!(index = current, retries, "overshot, verifying backward");
                    return self.verify_backward(seed, current, &predicate).await;
                }
                tracing::debug!(index = current, "found channel index");
                return Ok(current);
            }

            self.pacer.wait().await;

            let skip = retries
                .div_ceil(2)
                .checked_mul(self.config.skip_step)
                .ok_or_else(|| overflow(current))?;
            tracing::debug!(index = current, skip, retries, "slot taken, probing ahead");

            current = current.checked_add(skip).ok_or_else(|| overflow(current))?;
            retries += 1;
        }
    }

    /// True if index 0 is confirmed empty. Lookup errors count as "no".
    async fn snapshot_detected(&self, seed: &[u8]) -> bool {
        let address = derive_address(seed, 0);
        match self.ledger.find_by_addresses(slice::from_ref(&address)).await {
            Ok(entries) => entries.is_empty(),
            Err(e) => {
                tracing::warn!(error = %e, "snapshot check failed, continuing");
                false
            }
        }
    }

    /// Walk back from `start` to the lowest index of the contiguous run of
    /// slots that satisfy `predicate`.
    async fn verify_backward<F>(&self, seed: &[u8], start: u64, predicate: &F) -> Result<u64>
    where
        F: Fn(&[LedgerEntry]) -> bool,
    {
        let span = (self.config.backward_batch as u64).saturating_sub(1);
        let mut upper = start;

        loop {
            let lower = upper.saturating_sub(span);
            let batch: Vec<(u64, ChannelAddress)> = (lower..=upper)
                .rev()
                .map(|index| (index, derive_address(seed, index)))
                .collect();
            let addresses: Vec<ChannelAddress> =
                batch.iter().map(|(_, address)| address.clone()).collect();

            let entries = match self.ledger.find_by_addresses(&addresses).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(lower, upper, error = %e, "backward lookup failed, retrying");
                    self.pacer.wait().await;
                    continue;
                }
            };

            let mut by_address: HashMap<ChannelAddress, Vec<LedgerEntry>> = HashMap::new();
            for entry in entries {
                by_address.entry(entry.address.clone()).or_default().push(entry);
            }

            for (index, address) in &batch {
                let slot = by_address.get(address).map(Vec::as_slice).unwrap_or(&[]);
                if !predicate(slot) {
                    let found = index.checked_add(1).ok_or_else(|| overflow(*index))?;
                    tracing::debug!(index = found, "found channel index after backward scan");
                    return Ok(found);
                }
            }

            if lower == 0 {
                tracing::debug!("every slot down to 0 matches");
                return Ok(0);
            }

            self.pacer.wait().await;
            upper = lower - 1;
        }
    }
}

fn overflow(index: u64) -> ChannelError {
    ChannelError::InvalidArgument(format!("channel index overflow past {}", index))
}
