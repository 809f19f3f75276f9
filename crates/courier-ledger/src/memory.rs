//! In-memory implementation of the LedgerClient trait.
//!
//! This is primarily for testing. It behaves like an append-only ledger with
//! a controllable clock, can be pruned to simulate a snapshot, and can be told
//! to fail upcoming calls.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use courier_core::ChannelAddress;

use crate::error::{LedgerError, Result};
use crate::migration::now_millis;
use crate::traits::LedgerClient;
use crate::types::{BundleId, LedgerEntry, OutgoingBundle};

/// In-memory ledger.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
pub struct MemoryLedger {
    inner: RwLock<MemoryLedgerInner>,
}

struct MemoryLedgerInner {
    /// Entries in attachment order.
    entries: Vec<LedgerEntry>,

    /// Current ledger time (Unix ms). Advances by one per submission.
    now: i64,

    /// Submission counter, mixed into bundle ids.
    nonce: u64,

    /// Number of upcoming lookups that fail.
    failing_lookups: u32,

    /// Number of upcoming submissions that fail.
    failing_submits: u32,

    lookups: u64,
    submits: u64,
}

impl MemoryLedger {
    /// Create an empty ledger whose clock starts at the current time.
    pub fn new() -> Self {
        Self::with_clock(now_millis())
    }

    /// Create an empty ledger whose clock starts at `start` (Unix ms).
    pub fn with_clock(start: i64) -> Self {
        Self {
            inner: RwLock::new(MemoryLedgerInner {
                entries: Vec::new(),
                now: start,
                nonce: 0,
                failing_lookups: 0,
                failing_submits: 0,
                lookups: 0,
                submits: 0,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryLedgerInner>> {
        self.inner
            .read()
            .map_err(|e| LedgerError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryLedgerInner>> {
        self.inner
            .write()
            .map_err(|e| LedgerError::Unavailable(format!("lock poisoned: {}", e)))
    }

    /// Current ledger time (Unix ms).
    pub fn now(&self) -> Result<i64> {
        Ok(self.read()?.now)
    }

    /// Set the ledger clock.
    pub fn set_time(&self, now: i64) -> Result<()> {
        self.write()?.now = now;
        Ok(())
    }

    /// Move the ledger clock forward.
    pub fn advance(&self, millis: i64) -> Result<()> {
        let mut inner = self.write()?;
        inner.now = inner.now.saturating_add(millis);
        Ok(())
    }

    /// Drop every entry, as a ledger snapshot would.
    pub fn prune(&self) -> Result<usize> {
        let mut inner = self.write()?;
        let removed = inner.entries.len();
        inner.entries.clear();
        tracing::info!(removed, "memory ledger pruned");
        Ok(removed)
    }

    /// Make the next `count` lookups fail with `Unavailable`.
    pub fn fail_lookups(&self, count: u32) -> Result<()> {
        self.write()?.failing_lookups = count;
        Ok(())
    }

    /// Make the next `count` submissions fail with `Unavailable`.
    pub fn fail_submits(&self, count: u32) -> Result<()> {
        self.write()?.failing_submits = count;
        Ok(())
    }

    /// Attach a raw entry without any validation.
    ///
    /// Lets tests place foreign or corrupted data on the ledger.
    pub fn inject_entry(&self, entry: LedgerEntry) -> Result<()> {
        self.write()?.entries.push(entry);
        Ok(())
    }

    /// Entries stored at `address`, in attachment order.
    pub fn entries_at(&self, address: &ChannelAddress) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .read()?
            .entries
            .iter()
            .filter(|e| &e.address == address)
            .cloned()
            .collect())
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.entries.len())
    }

    /// True if the ledger holds no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.entries.is_empty())
    }

    /// Number of lookups served so far, failed ones included.
    pub fn lookup_count(&self) -> Result<u64> {
        Ok(self.read()?.lookups)
    }

    /// Number of submissions attempted so far, failed ones included.
    pub fn submit_count(&self) -> Result<u64> {
        Ok(self.read()?.submits)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn find_by_addresses(&self, addresses: &[ChannelAddress]) -> Result<Vec<LedgerEntry>> {
        let mut inner = self.write()?;
        inner.lookups += 1;

        if inner.failing_lookups > 0 {
            inner.failing_lookups -= 1;
            return Err(LedgerError::Unavailable("injected lookup failure".into()));
        }

        let wanted: HashSet<&ChannelAddress> = addresses.iter().collect();
        Ok(inner
            .entries
            .iter()
            .filter(|e| wanted.contains(&e.address))
            .cloned()
            .collect())
    }

    async fn submit(&self, bundle: OutgoingBundle) -> Result<BundleId> {
        let mut inner = self.write()?;
        inner.submits += 1;

        if inner.failing_submits > 0 {
            inner.failing_submits -= 1;
            return Err(LedgerError::Unavailable("injected submit failure".into()));
        }

        bundle.validate()?;

        let timestamp = inner.now;
        let nonce = inner.nonce;
        let bundle_id = bundle.compute_id(timestamp, nonce);

        tracing::debug!(
            bundle = %bundle_id,
            fragments = bundle.fragments.len(),
            "memory ledger attached bundle"
        );

        inner.entries.extend(bundle.into_entries(bundle_id, timestamp));
        inner.now += 1;
        inner.nonce += 1;

        Ok(bundle_id)
    }
}
