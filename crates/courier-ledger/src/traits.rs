//! LedgerClient trait: the seam between the channel protocol and a ledger.
//!
//! The protocol needs exactly two things from a ledger: lookup of entries by
//! address, and submission of a bundle. Transport, signing, proof-of-work and
//! retry policy all live behind this trait.

use async_trait::async_trait;
use courier_core::ChannelAddress;

use crate::error::Result;
use crate::types::{BundleId, LedgerEntry, OutgoingBundle};

/// Async interface to an append-only, address-indexed ledger.
///
/// # Design Notes
///
/// - **Batched lookup**: `find_by_addresses` takes a set of addresses and
///   returns every entry stored at any of them, in no particular order. An
///   empty result is not an error.
/// - **Transient failures**: any `Err` from a lookup is treated by callers as
///   transient and retried.
/// - **Append only**: a successful `submit` never replaces existing entries.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch all entries stored at any of `addresses`.
    async fn find_by_addresses(&self, addresses: &[ChannelAddress]) -> Result<Vec<LedgerEntry>>;

    /// Attach a bundle to the ledger.
    async fn submit(&self, bundle: OutgoingBundle) -> Result<BundleId>;

    /// The form of `address` used on the wire.
    ///
    /// Ledgers that append an integrity suffix to addresses override this.
    fn wire_address(&self, address: &ChannelAddress) -> String {
        address.to_string()
    }
}
