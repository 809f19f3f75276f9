//! # Courier
//!
//! Private, addressable message channels over an append-only ledger.
//!
//! ## Overview
//!
//! A secret root seed yields an unbounded sequence of pseudorandom ledger
//! addresses. Messages are written to those addresses in index order, each
//! one locked with a seed-derived checksum and mask so that only holders of
//! the seed can find, read and verify them.
//!
//! - **Channel seed**: derived from the root seed, never transmitted
//! - **Slot**: the ledger address for one channel index
//! - **Cursor**: the index the next send starts probing from
//! - **Snapshot**: the ledger pruned old data; the channel restarts at 0
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use courier::{ChannelSession, Seed, Tag};
//! use courier::ledger::SqliteLedger;
//!
//! async fn example() {
//!     let ledger = Arc::new(SqliteLedger::open("ledger.db").unwrap());
//!     let mut session = ChannelSession::new(&Seed::from("my secret"), ledger);
//!
//!     let bundle_id = session.send_text(&Tag::empty(), "hello").await.unwrap();
//!     println!("sent {} at index {}", bundle_id, session.current_index() - 1);
//!
//!     for record in session.history(15).await.unwrap() {
//!         println!("{}: {:?}", record.index, record.text());
//!     }
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `courier::core` - Keys, addresses, message locking, wire format
//! - `courier::ledger` - The ledger trait and its memory and SQLite backends
//! - `courier::channel` - Index discovery and history reading

pub mod error;
pub mod session;

pub use courier_channel as channel;
pub use courier_core as core;
pub use courier_ledger as ledger;

pub use error::{CourierError, Result};
pub use session::ChannelSession;

pub use courier_channel::{ChannelConfig, ChannelRecord, FixedDelay, NoDelay, Pacer};
pub use courier_core::{derive_address, lock, unlock, ChannelAddress, Seed, Tag};
pub use courier_ledger::{BundleId, LedgerClient, MemoryLedger, SqliteLedger};
