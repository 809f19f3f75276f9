//! # Courier Channel
//!
//! Channel index discovery and history reading on top of a [`LedgerClient`].
//!
//! ## Overview
//!
//! A channel is the sequence of ledger addresses `derive_address(seed, 0)`,
//! `derive_address(seed, 1)`, ... Writers fill slots in order, so the next
//! writable slot is the first empty one. The ledger can prune old data
//! (a snapshot), which empties index 0 and restarts the channel.
//!
//! ## Key Types
//!
//! - [`IndexFinder`] - Locates the next writable (or next matching) index
//! - [`HistoryReader`] - Reads and verifies records from channel slots
//! - [`ChannelRecord`] - One verified message
//! - [`ChannelConfig`] - Probe delay, skip step, batch and page sizes
//! - [`Pacer`] - Wait policy between ledger lookups
//!
//! ## Usage
//!
//! ```rust,no_run
//! use courier_channel::{ChannelConfig, HistoryReader, IndexFinder};
//! use courier_ledger::MemoryLedger;
//!
//! async fn example() {
//!     let ledger = MemoryLedger::new();
//!     let config = ChannelConfig::default();
//!     let pacer = config.pacer();
//!
//!     let next = IndexFinder::new(&ledger, &pacer, &config)
//!         .find_channel_index(b"channel seed", 0)
//!         .await
//!         .unwrap();
//!
//!     let records = HistoryReader::new(&ledger, &pacer, &config)
//!         .channel_history(b"channel seed", Some(next), config.page_size)
//!         .await
//!         .unwrap();
//!     println!("{} records before index {}", records.len(), next);
//! }
//! ```
//!
//! [`LedgerClient`]: courier_ledger::LedgerClient

pub mod config;
pub mod error;
pub mod finder;
pub mod history;
pub mod pacing;

pub use config::ChannelConfig;
pub use error::{ChannelError, Result};
pub use finder::{empty_slot, IndexFinder};
pub use history::{ChannelRecord, HistoryReader};
pub use pacing::{FixedDelay, NoDelay, Pacer};
