//! # Courier Ledger
//!
//! The ledger seam for Courier channels. The channel protocol only needs to
//! look entries up by address and to submit bundles; everything else about
//! the ledger stays behind the [`LedgerClient`] trait.
//!
//! ## Key Types
//!
//! - [`LedgerClient`] - The async trait the protocol talks to
//! - [`MemoryLedger`] - In-memory simulator with a controllable clock
//! - [`SqliteLedger`] - Persistent local ledger
//! - [`LedgerEntry`] - One stored fragment of a bundle
//! - [`OutgoingBundle`] - A bundle ready for submission
//!
//! ## Usage
//!
//! ```rust,no_run
//! use courier_core::{derive_address, Tag};
//! use courier_ledger::{LedgerClient, OutgoingBundle, SqliteLedger};
//!
//! async fn example() {
//!     let ledger = SqliteLedger::open("ledger.db").unwrap();
//!
//!     let address = derive_address(b"seed", 0);
//!     let bundle = OutgoingBundle::new(address.clone(), Tag::empty(), vec!["ABC9".into()]);
//!     let bundle_id = ledger.submit(bundle).await.unwrap();
//!
//!     let entries = ledger.find_by_addresses(&[address]).await.unwrap();
//!     assert!(entries.iter().any(|e| e.bundle_id == bundle_id));
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::{LedgerError, Result};
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use traits::LedgerClient;
pub use types::{BundleId, EntryRef, LedgerEntry, OutgoingBundle};
