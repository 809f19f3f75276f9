//! # Courier Testkit
//!
//! Testing utilities for Courier.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed inputs with expected key, address, base-27 and lock outputs
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A seeded channel on a memory ledger, plus a counting pacer
//!
//! ## Golden Vectors
//!
//! Any implementation of the channel primitives must reproduce these exactly:
//!
//! ```rust
//! use courier_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed, detail) in verify_all_vectors() {
//!     assert!(passed, "{}: {}", name, detail);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use courier_testkit::generators::{locked_from_params, LockParams};
//!
//! proptest! {
//!     #[test]
//!     fn locked_grows_by_four(params: LockParams) {
//!         let locked = locked_from_params(&params);
//!         prop_assert_eq!(locked.len(), params.message.len() + 4);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use courier_testkit::fixtures::ChannelFixture;
//!
//! # async fn example() {
//! let fixture = ChannelFixture::with_seed("alice");
//! fixture.occupy(0..3).await;
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fixture_message, init_tracing, ChannelFixture, RecordingPacer, FIXTURE_EPOCH};
pub use generators::{locked_from_params, ChannelLayout, LockParams};
pub use vectors::{verify_all_vectors, GoldenSeed};
