//! # Courier Core
//!
//! Pure primitives for Courier channels: key derivation, addresses, message
//! locking and the payload wire format.
//!
//! This crate does no I/O. Every function is a deterministic transform of its
//! inputs, apart from the random mask seed and terminal marker drawn when
//! locking and encoding.
//!
//! ## Key Types
//!
//! - [`Seed`] - Caller-owned root secret
//! - [`ChannelAddress`] - 81-symbol ledger address of one channel slot
//! - [`Tag`] - Ledger-side label attached to submitted bundles
//! - [`MaskSeed`] - Random salt embedded in every locked message
//!
//! ## Channel Protocol
//!
//! Addresses come from [`derive_address`]. Messages are locked with
//! [`lock`] before they leave the process and verified by [`unlock`] when
//! read back. See the [`codec`] module for the byte layout.

pub mod address;
pub mod codec;
pub mod error;
pub mod fragment;
pub mod keys;
pub mod symbols;
pub mod types;

pub use address::{derive_address, ChannelAddress, ADDRESS_LEN};
pub use codec::{injection_position, lock, lock_with_mask_seed, message_checksum, unlock};
pub use error::{CoreError, Result};
pub use fragment::{
    encode_payload, encode_payload_with_marker, reassemble, split_fragments,
    DEFAULT_FRAGMENT_WIDTH,
};
pub use keys::{derive_key, keystream, Keystream, Seed, KEY_LEN};
pub use symbols::{decode_base27, encode_base27, unbiased_symbols, ALPHABET, FILLER};
pub use types::{Checksum, MaskSeed, Tag};
