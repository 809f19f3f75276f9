//! Key derivation: HMAC-SHA256 sub-keys and keystreams.
//!
//! Every other primitive in this crate is built from two functions:
//!
//! - [`derive_key`]: a 32-byte sub-key for a purpose label
//! - [`keystream`]: an unbounded byte sequence for a purpose label, made of
//!   consecutive `derive_key(seed, label || "_" || block)` outputs
//!
//! Both are pure. The byte at any position of a keystream is fixed by
//! `(seed, label)` alone, so independent implementations agree bit for bit.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of a derived key in bytes.
pub const KEY_LEN: usize = 32;

/// Label used to derive the channel seed from a root seed.
pub const CHANNEL_SEED_LABEL: &[u8] = b"address_seed";

/// Derive a 32-byte sub-key for `label`, keyed by `seed`.
pub fn derive_key(seed: &[u8], label: &[u8]) -> [u8; KEY_LEN] {
    let Ok(mut mac) = HmacSha256::new_from_slice(seed) else {
        unreachable!("HMAC-SHA256 accepts keys of any length");
    };
    mac.update(label);
    mac.finalize().into_bytes().into()
}

/// Start a fresh keystream for `label`, keyed by `seed`.
pub fn keystream<'a>(seed: &'a [u8], label: &[u8]) -> Keystream<'a> {
    Keystream {
        seed,
        label: label.to_vec(),
        block: [0u8; KEY_LEN],
        block_index: 0,
        offset: KEY_LEN,
    }
}

/// Lazy, infinite byte sequence derived from `(seed, label)`.
///
/// Blocks are computed on demand; the iterator never returns `None`.
pub struct Keystream<'a> {
    seed: &'a [u8],
    label: Vec<u8>,
    block: [u8; KEY_LEN],
    block_index: u64,
    offset: usize,
}

impl Keystream<'_> {
    fn refill(&mut self) {
        let mut block_label = Vec::with_capacity(self.label.len() + 21);
        block_label.extend_from_slice(&self.label);
        block_label.push(b'_');
        block_label.extend_from_slice(self.block_index.to_string().as_bytes());

        self.block = derive_key(self.seed, &block_label);
        self.block_index += 1;
        self.offset = 0;
    }
}

impl Iterator for Keystream<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.offset == KEY_LEN {
            self.refill();
        }
        let byte = self.block[self.offset];
        self.offset += 1;
        Some(byte)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// A caller-owned root secret.
///
/// `Debug` output never includes the secret bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed(Vec<u8>);

impl Seed {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Derive the channel seed used for addresses and message locking.
    pub fn channel_seed(&self) -> Seed {
        Seed(derive_key(&self.0, CHANNEL_SEED_LABEL).to_vec())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed(<{} bytes>)", self.0.len())
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Seed {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Seed {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let k1 = derive_key(b"test-seed", b"purpose");
        let k2 = derive_key(b"test-seed", b"purpose");
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_derive_key_label_separation() {
        let k1 = derive_key(b"test-seed", b"address_1");
        let k2 = derive_key(b"test-seed", b"address_2");
        assert_ne!(k1, k2);

        let k3 = derive_key(b"other-seed", b"address_1");
        assert_ne!(k1, k3);
    }

    #[test]
    fn test_derive_key_known_value() {
        let key = derive_key(b"test-seed", b"address_seed");
        assert_eq!(
            hex::encode(key),
            "cdf8b5fcd3c2ac1578b7311795b5786a5739e3ac3fcb2061affbca64a60d9f47"
        );
    }

    #[test]
    fn test_keystream_is_concatenated_blocks() {
        let stream: Vec<u8> = keystream(b"seed", b"label").take(KEY_LEN * 3).collect();

        let mut expected = Vec::new();
        expected.extend_from_slice(&derive_key(b"seed", b"label_0"));
        expected.extend_from_slice(&derive_key(b"seed", b"label_1"));
        expected.extend_from_slice(&derive_key(b"seed", b"label_2"));

        assert_eq!(stream, expected);
    }

    #[test]
    fn test_keystream_known_prefix() {
        let prefix: Vec<u8> = keystream(b"test-seed", b"keystream_test").take(40).collect();
        assert_eq!(
            hex::encode(prefix),
            "238d011c6b6a4979da2d16ba69e6c940d0227c98b8801e782fb90b72919ac4a3ea15b5dd243cc75a"
        );
    }

    #[test]
    fn test_keystream_restarts_per_call() {
        let a: Vec<u8> = keystream(b"seed", b"label").take(50).collect();
        let b: Vec<u8> = keystream(b"seed", b"label").take(50).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_debug_is_redacted() {
        let seed = Seed::from("super secret");
        let debug = format!("{:?}", seed);
        assert!(!debug.contains("secret"));
        assert_eq!(debug, "Seed(<12 bytes>)");
    }

    #[test]
    fn test_channel_seed_matches_derivation() {
        let root = Seed::from("test-seed");
        let channel = root.channel_seed();
        assert_eq!(
            channel.as_bytes(),
            &derive_key(b"test-seed", CHANNEL_SEED_LABEL)[..]
        );
    }
}
