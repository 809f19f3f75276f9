//! Message locking: obfuscation and tamper detection for channel payloads.
//!
//! A locked message is the raw message with two injected regions:
//!
//! ```text
//! raw message      m0 m1 m2 m3 m4 ...
//! + checksum       m0 m1 C0 C1 m2 m3 m4 ...        at posChk(len(raw))
//! + mask seed      m0 R0 R1 m1 C0 C1 m2 m3 m4 ...  at posRnd(len(raw) + 2)
//! masked           x  R0 R1 x  x  x  x  x  x  ...  XOR with keystream(R0 R1)
//! ```
//!
//! Both offsets depend only on the seed, the channel index and the buffer
//! length at the time of injection, so the receiver can recompute them from
//! the locked length alone. The mask seed bytes stay in the clear; every
//! other byte is masked.
//!
//! Unlocking undoes the steps in reverse order. Each offset must be
//! recomputed with the same length basis the corresponding lock step used.

use crate::error::{CoreError, Result};
use crate::keys::{derive_key, keystream};
use crate::types::{Checksum, MaskSeed, CHECKSUM_LEN, MASK_SEED_LEN};

/// Smallest possible locked message: one payload byte plus both injected regions.
pub const MIN_LOCKED_LEN: usize = 1 + CHECKSUM_LEN + MASK_SEED_LEN;

/// Compute an injection offset in `[0, length)` for `label`.
pub fn injection_position(seed: &[u8], length: usize, label: &[u8]) -> Result<usize> {
    if length == 0 {
        return Err(CoreError::InvalidArgument(
            "injection position requires a non-empty buffer".into(),
        ));
    }
    let key = derive_key(seed, label);
    Ok(key
        .iter()
        .fold(0usize, |acc, &byte| (acc + usize::from(byte)) % length))
}

/// Compute the checksum of a raw message.
///
/// The message content itself is the derivation label.
pub fn message_checksum(seed: &[u8], message: &[u8]) -> Checksum {
    Checksum::from_key(&derive_key(seed, message))
}

/// Lock `message` for channel slot `index` with a fresh random mask seed.
///
/// Two locks of the same message at the same index produce different bytes
/// (with probability 65535/65536).
pub fn lock(seed: &[u8], message: &[u8], index: u64) -> Result<Vec<u8>> {
    lock_with_mask_seed(seed, message, index, MaskSeed::random())
}

/// Lock `message` with a caller-chosen mask seed.
///
/// Only useful for reproducible test vectors; production callers use [`lock`].
pub fn lock_with_mask_seed(
    seed: &[u8],
    message: &[u8],
    index: u64,
    mask_seed: MaskSeed,
) -> Result<Vec<u8>> {
    let chk_pos = injection_position(seed, message.len(), checksum_label(index).as_bytes())?;
    let checksum = message_checksum(seed, message);
    let with_checksum = inject(message, &checksum.0, chk_pos);

    let mask_pos = injection_position(
        seed,
        with_checksum.len(),
        mask_position_label(index).as_bytes(),
    )?;
    let full = inject(&with_checksum, &mask_seed.0, mask_pos);

    Ok(apply_mask(seed, &full, index, mask_seed, mask_pos))
}

/// Unlock a message locked for channel slot `index`.
///
/// Fails with [`CoreError::Integrity`] if the embedded checksum does not
/// match; no partial message is returned in that case.
pub fn unlock(seed: &[u8], locked: &[u8], index: u64) -> Result<Vec<u8>> {
    if locked.len() < MIN_LOCKED_LEN {
        return Err(CoreError::InvalidArgument(format!(
            "locked message too short: {} bytes, need at least {}",
            locked.len(),
            MIN_LOCKED_LEN
        )));
    }

    // Lock injected the mask seed into a buffer two bytes shorter than this one.
    let mask_pos = injection_position(
        seed,
        locked.len() - MASK_SEED_LEN,
        mask_position_label(index).as_bytes(),
    )?;
    let mask_seed = MaskSeed::from_bytes([locked[mask_pos], locked[mask_pos + 1]]);

    let unmasked = apply_mask(seed, locked, index, mask_seed, mask_pos);
    let (with_checksum, _) = take(&unmasked, mask_pos);

    let chk_pos = injection_position(
        seed,
        with_checksum.len() - CHECKSUM_LEN,
        checksum_label(index).as_bytes(),
    )?;
    let (message, embedded) = take(&with_checksum, chk_pos);

    let expected = message_checksum(seed, &message);
    if expected.0 != embedded {
        return Err(CoreError::Integrity {
            expected: expected.to_hex(),
            actual: hex::encode(embedded),
        });
    }

    Ok(message)
}

fn checksum_label(index: u64) -> String {
    format!("msg_chk_{}", index)
}

fn mask_position_label(index: u64) -> String {
    format!("msg_rnd_mask_{}", index)
}

fn mask_label(index: u64, mask_seed: MaskSeed) -> String {
    format!("random_bytes_lockMessage_{}_{}", index, mask_seed.to_hex())
}

/// Copy `buf` with `bytes` inserted at `pos`.
fn inject(buf: &[u8], bytes: &[u8], pos: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() + bytes.len());
    out.extend_from_slice(&buf[..pos]);
    out.extend_from_slice(bytes);
    out.extend_from_slice(&buf[pos..]);
    out
}

/// Split the two bytes at `pos` out of `buf`.
fn take(buf: &[u8], pos: usize) -> (Vec<u8>, [u8; 2]) {
    let taken = [buf[pos], buf[pos + 1]];
    let mut rest = Vec::with_capacity(buf.len() - 2);
    rest.extend_from_slice(&buf[..pos]);
    rest.extend_from_slice(&buf[pos + 2..]);
    (rest, taken)
}

/// XOR `data` with the message mask, leaving the mask seed region untouched.
fn apply_mask(
    seed: &[u8],
    data: &[u8],
    index: u64,
    mask_seed: MaskSeed,
    mask_pos: usize,
) -> Vec<u8> {
    let label = mask_label(index, mask_seed);
    let plaintext = mask_pos..mask_pos + MASK_SEED_LEN;

    data.iter()
        .zip(keystream(seed, label.as_bytes()))
        .enumerate()
        .map(|(i, (&byte, mask))| {
            if plaintext.contains(&i) {
                byte
            } else {
                byte ^ mask
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SEED: &[u8] = b"test-seed";

    #[test]
    fn test_injection_position_known_values() {
        assert_eq!(injection_position(SEED, 11, b"msg_chk_5").unwrap(), 10);
        assert_eq!(injection_position(SEED, 13, b"msg_rnd_mask_5").unwrap(), 6);
    }

    #[test]
    fn test_injection_position_rejects_zero_length() {
        assert!(matches!(
            injection_position(SEED, 0, b"label"),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_injection_position_single_slot() {
        assert_eq!(injection_position(SEED, 1, b"anything").unwrap(), 0);
    }

    #[test]
    fn test_lock_worked_example() {
        let mask_seed = MaskSeed::from_bytes([0xab, 0xcd]);
        let locked = lock_with_mask_seed(SEED, b"hello world", 5, mask_seed).unwrap();

        assert_eq!(hex::encode(&locked), "1ffa8578113babcd1afaa445010258");
        // Mask seed sits in the clear at posRnd = 6.
        assert_eq!(&locked[6..8], &[0xab, 0xcd]);
        assert_eq!(message_checksum(SEED, b"hello world").to_hex(), "9148");

        assert_eq!(unlock(SEED, &locked, 5).unwrap(), b"hello world");
    }

    #[test]
    fn test_lock_single_byte_message() {
        let locked =
            lock_with_mask_seed(SEED, b"x", 0, MaskSeed::from_bytes([0, 0])).unwrap();
        assert_eq!(hex::encode(&locked), "d92100001a");
        assert_eq!(unlock(SEED, &locked, 0).unwrap(), b"x");
    }

    #[test]
    fn test_lock_rejects_empty_message() {
        assert!(matches!(
            lock(SEED, b"", 0),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unlock_rejects_short_input() {
        assert!(matches!(
            unlock(SEED, &[1, 2, 3, 4], 0),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_lock_does_not_mutate_input() {
        let message = b"immutable".to_vec();
        let before = message.clone();
        let _ = lock(SEED, &message, 1).unwrap();
        assert_eq!(message, before);
    }

    #[test]
    fn test_lock_is_salted_per_call() {
        // Identical locks need the same random mask seed; 20 collisions in a
        // row would be a 2^-320 event.
        let first = lock(SEED, b"same message", 3).unwrap();
        let all_same = (0..20).all(|_| lock(SEED, b"same message", 3).unwrap() == first);
        assert!(!all_same);
    }

    #[test]
    fn test_every_bit_flip_detected() {
        let mask_seed = MaskSeed::from_bytes([0xab, 0xcd]);
        let locked = lock_with_mask_seed(SEED, b"hello world", 5, mask_seed).unwrap();

        for i in (0..locked.len()).filter(|i| !(6..8).contains(i)) {
            for bit in 0..8 {
                let mut tampered = locked.clone();
                tampered[i] ^= 1 << bit;
                let result = unlock(SEED, &tampered, 5);
                assert!(
                    matches!(result, Err(CoreError::Integrity { .. })),
                    "flip of byte {} bit {} went undetected",
                    i,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_unlock_wrong_index_fails() {
        let locked =
            lock_with_mask_seed(SEED, b"indexed message", 7, MaskSeed::from_bytes([1, 2])).unwrap();
        assert!(unlock(SEED, &locked, 8).is_err());
    }

    #[test]
    fn test_unlock_wrong_seed_fails() {
        let locked =
            lock_with_mask_seed(SEED, b"secret message", 7, MaskSeed::from_bytes([1, 2])).unwrap();
        assert!(unlock(b"other-seed", &locked, 7).is_err());
    }

    proptest! {
        #[test]
        fn test_lock_unlock_roundtrip(
            seed in prop::collection::vec(any::<u8>(), 1..64),
            message in prop::collection::vec(any::<u8>(), 1..512),
            index in any::<u64>(),
        ) {
            let locked = lock(&seed, &message, index).unwrap();
            prop_assert_eq!(locked.len(), message.len() + 4);
            prop_assert_eq!(unlock(&seed, &locked, index).unwrap(), message);
        }

        #[test]
        fn test_injection_position_in_bounds(
            seed in prop::collection::vec(any::<u8>(), 0..64),
            length in 1usize..100_000,
            label in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            let pos = injection_position(&seed, length, &label).unwrap();
            prop_assert!(pos < length);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        // A flip outside the mask seed is accepted only when the altered
        // message collides on the 2-byte checksum.
        #[test]
        fn test_bit_flip_outside_mask_seed_detected(
            seed in prop::collection::vec(any::<u8>(), 1..64),
            message in prop::collection::vec(any::<u8>(), 1..256),
            index in any::<u64>(),
            offset in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let locked =
                lock_with_mask_seed(&seed, &message, index, MaskSeed::from_bytes([0x5a, 0xa5]))
                    .unwrap();
            let mask_pos = injection_position(
                &seed,
                message.len() + CHECKSUM_LEN,
                mask_position_label(index).as_bytes(),
            )
            .unwrap();

            let mut byte = offset.index(locked.len() - MASK_SEED_LEN);
            if byte >= mask_pos {
                byte += MASK_SEED_LEN;
            }
            let mut tampered = locked.clone();
            tampered[byte] ^= 1 << bit;

            match unlock(&seed, &tampered, index) {
                Err(e) => prop_assert!(e.is_integrity(), "unexpected error: {}", e),
                Ok(accepted) => {
                    prop_assert_ne!(&accepted, &message);
                    prop_assert_eq!(
                        message_checksum(&seed, &accepted),
                        message_checksum(&seed, &message)
                    );
                }
            }
        }
    }
}
