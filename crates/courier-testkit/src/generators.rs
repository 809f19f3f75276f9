//! Proptest generators for property-based testing.

use proptest::prelude::*;

use courier_core::{lock_with_mask_seed, MaskSeed, Tag, ALPHABET};

/// Generate seed bytes.
pub fn seed() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=64)
}

/// Generate a non-empty message of at most `max_len` bytes.
pub fn message(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len.max(1))
}

/// Generate a channel index, biased toward small values.
pub fn channel_index() -> impl Strategy<Value = u64> {
    prop_oneof![
        3 => 0u64..1_000,
        1 => any::<u64>(),
    ]
}

/// Generate a mask seed.
pub fn mask_seed() -> impl Strategy<Value = MaskSeed> {
    any::<[u8; 2]>().prop_map(MaskSeed::from_bytes)
}

/// Generate a string of `len` alphabet symbols.
pub fn symbols(len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(0..ALPHABET.len(), len)
        .prop_map(|values| values.into_iter().map(|v| ALPHABET[v] as char).collect())
}

/// Generate a valid tag.
pub fn tag() -> impl Strategy<Value = Tag> {
    "[A-Z9]{0,27}".prop_filter_map("tag", |s| Tag::new(&s).ok())
}

/// Parameters for a reproducible lock.
#[derive(Debug, Clone)]
pub struct LockParams {
    pub seed: Vec<u8>,
    pub message: Vec<u8>,
    pub index: u64,
    pub mask_seed: MaskSeed,
}

impl Arbitrary for LockParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (seed(), message(512), channel_index(), mask_seed())
            .prop_map(|(seed, message, index, mask_seed)| LockParams {
                seed,
                message,
                index,
                mask_seed,
            })
            .boxed()
    }
}

/// Lock a message from parameters.
pub fn locked_from_params(params: &LockParams) -> Vec<u8> {
    lock_with_mask_seed(&params.seed, &params.message, params.index, params.mask_seed)
        .unwrap_or_default()
}

/// A channel whose slots `[0, occupied)` are written, probed from `from`.
#[derive(Debug, Clone)]
pub struct ChannelLayout {
    pub occupied: u64,
    pub from: u64,
}

impl Arbitrary for ChannelLayout {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0u64..300, 0u64..300)
            .prop_map(|(occupied, offset)| ChannelLayout {
                occupied,
                from: if occupied == 0 { 0 } else { offset % occupied },
            })
            .boxed()
    }
}
