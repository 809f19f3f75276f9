//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::filter::LevelFilter;

use courier_channel::Pacer;
use courier_core::{
    derive_address, encode_payload, lock, split_fragments, ChannelAddress, Seed, Tag,
    DEFAULT_FRAGMENT_WIDTH,
};
use courier_ledger::{BundleId, LedgerClient, MemoryLedger, OutgoingBundle};

/// Start time of fixture ledgers (Unix ms).
pub const FIXTURE_EPOCH: i64 = 1_700_000_000_000;

/// A root seed and a memory ledger to write its channel to.
pub struct ChannelFixture {
    pub seed: Seed,
    pub ledger: Arc<MemoryLedger>,
}

impl ChannelFixture {
    /// Create a fixture with a random root seed.
    pub fn new() -> Self {
        let bytes: [u8; 32] = rand::random();
        Self::with_root(Seed::new(bytes.to_vec()))
    }

    /// Create a fixture with a deterministic root seed.
    pub fn with_seed(root: &str) -> Self {
        Self::with_root(Seed::from(root))
    }

    fn with_root(seed: Seed) -> Self {
        Self {
            seed,
            ledger: Arc::new(MemoryLedger::with_clock(FIXTURE_EPOCH)),
        }
    }

    /// The channel seed derived from the root seed.
    pub fn channel_seed(&self) -> Seed {
        self.seed.channel_seed()
    }

    /// Address of channel slot `index`.
    pub fn address(&self, index: u64) -> ChannelAddress {
        derive_address(self.channel_seed().as_bytes(), index)
    }

    /// Write `message` to slot `index` the way a session would.
    pub async fn write_message(&self, index: u64, message: &[u8]) -> BundleId {
        let seed = self.channel_seed();
        let fragments = lock(seed.as_bytes(), message, index)
            .and_then(|locked| split_fragments(&encode_payload(&locked), DEFAULT_FRAGMENT_WIDTH))
            .unwrap_or_else(|e| panic!("fixture message for slot {} is invalid: {}", index, e));
        let bundle = OutgoingBundle::new(self.address(index), Tag::empty(), fragments);
        match self.ledger.submit(bundle).await {
            Ok(id) => id,
            Err(e) => panic!("fixture write to slot {} failed: {}", index, e),
        }
    }

    /// Fill `indexes` with `"fixture message {i}"`.
    pub async fn occupy(&self, indexes: Range<u64>) {
        for index in indexes {
            self.write_message(index, fixture_message(index).as_bytes())
                .await;
        }
    }
}

impl Default for ChannelFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The message [`ChannelFixture::occupy`] writes to slot `index`.
pub fn fixture_message(index: u64) -> String {
    format!("fixture message {}", index)
}

/// A pacer that never sleeps and counts how often it was asked to wait.
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    waits: Arc<AtomicUsize>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of waits so far.
    pub fn wait_count(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn wait(&self) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }
}

/// Install a tracing subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::DEBUG)
        .try_init();
}
