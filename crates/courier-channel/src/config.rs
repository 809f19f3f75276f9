//! Channel configuration.

use std::time::Duration;

use courier_core::DEFAULT_FRAGMENT_WIDTH;

use crate::error::{ChannelError, Result};
use crate::pacing::FixedDelay;

/// Default wait between consecutive ledger probes.
pub const DEFAULT_PROBE_DELAY: Duration = Duration::from_millis(1000);

/// Default unit of the forward skip during index discovery.
pub const DEFAULT_SKIP_STEP: u64 = 25;

/// Default number of indices checked per backward-verification lookup.
pub const DEFAULT_BACKWARD_BATCH: usize = 10;

/// Default minimum number of records returned by a history read.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Tuning knobs for channel discovery, reading and sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Wait between consecutive ledger lookups.
    pub probe_delay: Duration,
    /// Forward skip unit; the n-th skip is `ceil(n / 2) * skip_step`.
    pub skip_step: u64,
    /// Indices per backward-verification lookup.
    pub backward_batch: usize,
    /// Records per history page.
    pub page_size: usize,
    /// Payload fragment width in symbols.
    pub fragment_width: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            probe_delay: DEFAULT_PROBE_DELAY,
            skip_step: DEFAULT_SKIP_STEP,
            backward_batch: DEFAULT_BACKWARD_BATCH,
            page_size: DEFAULT_PAGE_SIZE,
            fragment_width: DEFAULT_FRAGMENT_WIDTH,
        }
    }
}

impl ChannelConfig {
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn with_skip_step(mut self, step: u64) -> Self {
        self.skip_step = step;
        self
    }

    pub fn with_backward_batch(mut self, batch: usize) -> Self {
        self.backward_batch = batch;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_fragment_width(mut self, width: usize) -> Self {
        self.fragment_width = width;
        self
    }

    /// The pacer implied by `probe_delay`.
    pub fn pacer(&self) -> FixedDelay {
        FixedDelay::new(self.probe_delay)
    }

    /// Reject zero-valued sizes.
    pub fn validate(&self) -> Result<()> {
        let zero = [
            ("skip_step", self.skip_step == 0),
            ("backward_batch", self.backward_batch == 0),
            ("page_size", self.page_size == 0),
            ("fragment_width", self.fragment_width == 0),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((name, _)) => Err(ChannelError::InvalidArgument(format!(
                "{} must be non-zero",
                name
            ))),
            None => Ok(()),
        }
    }
}
