//! Pacing between ledger probes.
//!
//! Index discovery and backward verification wait between consecutive
//! lookups. The wait is a [`Pacer`] so tests can run without real delays.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::DEFAULT_PROBE_DELAY;

/// Waits between consecutive ledger lookups.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Suspend until the next lookup may be issued.
    async fn wait(&self);
}

/// Sleep for a fixed duration on every wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    /// Create a pacer with the given delay.
    pub const fn new(delay: Duration) -> Self {
        Self(delay)
    }

    /// The configured delay.
    pub const fn delay(&self) -> Duration {
        self.0
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_PROBE_DELAY)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Never sleeps; only yields to the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn wait(&self) {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps() {
        let pacer = FixedDelay::default();
        assert_eq!(pacer.delay(), Duration::from_millis(1000));

        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_does_not_advance_time() {
        let start = Instant::now();
        NoDelay.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_pacer_as_trait_object() {
        let pacers: Vec<Box<dyn Pacer>> = vec![
            Box::new(NoDelay),
            Box::new(FixedDelay::new(Duration::from_millis(1))),
        ];
        for pacer in &pacers {
            pacer.wait().await;
        }
    }
}
