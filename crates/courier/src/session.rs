//! ChannelSession: the write side of a channel.
//!
//! A session owns the channel seed and the write cursor. Sending resolves
//! the next writable slot starting at the cursor, locks the message for that
//! slot, splits it into fragments and submits one bundle.

use std::sync::Arc;

use courier_channel::{ChannelConfig, ChannelRecord, HistoryReader, IndexFinder, Pacer};
use courier_core::{
    derive_address, encode_payload, lock, split_fragments, ChannelAddress, CoreError, Seed, Tag,
};
use courier_ledger::{BundleId, LedgerClient, OutgoingBundle};

use crate::error::{CourierError, Result};

/// A channel bound to a ledger.
///
/// The cursor is the index the next send starts probing from. It is not
/// shared between sessions: two sessions on the same seed can resolve the
/// same slot, and reconciling that is up to the caller.
pub struct ChannelSession<L: ?Sized> {
    /// Channel seed, derived from the root seed.
    seed: Seed,
    ledger: Arc<L>,
    pacer: Arc<dyn Pacer>,
    config: ChannelConfig,
    cursor: u64,
}

impl<L: LedgerClient + ?Sized> ChannelSession<L> {
    /// Open the channel of `root` on `ledger` with the default configuration.
    pub fn new(root: &Seed, ledger: Arc<L>) -> Self {
        let config = ChannelConfig::default();
        Self {
            seed: root.channel_seed(),
            ledger,
            pacer: Arc::new(config.pacer()),
            config,
            cursor: 0,
        }
    }

    /// Replace the configuration. Also resets the pacer to `config.pacer()`.
    pub fn with_config(mut self, config: ChannelConfig) -> Self {
        self.pacer = Arc::new(config.pacer());
        self.config = config;
        self
    }

    /// Replace the pacer.
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Start probing from `index` instead of 0.
    pub fn with_cursor(mut self, index: u64) -> Self {
        self.cursor = index;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// The index the next send starts probing from.
    pub fn current_index(&self) -> u64 {
        self.cursor
    }

    /// Restore a persisted cursor.
    pub fn set_current_index(&mut self, index: u64) {
        self.cursor = index;
    }

    /// Address of channel slot `index`.
    pub fn address(&self, index: u64) -> ChannelAddress {
        derive_address(self.seed.as_bytes(), index)
    }

    /// Address of slot `index` in the form the ledger uses on the wire.
    pub fn wire_address(&self, index: u64) -> String {
        self.ledger.wire_address(&self.address(index))
    }

    fn finder(&self) -> IndexFinder<'_, L> {
        IndexFinder::new(&*self.ledger, &*self.pacer, &self.config)
    }

    fn reader(&self) -> HistoryReader<'_, L> {
        HistoryReader::new(&*self.ledger, &*self.pacer, &self.config)
    }

    /// Find the next writable index without sending anything.
    ///
    /// The result is stored as the new cursor.
    pub async fn resolve_index(&mut self) -> Result<u64> {
        let index = self
            .finder()
            .find_channel_index(self.seed.as_bytes(), self.cursor)
            .await?;
        if index < self.cursor {
            tracing::info!(from = self.cursor, index, "channel restarted after snapshot");
        }
        self.cursor = index;
        Ok(index)
    }

    /// Send `message` to the next writable slot.
    ///
    /// On success the cursor moves past the written slot and the bundle id
    /// is returned. If the ledger refuses the bundle the cursor stays on the
    /// resolved slot so a later send retries it.
    pub async fn send_message(&mut self, tag: &Tag, message: &[u8]) -> Result<BundleId> {
        if message.is_empty() {
            return Err(CoreError::InvalidArgument("message must not be empty".into()).into());
        }

        let index = self.resolve_index().await?;
        let address = self.address(index);

        let locked = lock(self.seed.as_bytes(), message, index)?;
        let fragments = split_fragments(&encode_payload(&locked), self.config.fragment_width)?;
        let fragment_count = fragments.len();
        let bundle = OutgoingBundle::new(address.clone(), tag.clone(), fragments);

        match self.ledger.submit(bundle).await {
            Ok(bundle_id) => {
                self.cursor = index.saturating_add(1);
                tracing::info!(
                    index,
                    address = %self.ledger.wire_address(&address),
                    bundle = %bundle_id,
                    fragments = fragment_count,
                    "message sent"
                );
                Ok(bundle_id)
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "ledger refused bundle");
                Err(CourierError::Submission(e))
            }
        }
    }

    /// Send UTF-8 text.
    pub async fn send_text(&mut self, tag: &Tag, text: &str) -> Result<BundleId> {
        self.send_message(tag, text.as_bytes()).await
    }

    /// The most recent records, at least `page_size` of them if the channel
    /// holds that many.
    pub async fn history(&self, page_size: usize) -> Result<Vec<ChannelRecord>> {
        Ok(self
            .reader()
            .channel_history(self.seed.as_bytes(), None, page_size)
            .await?)
    }

    /// Records below `index`, read backward page by page.
    pub async fn history_from(&self, index: u64, page_size: usize) -> Result<Vec<ChannelRecord>> {
        Ok(self
            .reader()
            .channel_history(self.seed.as_bytes(), Some(index), page_size)
            .await?)
    }

    /// Records stored at `indexes`.
    pub async fn read(&self, indexes: &[u64]) -> Result<Vec<ChannelRecord>> {
        Ok(self
            .reader()
            .data_list_from_indexes(self.seed.as_bytes(), indexes)
            .await?)
    }

    /// Records stored at `[start, start + count)`.
    pub async fn read_range(&self, start: u64, count: u64) -> Result<Vec<ChannelRecord>> {
        Ok(self
            .reader()
            .data_list(self.seed.as_bytes(), start, count)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_channel::NoDelay;
    use courier_ledger::{LedgerError, MemoryLedger};

    fn session(ledger: &Arc<MemoryLedger>) -> ChannelSession<MemoryLedger> {
        ChannelSession::new(&Seed::from("session-root"), ledger.clone())
            .with_pacer(Arc::new(NoDelay))
    }

    #[tokio::test]
    async fn test_send_advances_cursor() {
        let ledger = Arc::new(MemoryLedger::with_clock(0));
        let mut session = session(&ledger);

        session.send_text(&Tag::empty(), "first").await.unwrap();
        session.send_text(&Tag::empty(), "second").await.unwrap();

        assert_eq!(session.current_index(), 2);
        assert_eq!(ledger.entries_at(&session.address(1)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_uses_channel_seed() {
        let ledger = Arc::new(MemoryLedger::with_clock(0));
        let mut session = session(&ledger);
        session.send_text(&Tag::empty(), "hello").await.unwrap();

        let root_address = derive_address(b"session-root", 0);
        assert!(ledger.entries_at(&root_address).unwrap().is_empty());
        assert_eq!(
            session.address(0),
            derive_address(Seed::from("session-root").channel_seed().as_bytes(), 0)
        );
    }

    #[tokio::test]
    async fn test_restored_cursor_resumes_channel() {
        let ledger = Arc::new(MemoryLedger::with_clock(0));
        let mut first = session(&ledger);
        for text in ["a", "b", "c"] {
            first.send_text(&Tag::empty(), text).await.unwrap();
        }
        let saved = first.current_index();

        let mut restored = session(&ledger).with_cursor(saved);
        assert_eq!(restored.current_index(), 3);

        let lookups = ledger.lookup_count().unwrap();
        restored.send_text(&Tag::empty(), "d").await.unwrap();
        assert_eq!(restored.current_index(), 4);
        // Snapshot check at 0, then a single probe of slot 3.
        assert_eq!(ledger.lookup_count().unwrap() - lookups, 2);

        let records = restored.read(&[3]).await.unwrap();
        assert_eq!(records[0].text(), Some("d"));
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_before_lookup() {
        let ledger = Arc::new(MemoryLedger::with_clock(0));
        let mut session = session(&ledger);

        let result = session.send_message(&Tag::empty(), b"").await;
        assert!(matches!(
            result,
            Err(CourierError::Core(CoreError::InvalidArgument(_)))
        ));
        assert_eq!(ledger.lookup_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_resolved_index() {
        let ledger = Arc::new(MemoryLedger::with_clock(0));
        let mut session = session(&ledger);
        session.send_text(&Tag::empty(), "one").await.unwrap();
        session.send_text(&Tag::empty(), "two").await.unwrap();
        session.set_current_index(0);

        ledger.fail_submits(1).unwrap();
        let result = session.send_text(&Tag::empty(), "three").await;

        assert!(matches!(
            result,
            Err(CourierError::Submission(LedgerError::Unavailable(_)))
        ));
        assert_eq!(session.current_index(), 2);

        session.send_text(&Tag::empty(), "three").await.unwrap();
        assert_eq!(session.current_index(), 3);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_fast() {
        let ledger = Arc::new(MemoryLedger::with_clock(0));
        let mut session = session(&ledger)
            .with_config(ChannelConfig::default().with_backward_batch(0))
            .with_pacer(Arc::new(NoDelay));

        let result = session.send_text(&Tag::empty(), "x").await;
        assert!(matches!(result, Err(CourierError::Channel(_))));
        assert_eq!(ledger.submit_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wire_address_defaults_to_address() {
        let ledger = Arc::new(MemoryLedger::with_clock(0));
        let session = session(&ledger);
        assert_eq!(session.wire_address(4), session.address(4).to_string());
    }
}
