//! SQLite implementation of the LedgerClient trait.
//!
//! A persistent local ledger for offline development. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use courier_core::{ChannelAddress, Tag};

use crate::error::{LedgerError, Result};
use crate::migration::{self, now_millis};
use crate::traits::LedgerClient;
use crate::types::{BundleId, EntryRef, LedgerEntry, OutgoingBundle};

/// Addresses per `IN (...)` query, kept well below SQLite's variable limit.
const LOOKUP_CHUNK: usize = 500;

const SELECT_ENTRIES: &str = "SELECT address, bundle_id, fragment_index, fragment, tag, \
     timestamp, entry_ref FROM entries";

/// SQLite-based ledger.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Open a ledger database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory ledger database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| LedgerError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }

    /// Delete every entry, as a ledger snapshot would.
    pub async fn prune(&self) -> Result<usize> {
        let removed = self
            .run(|conn| Ok(conn.execute("DELETE FROM entries", [])?))
            .await?;
        tracing::info!(removed, "sqlite ledger pruned");
        Ok(removed)
    }

    /// Number of stored entries.
    pub async fn entry_count(&self) -> Result<u64> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| {
        LedgerError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("mutex poisoned: {}", e)),
        ))
    })
}

/// Columns of one `entries` row, before validation.
struct RawEntry {
    address: String,
    bundle_id: Vec<u8>,
    fragment_index: u32,
    fragment: String,
    tag: String,
    timestamp: i64,
    entry_ref: Vec<u8>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok(RawEntry {
        address: row.get("address")?,
        bundle_id: row.get("bundle_id")?,
        fragment_index: row.get("fragment_index")?,
        fragment: row.get("fragment")?,
        tag: row.get("tag")?,
        timestamp: row.get("timestamp")?,
        entry_ref: row.get("entry_ref")?,
    })
}

impl TryFrom<RawEntry> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(raw: RawEntry) -> Result<Self> {
        let invalid = |column: &str, detail: String| {
            LedgerError::InvalidData(format!("stored {} is invalid: {}", column, detail))
        };
        Ok(LedgerEntry {
            address: ChannelAddress::new(raw.address)
                .map_err(|e| invalid("address", e.to_string()))?,
            bundle_id: BundleId::try_from(raw.bundle_id.as_slice())
                .map_err(|_| invalid("bundle_id", format!("{} bytes", raw.bundle_id.len())))?,
            fragment_index: raw.fragment_index,
            fragment: raw.fragment,
            tag: Tag::new(&raw.tag).map_err(|e| invalid("tag", e.to_string()))?,
            timestamp: raw.timestamp,
            entry_ref: EntryRef::try_from(raw.entry_ref.as_slice())
                .map_err(|_| invalid("entry_ref", format!("{} bytes", raw.entry_ref.len())))?,
        })
    }
}

#[async_trait]
impl LedgerClient for SqliteLedger {
    async fn find_by_addresses(&self, addresses: &[ChannelAddress]) -> Result<Vec<LedgerEntry>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let addresses: Vec<String> = addresses.iter().map(|a| a.to_string()).collect();

        self.run(move |conn| {
            let mut entries = Vec::new();
            for chunk in addresses.chunks(LOOKUP_CHUNK) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!(
                    "{} WHERE address IN ({}) ORDER BY timestamp, bundle_id, fragment_index",
                    SELECT_ENTRIES, placeholders
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(chunk.iter()), read_row)?;
                for row in rows {
                    entries.push(LedgerEntry::try_from(row?)?);
                }
            }
            Ok(entries)
        })
        .await
    }

    async fn submit(&self, bundle: OutgoingBundle) -> Result<BundleId> {
        bundle.validate()?;

        self.run(move |conn| {
            let timestamp = now_millis();
            let bundle_id = bundle.compute_id(timestamp, rand::random());
            let fragments = bundle.fragments.len();
            let entries = bundle.into_entries(bundle_id, timestamp);

            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO entries (entry_ref, bundle_id, fragment_index, address, tag, \
                     fragment, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )?;
                for entry in &entries {
                    stmt.execute(params![
                        entry.entry_ref.0.as_slice(),
                        entry.bundle_id.0.as_slice(),
                        entry.fragment_index,
                        entry.address.as_str(),
                        entry.tag.as_str(),
                        entry.fragment,
                        entry.timestamp,
                    ])?;
                }
            }
            tx.commit()?;

            tracing::debug!(bundle = %bundle_id, fragments, "sqlite ledger attached bundle");
            Ok(bundle_id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::derive_address;

    fn bundle(index: u64, fragments: &[&str]) -> OutgoingBundle {
        OutgoingBundle::new(
            derive_address(b"sqlite", index),
            Tag::new("SQLITE").unwrap(),
            fragments.iter().map(|f| f.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_submit_and_find() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let id = ledger.submit(bundle(0, &["ABC9", "DEF9"])).await.unwrap();

        let entries = ledger
            .find_by_addresses(&[derive_address(b"sqlite", 0)])
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].bundle_id, id);
        assert_eq!(entries[0].fragment_index, 0);
        assert_eq!(entries[0].fragment, "ABC9");
        assert_eq!(entries[1].fragment_index, 1);
        assert_eq!(entries[0].tag, Tag::new("SQLITE").unwrap());
        assert_eq!(entries[1].entry_ref, EntryRef::derive(&id, 1));
    }

    #[tokio::test]
    async fn test_find_empty_and_unknown() {
        let ledger = SqliteLedger::open_memory().unwrap();
        assert!(ledger.find_by_addresses(&[]).await.unwrap().is_empty());
        assert!(ledger
            .find_by_addresses(&[derive_address(b"sqlite", 7)])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_batched_lookup_spans_chunks() {
        let ledger = SqliteLedger::open_memory().unwrap();
        ledger.submit(bundle(3, &["AAAA"])).await.unwrap();
        ledger.submit(bundle(700, &["BBBB"])).await.unwrap();

        let addresses: Vec<_> = (0..800).map(|i| derive_address(b"sqlite", i)).collect();
        let entries = ledger.find_by_addresses(&addresses).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_rejects_malformed_bundle() {
        let ledger = SqliteLedger::open_memory().unwrap();
        assert!(matches!(
            ledger.submit(bundle(0, &["AB", "ABCD"])).await,
            Err(LedgerError::Rejected(_))
        ));
        assert_eq!(ledger.entry_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prune() {
        let ledger = SqliteLedger::open_memory().unwrap();
        ledger.submit(bundle(0, &["AAAA", "BBBB"])).await.unwrap();
        assert_eq!(ledger.prune().await.unwrap(), 2);
        assert_eq!(ledger.entry_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupted_row_is_invalid_data() {
        let ledger = SqliteLedger::open_memory().unwrap();
        let address = derive_address(b"sqlite", 2);
        {
            let conn = ledger.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO entries (entry_ref, bundle_id, fragment_index, address, tag, \
                 fragment, timestamp) VALUES (?1, ?2, 0, ?3, 'not a tag', 'ABC9', 0)",
                params![[7u8; 32].as_slice(), [8u8; 16].as_slice(), address.as_str()],
            )
            .unwrap();
        }

        assert!(matches!(
            ledger.find_by_addresses(&[address]).await,
            Err(LedgerError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        let id = {
            let ledger = SqliteLedger::open(&path).unwrap();
            ledger.submit(bundle(1, &["CCCC"])).await.unwrap()
        };

        let ledger = SqliteLedger::open(&path).unwrap();
        let entries = ledger
            .find_by_addresses(&[derive_address(b"sqlite", 1)])
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].bundle_id, id);
    }
}
