//! SQLite implementation of the Store trait.
//!
//! This is the persistent storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking. Each commit runs in
//! one SQLite transaction.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use hms_kernel_core::{CoreError, EntityAddress, EntityKind};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{RawEntity, Store, WriteBatch, WriteOp};

const UPSERT_ENTITY: &str = "INSERT INTO entities (address, kind, body) VALUES (?1, ?2, ?3)
     ON CONFLICT(address) DO UPDATE SET
         kind = excluded.kind,
         body = excluded.body,
         revision = entities.revision + 1";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("connection mutex: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn row_to_raw(tag: u8, body: Vec<u8>) -> Result<RawEntity> {
    let kind = EntityKind::from_u8(tag).ok_or(CoreError::UnknownKind(tag))?;
    Ok(RawEntity {
        kind,
        body: Bytes::from(body),
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_raw(&self, address: &EntityAddress) -> Result<Option<RawEntity>> {
        let address = *address;
        self.blocking(move |conn| {
            let row: Option<(u8, Vec<u8>)> = conn
                .query_row(
                    "SELECT kind, body FROM entities WHERE address = ?1",
                    params![address.0.as_slice()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            row.map(|(tag, body)| row_to_raw(tag, body)).transpose()
        })
        .await
    }

    async fn contains(&self, address: &EntityAddress) -> Result<bool> {
        let address = *address;
        self.blocking(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM entities WHERE address = ?1",
                    params![address.0.as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let ops = batch.into_ops();
        let n = ops.len();
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            for op in &ops {
                match op {
                    WriteOp::Put {
                        address,
                        kind,
                        body,
                    } => {
                        tx.execute(
                            UPSERT_ENTITY,
                            params![address.0.as_slice(), kind.to_u8(), body.as_ref()],
                        )?;
                    }
                    WriteOp::Delete { address } => {
                        tx.execute(
                            "DELETE FROM entities WHERE address = ?1",
                            params![address.0.as_slice()],
                        )?;
                    }
                }
            }
            tx.commit()?;
            tracing::trace!(ops = n, "committed batch");
            Ok(())
        })
        .await
    }

    async fn count(&self, kind: Option<EntityKind>) -> Result<u64> {
        self.blocking(move |conn| {
            let n: i64 = match kind {
                Some(kind) => conn.query_row(
                    "SELECT COUNT(*) FROM entities WHERE kind = ?1",
                    params![kind.to_u8()],
                    |row| row.get(0),
                )?,
                None => conn.query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))?,
            };
            u64::try_from(n).map_err(|_| StoreError::InvalidData(format!("negative count {}", n)))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use hms_kernel_core::{
        AccountKey, DataHash, HealthRecord, NewRecord, Profile, StoredEntity,
    };

    fn key(b: u8) -> AccountKey {
        AccountKey::from_bytes([b; 32])
    }

    fn record(owner: AccountKey, id: u64) -> HealthRecord {
        HealthRecord::new(
            id,
            owner,
            NewRecord {
                record_type: "lab".into(),
                encrypted_locator: format!("ipfs://rec-{}", id),
                data_hash: DataHash::of(&id.to_le_bytes()),
                metadata: String::new(),
            },
            1_736_870_400,
        )
    }

    #[tokio::test]
    async fn test_commit_and_load() {
        let store = SqliteStore::open_memory().unwrap();
        let mut profile = Profile::new(key(1), 10);
        let id = profile.allocate_record_id(11).unwrap();
        let rec = record(key(1), id);

        let mut batch = WriteBatch::new();
        batch.put(&profile).unwrap();
        batch.put(&rec).unwrap();
        store.commit(batch).await.unwrap();

        let loaded: HealthRecord = store.load(&rec.address()).await.unwrap().unwrap();
        assert_eq!(loaded, rec);
        let loaded: Profile = store.load(&profile.address()).await.unwrap().unwrap();
        assert_eq!(loaded.record_count, 1);
        assert_eq!(store.count(Some(EntityKind::Record)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_bumps_revision() {
        let store = SqliteStore::open_memory().unwrap();
        let mut rec = record(key(1), 0);

        for metadata in ["a", "b", "c"] {
            rec.update_metadata(metadata.into(), 20);
            let mut batch = WriteBatch::new();
            batch.put(&rec).unwrap();
            store.commit(batch).await.unwrap();
        }

        let address = rec.address();
        let revision: i64 = store
            .blocking(move |conn| {
                Ok(conn.query_row(
                    "SELECT revision FROM entities WHERE address = ?1",
                    params![address.0.as_slice()],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(revision, 3);

        let loaded: HealthRecord = store.load(&address).await.unwrap().unwrap();
        assert_eq!(loaded.metadata, "c");
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let store = SqliteStore::open_memory().unwrap();
        let rec = record(key(2), 0);

        let mut batch = WriteBatch::new();
        batch.put(&rec).unwrap();
        store.commit(batch).await.unwrap();
        assert!(store.contains(&rec.address()).await.unwrap());

        let mut batch = WriteBatch::new();
        batch.delete(rec.address());
        batch.delete(EntityAddress::from_bytes([0xee; 32]));
        store.commit(batch).await.unwrap();
        assert!(!store.contains(&rec.address()).await.unwrap());
        assert_eq!(store.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_kind_tag_is_reported() {
        let store = SqliteStore::open_memory().unwrap();
        let address = EntityAddress::from_bytes([7; 32]);
        store
            .blocking(move |conn| {
                conn.execute(
                    "INSERT INTO entities (address, kind, body) VALUES (?1, 99, x'00')",
                    params![address.0.as_slice()],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let result = store.get_raw(&address).await;
        assert!(matches!(
            result,
            Err(StoreError::Codec(CoreError::UnknownKind(99)))
        ));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hms.db");
        let profile = Profile::new(key(3), 42);

        {
            let store = SqliteStore::open(&path).unwrap();
            let mut batch = WriteBatch::new();
            batch.put(&profile).unwrap();
            store.commit(batch).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded: Profile = store.load(&profile.address()).await.unwrap().unwrap();
        assert_eq!(loaded, profile);
    }
}
