//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use hms_kernel_core::{EntityAddress, EntityKind};

use crate::error::{Result, StoreError};
use crate::traits::{RawEntity, Store, WriteBatch, WriteOp};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; a
/// commit holds the write lock for the whole batch.
pub struct MemoryStore {
    inner: RwLock<HashMap<EntityAddress, RawEntity>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<EntityAddress, RawEntity>>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<EntityAddress, RawEntity>>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_raw(&self, address: &EntityAddress) -> Result<Option<RawEntity>> {
        Ok(self.read()?.get(address).cloned())
    }

    async fn contains(&self, address: &EntityAddress) -> Result<bool> {
        Ok(self.read()?.contains_key(address))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut inner = self.write()?;
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { address, kind, body } => {
                    inner.insert(address, RawEntity { kind, body });
                }
                WriteOp::Delete { address } => {
                    inner.remove(&address);
                }
            }
        }
        Ok(())
    }

    async fn count(&self, kind: Option<EntityKind>) -> Result<u64> {
        let inner = self.read()?;
        let n = match kind {
            Some(kind) => inner.values().filter(|raw| raw.kind == kind).count(),
            None => inner.len(),
        };
        Ok(n as u64)
    }
}
