//! Store trait: the abstract interface for entity persistence.
//!
//! Entities live at their derived [`EntityAddress`] as a kind tag plus a
//! CBOR body. Writes are grouped into a [`WriteBatch`] and applied by a
//! single [`Store::commit`], which is all-or-nothing.

use async_trait::async_trait;
use bytes::Bytes;
use hms_kernel_core::{decode_entity, encode_entity, CoreError, EntityAddress, EntityKind, StoredEntity};

use crate::error::Result;

/// An entity as stored: its kind tag and encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntity {
    pub kind: EntityKind,
    pub body: Bytes,
}

impl RawEntity {
    /// Decode into a concrete entity, checking the kind tag.
    pub fn decode<T: StoredEntity>(&self) -> std::result::Result<T, CoreError> {
        decode_entity(self.kind, &self.body)
    }
}

/// A single write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite the entity at `address`.
    Put {
        address: EntityAddress,
        kind: EntityKind,
        body: Bytes,
    },
    /// Remove the entity at `address`. Removing an absent entity is a no-op.
    Delete { address: EntityAddress },
}

impl WriteOp {
    /// The address this op touches.
    pub fn address(&self) -> &EntityAddress {
        match self {
            WriteOp::Put { address, .. } | WriteOp::Delete { address } => address,
        }
    }
}

/// An ordered set of writes applied atomically.
///
/// Later ops on the same address win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `entity` and queue it at its own address.
    pub fn put<T: StoredEntity>(&mut self, entity: &T) -> std::result::Result<(), CoreError> {
        let body = encode_entity(entity)?;
        self.ops.push(WriteOp::Put {
            address: entity.address(),
            kind: T::KIND,
            body: Bytes::from(body),
        });
        Ok(())
    }

    /// Queue removal of the entity at `address`.
    pub fn delete(&mut self, address: EntityAddress) {
        self.ops.push(WriteOp::Delete { address });
    }

    /// Number of queued ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The queued ops in order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Consume the batch.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// The Store trait: async interface for entity persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// Implementations must make [`Store::commit`] atomic: after it returns,
/// either every op in the batch is visible or none is, and concurrent
/// readers never observe a partially applied batch.
#[async_trait]
pub trait Store: Send + Sync {
    /// Get the raw entity at an address.
    async fn get_raw(&self, address: &EntityAddress) -> Result<Option<RawEntity>>;

    /// Check whether anything is stored at an address.
    async fn contains(&self, address: &EntityAddress) -> Result<bool>;

    /// Apply a batch atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<()>;

    /// Count stored entities, optionally of one kind.
    async fn count(&self, kind: Option<EntityKind>) -> Result<u64>;
}

/// Extension trait for typed access.
pub trait StoreExt: Store {
    /// Load and decode the entity at `address`.
    ///
    /// Fails with a codec error if the stored kind is not `T::KIND`.
    fn load<T: StoredEntity>(
        &self,
        address: &EntityAddress,
    ) -> impl std::future::Future<Output = Result<Option<T>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn load<T: StoredEntity>(&self, address: &EntityAddress) -> Result<Option<T>> {
        match self.get_raw(address).await? {
            Some(raw) => Ok(Some(raw.decode()?)),
            None => Ok(None),
        }
    }
}
