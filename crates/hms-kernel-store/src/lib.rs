//! # HMS Kernel Store
//!
//! Storage abstraction for the HMS kernel. Entities are stored at their
//! derived addresses behind the [`Store`] trait, with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Typed loading on top of [`Store`]
//! - [`WriteBatch`] - Writes applied by one atomic commit
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hms_kernel_core::{AccountKey, Profile, StoredEntity};
//! use hms_kernel_store::{SqliteStore, Store, StoreExt, WriteBatch};
//!
//! async fn example() {
//!     let store = SqliteStore::open("hms.db").unwrap();
//!
//!     let profile = Profile::new(AccountKey::from_bytes([1; 32]), 0);
//!     let mut batch = WriteBatch::new();
//!     batch.put(&profile).unwrap();
//!     store.commit(batch).await.unwrap();
//!
//!     let loaded: Option<Profile> = store.load(&profile.address()).await.unwrap();
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{RawEntity, Store, StoreExt, WriteBatch, WriteOp};
