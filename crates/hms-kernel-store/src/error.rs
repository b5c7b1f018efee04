//! Error types for the store module.

use hms_kernel_core::{CoreError, ErrorKind};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entity body could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CoreError),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    /// A blocking task failed to complete.
    #[error("blocking task failed: {0}")]
    Task(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// Taxonomy kind. Every store failure is a storage failure.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Storage
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
