//! Error types for the Ledger.

use hms_kernel_core::{AccountKey, CoreError, ErrorKind, ValidationError};
use hms_kernel_perms::{DenyReason, PermsError};
use hms_kernel_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Entity encoding error.
    #[error("encoding error: {0}")]
    Core(#[from] CoreError),

    /// Permission error, including authorization denials.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// Profile already exists.
    #[error("profile already exists: {0}")]
    ProfileExists(AccountKey),

    /// Profile not found.
    #[error("profile not found: {0}")]
    ProfileNotFound(AccountKey),

    /// Record id not allocated, or no stored record behind it.
    #[error("record {record_id} not found for {owner}")]
    RecordNotFound { owner: AccountKey, record_id: u64 },

    /// Record is soft-deleted and can no longer be updated.
    #[error("record {record_id} of {owner} is deleted")]
    RecordDeleted { owner: AccountKey, record_id: u64 },
}

impl LedgerError {
    /// Taxonomy kind. Callers branch on this rather than on messages.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(e) => e.kind(),
            LedgerError::Store(e) => e.kind(),
            LedgerError::Core(e) => e.kind(),
            LedgerError::Permission(e) => e.kind(),
            LedgerError::ProfileExists(_) => ErrorKind::AlreadyExists,
            LedgerError::ProfileNotFound(_)
            | LedgerError::RecordNotFound { .. }
            | LedgerError::RecordDeleted { .. } => ErrorKind::NotFound,
        }
    }

    /// The denial reason, if this is an authorization denial.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            LedgerError::Permission(PermsError::Denied(reason)) => Some(*reason),
            _ => None,
        }
    }
}

impl From<DenyReason> for LedgerError {
    fn from(reason: DenyReason) -> Self {
        LedgerError::Permission(PermsError::Denied(reason))
    }
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
