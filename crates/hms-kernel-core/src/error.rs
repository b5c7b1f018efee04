//! Error types for the HMS kernel core.

use std::fmt;

use thiserror::Error;

use crate::address::EntityKind;

/// The error taxonomy every kernel error maps onto.
///
/// Callers branch on the kind; messages are for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Duplicate creation (profile, proof, emergency configuration, activation).
    AlreadyExists,
    /// An entity the operation names is absent.
    NotFound,
    /// A grant is past its expiry.
    Expired,
    /// A supplied proof is absent or not valid.
    InvalidProof,
    /// A grant exists but lacks the required permission bit.
    InsufficientPermission,
    /// No authorization path applies, or the signer is the wrong party.
    Unauthorized,
    /// Bad input: durations, self-targeting, field lengths, bitmasks.
    InvalidArgument,
    /// The storage backend failed.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::NotFound => "not found",
            ErrorKind::Expired => "expired",
            ErrorKind::InvalidProof => "invalid proof",
            ErrorKind::InsufficientPermission => "insufficient permission",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// Encoding errors for stored entities.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("unknown entity kind tag: {0}")]
    UnknownKind(u8),
}

impl CoreError {
    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Storage
    }
}

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is {len} bytes, maximum is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("record counter overflow")]
    CounterOverflow,
}

impl ValidationError {
    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}
