//! Error types for the permissions module.

use hms_kernel_core::{AccountKey, ErrorKind, Permissions, ProofHash, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the authorization engine refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DenyReason {
    /// The grant exists but `now >= expires_at`.
    #[error("grant expired at {expires_at}")]
    GrantExpired { expires_at: i64 },

    /// The grant exists but lacks the operation's bit.
    #[error("insufficient permission: requires {required}, granted {granted}")]
    InsufficientPermission {
        required: Permissions,
        granted: Permissions,
    },

    /// The supplied proof is not registered for this owner or is invalid.
    #[error("invalid proof {proof_hash}")]
    InvalidProof { proof_hash: ProofHash },

    /// Emergency access is configured but not currently active.
    #[error("no active emergency access")]
    NoActiveEmergencyAccess,

    /// No authorization path applies.
    #[error("unauthorized access")]
    Unauthorized,
}

impl DenyReason {
    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DenyReason::GrantExpired { .. } => ErrorKind::Expired,
            DenyReason::InsufficientPermission { .. } => ErrorKind::InsufficientPermission,
            DenyReason::InvalidProof { .. } => ErrorKind::InvalidProof,
            DenyReason::NoActiveEmergencyAccess | DenyReason::Unauthorized => {
                ErrorKind::Unauthorized
            }
        }
    }
}

/// Errors that can occur during permission operations.
#[derive(Debug, Error)]
pub enum PermsError {
    /// The authorization engine denied the request.
    #[error("access denied: {0}")]
    Denied(#[from] DenyReason),

    /// Grant duration is zero or negative.
    #[error("invalid duration {0}: must be positive")]
    InvalidDuration(i64),

    /// Grant duration exceeds the configured maximum.
    #[error("duration {duration} exceeds maximum {max}")]
    DurationTooLong { duration: i64, max: i64 },

    /// Owner tried to grant access to themselves.
    #[error("cannot grant access to the owner")]
    InvalidGrantee,

    /// Owner tried to name themselves as emergency contact.
    #[error("owner cannot be their own emergency contact")]
    InvalidEmergencyContact,

    /// Permission bitmask is empty or has unknown bits.
    #[error("invalid permission bitmask {0:#04x}")]
    InvalidPermissions(u8),

    /// No grant exists for the pair.
    #[error("no grant from {owner} to {grantee}")]
    GrantNotFound {
        owner: AccountKey,
        grantee: AccountKey,
    },

    /// A proof with this hash is already registered for the owner.
    #[error("proof {0} already registered")]
    ProofAlreadyRegistered(ProofHash),

    /// Emergency access is already configured for the pair.
    #[error("emergency access already configured for contact {0}")]
    EmergencyAlreadyConfigured(AccountKey),

    /// No emergency access is configured for the pair.
    #[error("emergency access not configured for contact {0}")]
    EmergencyNotConfigured(AccountKey),

    /// Emergency access is already active.
    #[error("emergency access already active")]
    EmergencyAlreadyActive,

    /// The previous activation was too recent.
    #[error("emergency access in cooldown until {ready_at}")]
    EmergencyCooldown { ready_at: i64 },

    /// Only the configured contact may activate.
    #[error("{0} is not the emergency contact")]
    NotEmergencyContact(AccountKey),

    /// Only the owner may perform this operation.
    #[error("{0} is not the owner")]
    NotOwner(AccountKey),

    /// Field validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl PermsError {
    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PermsError::Denied(reason) => reason.kind(),
            PermsError::InvalidDuration(_)
            | PermsError::DurationTooLong { .. }
            | PermsError::InvalidGrantee
            | PermsError::InvalidEmergencyContact
            | PermsError::InvalidPermissions(_)
            | PermsError::Validation(_) => ErrorKind::InvalidArgument,
            PermsError::GrantNotFound { .. } | PermsError::EmergencyNotConfigured(_) => {
                ErrorKind::NotFound
            }
            PermsError::ProofAlreadyRegistered(_)
            | PermsError::EmergencyAlreadyConfigured(_)
            | PermsError::EmergencyAlreadyActive
            | PermsError::EmergencyCooldown { .. } => ErrorKind::AlreadyExists,
            PermsError::NotEmergencyContact(_) | PermsError::NotOwner(_) => {
                ErrorKind::Unauthorized
            }
        }
    }
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_kinds() {
        assert_eq!(
            DenyReason::GrantExpired { expires_at: 0 }.kind(),
            ErrorKind::Expired
        );
        assert_eq!(
            DenyReason::NoActiveEmergencyAccess.kind(),
            ErrorKind::Unauthorized
        );
        let err: PermsError = DenyReason::InvalidProof {
            proof_hash: ProofHash::from_bytes([0; 32]),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidProof);
    }

    #[test]
    fn test_argument_kinds() {
        assert_eq!(PermsError::InvalidDuration(0).kind(), ErrorKind::InvalidArgument);
        assert_eq!(PermsError::InvalidGrantee.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            PermsError::EmergencyAlreadyActive.kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            PermsError::EmergencyCooldown { ready_at: 0 }.kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            PermsError::NotOwner(AccountKey::ZERO).kind(),
            ErrorKind::Unauthorized
        );
    }
}
