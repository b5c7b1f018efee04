//! Grant issue and revoke rules.
//!
//! A grant is a time-bounded delegation from an owner to one grantee. At
//! most one grant exists per pair: issuing again replaces the previous
//! grant outright, and revoking removes it from storage.

use hms_kernel_core::{AccessGrant, AccountKey, Permissions};

use crate::error::{PermsError, Result};

/// Default maximum grant duration: 365 days.
pub const DEFAULT_MAX_GRANT_DURATION: i64 = 365 * 24 * 60 * 60;

/// Limits applied when issuing grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantPolicy {
    /// Longest allowed duration in seconds. `None` disables the cap.
    pub max_duration: Option<i64>,
}

impl Default for GrantPolicy {
    fn default() -> Self {
        Self {
            max_duration: Some(DEFAULT_MAX_GRANT_DURATION),
        }
    }
}

/// Build the grant `owner` issues to `grantee` at `now`.
///
/// The result replaces any existing grant for the pair; nothing about the
/// previous grant carries over.
pub fn issue_grant(
    owner: AccountKey,
    grantee: AccountKey,
    duration: i64,
    permissions: Permissions,
    now: i64,
    policy: &GrantPolicy,
) -> Result<AccessGrant> {
    if grantee == owner {
        return Err(PermsError::InvalidGrantee);
    }
    if duration <= 0 {
        return Err(PermsError::InvalidDuration(duration));
    }
    if let Some(max) = policy.max_duration {
        if duration > max {
            return Err(PermsError::DurationTooLong { duration, max });
        }
    }
    if !permissions.is_well_formed() {
        return Err(PermsError::InvalidPermissions(permissions.bits()));
    }

    Ok(AccessGrant {
        owner,
        grantee,
        expires_at: now.saturating_add(duration),
        permissions,
        created_at: now,
        last_updated: now,
    })
}

/// Check that a grant exists for revocation and return it.
pub fn revoke_grant(
    owner: AccountKey,
    grantee: AccountKey,
    existing: Option<AccessGrant>,
) -> Result<AccessGrant> {
    existing.ok_or(PermsError::GrantNotFound { owner, grantee })
}
