//! Emergency access transitions.
//!
//! An owner names a contact. Only that contact can switch the override on,
//! and only the owner can switch it off. Configuration never overwrites an
//! existing relationship.

use hms_kernel_core::{AccountKey, EmergencyAccess};

use crate::error::{PermsError, Result};

/// Default activation window: 7 days.
pub const DEFAULT_EMERGENCY_WINDOW: i64 = 7 * 24 * 60 * 60;

/// Default minimum gap between two activations: 24 hours.
pub const DEFAULT_EMERGENCY_COOLDOWN: i64 = 24 * 60 * 60;

/// Limits applied to emergency activations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyPolicy {
    /// How long an activation authorizes reads, in seconds. `None` means
    /// until deactivated.
    pub window: Option<i64>,
    /// Minimum time between the start of one activation and the next.
    /// `None` disables the cooldown.
    pub cooldown: Option<i64>,
}

impl Default for EmergencyPolicy {
    fn default() -> Self {
        Self {
            window: Some(DEFAULT_EMERGENCY_WINDOW),
            cooldown: Some(DEFAULT_EMERGENCY_COOLDOWN),
        }
    }
}

/// Create a new, inactive relationship.
pub fn configure(
    existing: Option<&EmergencyAccess>,
    owner: AccountKey,
    contact: AccountKey,
    now: i64,
) -> Result<EmergencyAccess> {
    if contact == owner {
        return Err(PermsError::InvalidEmergencyContact);
    }
    if existing.is_some() {
        return Err(PermsError::EmergencyAlreadyConfigured(contact));
    }
    Ok(EmergencyAccess::new(owner, contact, now))
}

/// Switch the override on. `actor` must be the configured contact.
///
/// An activation whose window has lapsed may be renewed; one that is still
/// live may not. A new activation must also wait out the cooldown, counted
/// from the start of the previous one, even if the owner deactivated it.
pub fn activate(
    existing: Option<EmergencyAccess>,
    actor: AccountKey,
    contact: AccountKey,
    reason: String,
    now: i64,
    policy: &EmergencyPolicy,
) -> Result<EmergencyAccess> {
    if actor != contact {
        return Err(PermsError::NotEmergencyContact(actor));
    }
    let mut access = existing.ok_or(PermsError::EmergencyNotConfigured(contact))?;
    if access.is_active_at(now) {
        return Err(PermsError::EmergencyAlreadyActive);
    }
    if let (Some(last), Some(cooldown)) = (access.last_activated, policy.cooldown) {
        let ready_at = last.saturating_add(cooldown);
        if now < ready_at {
            return Err(PermsError::EmergencyCooldown { ready_at });
        }
    }
    access.activate(reason, actor, now, policy.window);
    Ok(access)
}

/// Switch the override off. `actor` must be the owner.
pub fn deactivate(
    existing: Option<EmergencyAccess>,
    actor: AccountKey,
    owner: AccountKey,
    contact: AccountKey,
) -> Result<EmergencyAccess> {
    if actor != owner {
        return Err(PermsError::NotOwner(actor));
    }
    let mut access = existing.ok_or(PermsError::EmergencyNotConfigured(contact))?;
    access.deactivate();
    Ok(access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hms_kernel_core::ErrorKind;

    fn owner() -> AccountKey {
        AccountKey::from_bytes([1; 32])
    }

    fn contact() -> AccountKey {
        AccountKey::from_bytes([2; 32])
    }

    #[test]
    fn test_configure() {
        let access = configure(None, owner(), contact(), 10).unwrap();
        assert!(!access.is_active);
        assert_eq!(access.created_at, 10);

        let err = configure(Some(&access), owner(), contact(), 11).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err = configure(None, owner(), owner(), 11).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_only_contact_activates() {
        let access = configure(None, owner(), contact(), 0).unwrap();
        let policy = EmergencyPolicy::default();

        let err = activate(
            Some(access.clone()),
            owner(),
            contact(),
            "r".into(),
            5,
            &policy,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let active = activate(Some(access), contact(), contact(), "stroke".into(), 5, &policy)
            .unwrap();
        assert!(active.is_active_at(5));
        assert_eq!(active.activated_by, Some(contact()));
        assert_eq!(active.expires_at, Some(5 + DEFAULT_EMERGENCY_WINDOW));
    }

    #[test]
    fn test_activate_unconfigured() {
        let err = activate(
            None,
            contact(),
            contact(),
            "r".into(),
            0,
            &EmergencyPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_double_activation_and_renewal() {
        let policy = EmergencyPolicy {
            window: Some(100),
            cooldown: None,
        };
        let access = configure(None, owner(), contact(), 0).unwrap();
        let active = activate(Some(access), contact(), contact(), "a".into(), 10, &policy).unwrap();

        let err = activate(
            Some(active.clone()),
            contact(),
            contact(),
            "b".into(),
            50,
            &policy,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let renewed = activate(Some(active), contact(), contact(), "b".into(), 110, &policy)
            .unwrap();
        assert_eq!(renewed.expires_at, Some(210));
        assert_eq!(renewed.activation_reason, "b");
    }

    #[test]
    fn test_cooldown_after_deactivation() {
        let policy = EmergencyPolicy {
            window: Some(1_000),
            cooldown: Some(100),
        };
        let access = configure(None, owner(), contact(), 0).unwrap();
        let active = activate(Some(access), contact(), contact(), "a".into(), 10, &policy).unwrap();
        let off = deactivate(Some(active), owner(), owner(), contact()).unwrap();

        let err = activate(Some(off.clone()), contact(), contact(), "b".into(), 11, &policy)
            .unwrap_err();
        assert!(matches!(err, PermsError::EmergencyCooldown { ready_at: 110 }));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err = activate(Some(off.clone()), contact(), contact(), "b".into(), 109, &policy)
            .unwrap_err();
        assert!(matches!(err, PermsError::EmergencyCooldown { .. }));

        let again = activate(Some(off), contact(), contact(), "b".into(), 110, &policy).unwrap();
        assert_eq!(again.last_activated, Some(110));
    }

    #[test]
    fn test_first_activation_has_no_cooldown() {
        let access = configure(None, owner(), contact(), 0).unwrap();
        let active = activate(
            Some(access),
            contact(),
            contact(),
            "a".into(),
            1,
            &EmergencyPolicy::default(),
        )
        .unwrap();
        assert!(active.is_active_at(1));
    }

    #[test]
    fn test_only_owner_deactivates() {
        let policy = EmergencyPolicy::default();
        let access = configure(None, owner(), contact(), 0).unwrap();
        let active = activate(Some(access), contact(), contact(), "r".into(), 1, &policy).unwrap();

        let err = deactivate(Some(active.clone()), contact(), owner(), contact()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let off = deactivate(Some(active), owner(), owner(), contact()).unwrap();
        assert!(!off.is_active);
        assert_eq!(off.activation_reason, "r");
    }
}
