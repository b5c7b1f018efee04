//! Ledger configuration.

use hms_kernel_core::FieldLimits;
use hms_kernel_perms::{
    EmergencyPolicy, GrantPolicy, DEFAULT_EMERGENCY_COOLDOWN, DEFAULT_EMERGENCY_WINDOW,
    DEFAULT_MAX_GRANT_DURATION,
};

/// Configuration for the [`Ledger`](crate::Ledger).
///
/// All durations are in seconds.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Byte-length limits on client-supplied strings.
    pub limits: FieldLimits,
    /// Longest grant that may be issued. `None` disables the cap.
    pub max_grant_duration: Option<i64>,
    /// How long an emergency activation authorizes reads. `None` means
    /// until the owner deactivates it.
    pub emergency_window: Option<i64>,
    /// Minimum time between two emergency activations for the same pair.
    /// `None` disables the cooldown.
    pub emergency_cooldown: Option<i64>,
    /// Buffer size of the notification channel.
    pub notification_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            limits: FieldLimits::default(),
            max_grant_duration: Some(DEFAULT_MAX_GRANT_DURATION),
            emergency_window: Some(DEFAULT_EMERGENCY_WINDOW),
            emergency_cooldown: Some(DEFAULT_EMERGENCY_COOLDOWN),
            notification_capacity: 256,
        }
    }
}

impl LedgerConfig {
    pub(crate) fn grant_policy(&self) -> GrantPolicy {
        GrantPolicy {
            max_duration: self.max_grant_duration,
        }
    }

    pub(crate) fn emergency_policy(&self) -> EmergencyPolicy {
        EmergencyPolicy {
            window: self.emergency_window,
            cooldown: self.emergency_cooldown,
        }
    }
}
