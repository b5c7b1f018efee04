//! Field length validation for client-supplied strings.

use crate::entity::NewRecord;
use crate::error::ValidationError;

/// Maximum record type length in bytes.
pub const MAX_RECORD_TYPE_LEN: usize = 32;

/// Maximum encrypted locator length in bytes.
pub const MAX_LOCATOR_LEN: usize = 128;

/// Maximum metadata length in bytes.
pub const MAX_METADATA_LEN: usize = 256;

/// Maximum emergency activation reason length in bytes.
pub const MAX_REASON_LEN: usize = 256;

/// Byte-length limits applied to string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub record_type: usize,
    pub encrypted_locator: usize,
    pub metadata: usize,
    pub activation_reason: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            record_type: MAX_RECORD_TYPE_LEN,
            encrypted_locator: MAX_LOCATOR_LEN,
            metadata: MAX_METADATA_LEN,
            activation_reason: MAX_REASON_LEN,
        }
    }
}

impl FieldLimits {
    /// Validate every field of a new record.
    pub fn check_record(&self, record: &NewRecord) -> Result<(), ValidationError> {
        check_len("record_type", &record.record_type, self.record_type)?;
        check_len(
            "encrypted_locator",
            &record.encrypted_locator,
            self.encrypted_locator,
        )?;
        self.check_metadata(&record.metadata)
    }

    /// Validate replacement metadata.
    pub fn check_metadata(&self, metadata: &str) -> Result<(), ValidationError> {
        check_len("metadata", metadata, self.metadata)
    }

    /// Validate an emergency activation reason.
    pub fn check_reason(&self, reason: &str) -> Result<(), ValidationError> {
        check_len("activation_reason", reason, self.activation_reason)
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.len() > max {
        return Err(ValidationError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DataHash;

    fn record(record_type: &str, locator: &str, metadata: &str) -> NewRecord {
        NewRecord {
            record_type: record_type.into(),
            encrypted_locator: locator.into(),
            data_hash: DataHash::from_bytes([1; 32]),
            metadata: metadata.into(),
        }
    }

    #[test]
    fn test_valid_record() {
        let limits = FieldLimits::default();
        assert!(limits.check_record(&record("lab", "ipfs://x", "")).is_ok());
    }

    #[test]
    fn test_limits_are_inclusive() {
        let limits = FieldLimits::default();
        let exact = "x".repeat(MAX_RECORD_TYPE_LEN);
        assert!(limits.check_record(&record(&exact, "", "")).is_ok());

        let over = "x".repeat(MAX_RECORD_TYPE_LEN + 1);
        assert_eq!(
            limits.check_record(&record(&over, "", "")),
            Err(ValidationError::FieldTooLong {
                field: "record_type",
                len: 33,
                max: 32
            })
        );
    }

    #[test]
    fn test_locator_and_metadata_limits() {
        let limits = FieldLimits::default();
        let long_locator = "l".repeat(MAX_LOCATOR_LEN + 1);
        assert!(limits.check_record(&record("lab", &long_locator, "")).is_err());

        let long_meta = "m".repeat(MAX_METADATA_LEN + 1);
        assert!(limits.check_metadata(&long_meta).is_err());
        assert!(limits.check_reason(&long_meta).is_err());
    }

    #[test]
    fn test_length_is_measured_in_bytes() {
        let limits = FieldLimits {
            record_type: 4,
            ..FieldLimits::default()
        };
        // Three characters, six bytes.
        assert!(limits.check_record(&record("äöü", "", "")).is_err());
    }
}
