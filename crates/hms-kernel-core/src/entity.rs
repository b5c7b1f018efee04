//! The stored entities and their local invariants.
//!
//! Entities are plain data. Who may act on them is decided by the
//! authorization engine; the methods here only keep each entity internally
//! consistent (monotonic counters, one-way flags).

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::address::{EntityAddress, EntityKind};
use crate::crypto::{AccountKey, DataHash, ProofHash};
use crate::error::ValidationError;
use crate::permission::{Operation, Permissions};

/// An entity that can be stored at its derived address.
pub trait StoredEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The kind tag stored alongside the encoded body.
    const KIND: EntityKind;

    /// The address this entity lives at.
    fn address(&self) -> EntityAddress;
}

/// Per-user profile. Exactly one per owner, never destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The profile owner.
    pub owner: AccountKey,

    /// Number of record ids ever allocated (including soft-deleted records).
    pub record_count: u64,

    /// When the profile was created (Unix seconds).
    pub created_at: i64,

    /// When the owner last changed anything under this profile.
    pub last_updated: i64,
}

impl Profile {
    /// Create an empty profile.
    pub fn new(owner: AccountKey, now: i64) -> Self {
        Self {
            owner,
            record_count: 0,
            created_at: now,
            last_updated: now,
        }
    }

    /// True if `record_id` has been allocated.
    pub fn has_allocated(&self, record_id: u64) -> bool {
        record_id < self.record_count
    }

    /// Allocate the next record id. Ids are never reused.
    pub fn allocate_record_id(&mut self, now: i64) -> Result<u64, ValidationError> {
        let id = self.record_count;
        self.record_count = id.checked_add(1).ok_or(ValidationError::CounterOverflow)?;
        self.last_updated = now;
        Ok(id)
    }

    /// Bump `last_updated`.
    pub fn touch(&mut self, now: i64) {
        self.last_updated = now;
    }
}

impl StoredEntity for Profile {
    const KIND: EntityKind = EntityKind::Profile;

    fn address(&self) -> EntityAddress {
        EntityAddress::profile(&self.owner)
    }
}

/// Client-supplied fields of a new health record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Kind of record, e.g. "lab", "vital", "medication".
    pub record_type: String,

    /// Opaque locator of the encrypted payload (CID, URI, ...).
    pub encrypted_locator: String,

    /// Digest of the payload.
    pub data_hash: DataHash,

    /// Free-form metadata. The only mutable field after creation.
    pub metadata: String,
}

/// A health record. Soft-deleted, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: u64,
    pub owner: AccountKey,
    pub record_type: String,
    pub encrypted_locator: String,
    pub data_hash: DataHash,
    pub metadata: String,
    pub is_deleted: bool,
    pub created_at: i64,
    pub last_updated: i64,
}

impl HealthRecord {
    /// Build a record from client fields.
    pub fn new(id: u64, owner: AccountKey, fields: NewRecord, now: i64) -> Self {
        Self {
            id,
            owner,
            record_type: fields.record_type,
            encrypted_locator: fields.encrypted_locator,
            data_hash: fields.data_hash,
            metadata: fields.metadata,
            is_deleted: false,
            created_at: now,
            last_updated: now,
        }
    }

    /// Replace the metadata. Type, locator and hash are immutable.
    pub fn update_metadata(&mut self, metadata: String, now: i64) {
        self.metadata = metadata;
        self.last_updated = now;
    }

    /// Mark the record deleted. Returns false if it already was.
    pub fn soft_delete(&mut self, now: i64) -> bool {
        if self.is_deleted {
            return false;
        }
        self.is_deleted = true;
        self.last_updated = now;
        true
    }
}

impl StoredEntity for HealthRecord {
    const KIND: EntityKind = EntityKind::Record;

    fn address(&self) -> EntityAddress {
        EntityAddress::record(&self.owner, self.id)
    }
}

/// A time-bounded delegation from an owner to a grantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub owner: AccountKey,
    pub grantee: AccountKey,

    /// The grant stops authorizing once `now >= expires_at`.
    pub expires_at: i64,

    pub permissions: Permissions,
    pub created_at: i64,
    pub last_updated: i64,
}

impl AccessGrant {
    /// True once the grant no longer authorizes anything.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// True if the bitmask covers the operation (ignores expiry).
    pub fn permits(&self, operation: Operation) -> bool {
        self.permissions.contains(operation.required())
    }
}

impl StoredEntity for AccessGrant {
    const KIND: EntityKind = EntityKind::Grant;

    fn address(&self) -> EntityAddress {
        EntityAddress::grant(&self.owner, &self.grantee)
    }
}

/// A registered zero-knowledge proof attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProofState {
    pub owner: AccountKey,
    pub proof_hash: ProofHash,
    pub public_inputs: Bytes,
    pub proof_payload: Bytes,

    /// Fixed at registration by the external verifier.
    pub is_valid: bool,

    /// Number of successful proof-based authorizations.
    pub verification_count: u64,

    pub created_at: i64,
    pub last_verified: Option<i64>,
}

impl ZkProofState {
    /// Count one successful use. Leaves `is_valid` untouched.
    pub fn record_verification(&mut self, now: i64) -> u64 {
        self.verification_count = self.verification_count.saturating_add(1);
        self.last_verified = Some(now);
        self.verification_count
    }
}

impl StoredEntity for ZkProofState {
    const KIND: EntityKind = EntityKind::Proof;

    fn address(&self) -> EntityAddress {
        EntityAddress::proof(&self.owner, &self.proof_hash)
    }
}

/// A configured emergency contact and its activation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyAccess {
    pub owner: AccountKey,
    pub emergency_contact: AccountKey,
    pub is_active: bool,

    /// Reason given at the most recent activation. Authoritative only while
    /// active; kept afterwards as history.
    pub activation_reason: String,

    pub activated_by: Option<AccountKey>,
    pub last_activated: Option<i64>,

    /// End of the current activation window, if windows are enforced.
    pub expires_at: Option<i64>,

    pub created_at: i64,
}

impl EmergencyAccess {
    /// A freshly configured, inactive relationship.
    pub fn new(owner: AccountKey, emergency_contact: AccountKey, now: i64) -> Self {
        Self {
            owner,
            emergency_contact,
            is_active: false,
            activation_reason: String::new(),
            activated_by: None,
            last_activated: None,
            expires_at: None,
            created_at: now,
        }
    }

    /// Turn the override on.
    pub fn activate(&mut self, reason: String, by: AccountKey, now: i64, window: Option<i64>) {
        self.is_active = true;
        self.activation_reason = reason;
        self.activated_by = Some(by);
        self.last_activated = Some(now);
        self.expires_at = window.map(|w| now.saturating_add(w));
    }

    /// Turn the override off. The reason is retained as history.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.expires_at = None;
    }

    /// True if the override currently authorizes reads.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.is_active && self.expires_at.map_or(true, |expires| now < expires)
    }
}

impl StoredEntity for EmergencyAccess {
    const KIND: EntityKind = EntityKind::Emergency;

    fn address(&self) -> EntityAddress {
        EntityAddress::emergency(&self.owner, &self.emergency_contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(b: u8) -> AccountKey {
        AccountKey::from_bytes([b; 32])
    }

    fn fields() -> NewRecord {
        NewRecord {
            record_type: "lab".into(),
            encrypted_locator: "ipfs://bafy".into(),
            data_hash: DataHash::of(b"cbc panel"),
            metadata: "{}".into(),
        }
    }

    #[test]
    fn test_profile_allocates_monotonically() {
        let mut profile = Profile::new(key(1), 100);
        assert_eq!(profile.allocate_record_id(101).unwrap(), 0);
        assert_eq!(profile.allocate_record_id(102).unwrap(), 1);
        assert_eq!(profile.record_count, 2);
        assert_eq!(profile.last_updated, 102);
        assert!(profile.has_allocated(1));
        assert!(!profile.has_allocated(2));
    }

    #[test]
    fn test_profile_counter_overflow() {
        let mut profile = Profile::new(key(1), 0);
        profile.record_count = u64::MAX;
        assert!(matches!(
            profile.allocate_record_id(1),
            Err(ValidationError::CounterOverflow)
        ));
        assert_eq!(profile.record_count, u64::MAX);
    }

    #[test]
    fn test_soft_delete_is_one_way() {
        let mut record = HealthRecord::new(0, key(1), fields(), 10);
        assert!(record.soft_delete(20));
        assert!(!record.soft_delete(30));
        assert!(record.is_deleted);
        assert_eq!(record.last_updated, 20);
    }

    #[test]
    fn test_update_keeps_immutable_fields() {
        let mut record = HealthRecord::new(3, key(1), fields(), 10);
        record.update_metadata("{\"note\":1}".into(), 11);
        assert_eq!(record.metadata, "{\"note\":1}");
        assert_eq!(record.record_type, "lab");
        assert_eq!(record.data_hash, DataHash::of(b"cbc panel"));
        assert_eq!(record.address(), EntityAddress::record(&key(1), 3));
    }

    #[test]
    fn test_grant_expiry_boundary() {
        let grant = AccessGrant {
            owner: key(1),
            grantee: key(2),
            expires_at: 1000,
            permissions: Permissions::READ,
            created_at: 0,
            last_updated: 0,
        };
        assert!(!grant.is_expired(999));
        assert!(grant.is_expired(1000));
        assert!(grant.permits(Operation::Read));
        assert!(!grant.permits(Operation::Write));
    }

    #[test]
    fn test_proof_verification_count() {
        let mut proof = ZkProofState {
            owner: key(1),
            proof_hash: ProofHash::from_bytes([7; 32]),
            public_inputs: Bytes::from_static(&[1; 32]),
            proof_payload: Bytes::from_static(&[2; 256]),
            is_valid: true,
            verification_count: 0,
            created_at: 0,
            last_verified: None,
        };
        assert_eq!(proof.record_verification(5), 1);
        assert_eq!(proof.record_verification(6), 2);
        assert_eq!(proof.last_verified, Some(6));
        assert!(proof.is_valid);
    }

    #[test]
    fn test_emergency_window() {
        let mut access = EmergencyAccess::new(key(1), key(2), 0);
        assert!(!access.is_active_at(0));

        access.activate("collapsed".into(), key(2), 100, Some(50));
        assert!(access.is_active_at(149));
        assert!(!access.is_active_at(150));

        access.deactivate();
        assert!(!access.is_active_at(120));
        assert_eq!(access.activation_reason, "collapsed");
    }

    #[test]
    fn test_emergency_without_window() {
        let mut access = EmergencyAccess::new(key(1), key(2), 0);
        access.activate("r".into(), key(2), 100, None);
        assert!(access.is_active_at(i64::MAX));
    }
}
