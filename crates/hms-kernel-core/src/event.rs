//! Notifications emitted after successful operations.
//!
//! Each notification carries the post-state of the entity it concerns.

use serde::{Deserialize, Serialize};

use crate::crypto::AccountKey;
use crate::entity::{AccessGrant, EmergencyAccess, HealthRecord, Profile, ZkProofState};
use crate::permission::AccessPath;

/// A notification with the operation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The clock value read at the start of the operation.
    pub at: i64,
    pub event: Event,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ProfileCreated {
        profile: Profile,
    },
    RecordAdded {
        record: HealthRecord,
    },
    RecordUpdated {
        record: HealthRecord,
        actor: AccountKey,
    },
    RecordDeleted {
        record: HealthRecord,
    },
    AccessGranted {
        grant: AccessGrant,
    },
    /// Carries the grant as it was just before removal.
    AccessRevoked {
        grant: AccessGrant,
    },
    AuthorizedRecordAccess {
        owner: AccountKey,
        record_id: u64,
        accessor: AccountKey,
        path: AccessPath,
    },
    ProofRegistered {
        proof: ZkProofState,
    },
    ProofVerified {
        proof: ZkProofState,
        verifier: AccountKey,
    },
    EmergencyConfigured {
        access: EmergencyAccess,
    },
    EmergencyActivated {
        access: EmergencyAccess,
    },
    EmergencyDeactivated {
        access: EmergencyAccess,
    },
}

impl Event {
    /// Short name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::ProfileCreated { .. } => "ProfileCreated",
            Event::RecordAdded { .. } => "RecordAdded",
            Event::RecordUpdated { .. } => "RecordUpdated",
            Event::RecordDeleted { .. } => "RecordDeleted",
            Event::AccessGranted { .. } => "AccessGranted",
            Event::AccessRevoked { .. } => "AccessRevoked",
            Event::AuthorizedRecordAccess { .. } => "AuthorizedRecordAccess",
            Event::ProofRegistered { .. } => "ProofRegistered",
            Event::ProofVerified { .. } => "ProofVerified",
            Event::EmergencyConfigured { .. } => "EmergencyConfigured",
            Event::EmergencyActivated { .. } => "EmergencyActivated",
            Event::EmergencyDeactivated { .. } => "EmergencyDeactivated",
        }
    }

    /// The owner whose data the event concerns.
    pub fn owner(&self) -> &AccountKey {
        match self {
            Event::ProfileCreated { profile } => &profile.owner,
            Event::RecordAdded { record }
            | Event::RecordUpdated { record, .. }
            | Event::RecordDeleted { record } => &record.owner,
            Event::AccessGranted { grant } | Event::AccessRevoked { grant } => &grant.owner,
            Event::AuthorizedRecordAccess { owner, .. } => owner,
            Event::ProofRegistered { proof } | Event::ProofVerified { proof, .. } => &proof.owner,
            Event::EmergencyConfigured { access }
            | Event::EmergencyActivated { access }
            | Event::EmergencyDeactivated { access } => &access.owner,
        }
    }
}
