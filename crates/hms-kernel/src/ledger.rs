//! The Ledger: every record, grant, proof and emergency operation.
//!
//! Each operation reads the clock once, loads the entities it names,
//! decides, and writes everything it changes in one atomic
//! [`Store::commit`]. A failed check returns before anything is queued, so
//! a failed operation leaves no trace. Notifications go out only after the
//! commit succeeds.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use hms_kernel_core::{
    AccessGrant, AccessPath, AccountKey, Clock, EmergencyAccess, EntityAddress, Event,
    HealthRecord, NewRecord, Notification, Permissions, Profile, ProofHash, SystemClock,
    ZkProofState,
};
use hms_kernel_perms::{
    authorize, emergency, issue_grant, register_proof, revoke_grant, Access, AccessContext,
    AccessRequest, PermsError, ProofVerifier, StructuralVerifier, Verdict,
};
use hms_kernel_store::{Store, StoreExt, WriteBatch};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// A record returned by an authorized read, with the path that admitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAccess {
    pub record: HealthRecord,
    pub access: Access,
}

/// The main Ledger struct.
///
/// Generic over the storage backend, the time source and the proof
/// verifier. Mutating operations are serialized by an internal lock, so
/// each read-decide-write sequence is a single step as seen by other
/// callers of the same ledger.
pub struct Ledger<S: Store, C: Clock = SystemClock, V: ProofVerifier = StructuralVerifier> {
    store: Arc<S>,
    clock: C,
    verifier: V,
    config: LedgerConfig,
    notifications: broadcast::Sender<Notification>,
    write_lock: Mutex<()>,
}

impl<S: Store> Ledger<S> {
    /// Create a ledger with the system clock and the structural verifier.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self::with_parts(store, SystemClock, StructuralVerifier, config)
    }
}

impl<S: Store, C: Clock, V: ProofVerifier> Ledger<S, C, V> {
    /// Create a ledger from explicit parts.
    pub fn with_parts(store: S, clock: C, verifier: V, config: LedgerConfig) -> Self {
        let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
        Self {
            store: Arc::new(store),
            clock,
            verifier,
            config,
            notifications,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Subscribe to notifications published after each successful operation.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profiles
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the owner's profile with an empty record counter.
    pub async fn init_profile(&self, owner: AccountKey) -> Result<Profile> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let address = EntityAddress::profile(&owner);
        if self.store.contains(&address).await? {
            return Err(LedgerError::ProfileExists(owner));
        }

        let profile = Profile::new(owner, now);
        let mut batch = WriteBatch::new();
        batch.put(&profile)?;
        self.store.commit(batch).await?;

        info!(owner = %owner, "profile created");
        self.publish(
            now,
            Event::ProfileCreated {
                profile: profile.clone(),
            },
        );
        Ok(profile)
    }

    /// Get an owner's profile.
    pub async fn profile(&self, owner: &AccountKey) -> Result<Option<Profile>> {
        Ok(self.store.load(&EntityAddress::profile(owner)).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a record under the owner's profile.
    ///
    /// The new record takes the next id; ids are never reused.
    pub async fn add_record(&self, owner: AccountKey, fields: NewRecord) -> Result<HealthRecord> {
        self.config.limits.check_record(&fields)?;

        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut profile = self.require_profile(&owner).await?;
        let record_id = profile.allocate_record_id(now)?;
        let record = HealthRecord::new(record_id, owner, fields, now);

        let mut batch = WriteBatch::new();
        batch.put(&profile)?;
        batch.put(&record)?;
        self.store.commit(batch).await?;

        info!(owner = %owner, record_id, record_type = %record.record_type, "record added");
        self.publish(
            now,
            Event::RecordAdded {
                record: record.clone(),
            },
        );
        Ok(record)
    }

    /// Replace a record's metadata. Requires Write access.
    pub async fn update_record(
        &self,
        actor: AccountKey,
        owner: AccountKey,
        record_id: u64,
        metadata: String,
    ) -> Result<HealthRecord> {
        self.config.limits.check_metadata(&metadata)?;

        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let request = AccessRequest::write(actor, owner, record_id);
        let mut batch = WriteBatch::new();
        let (access, _) = self.admit(&request, now, &mut batch).await?;

        let profile = self.require_profile(&owner).await?;
        let mut record = self.require_record(&profile, record_id).await?;
        if record.is_deleted {
            return Err(LedgerError::RecordDeleted { owner, record_id });
        }

        record.update_metadata(metadata, now);
        batch.put(&record)?;
        self.store.commit(batch).await?;

        info!(owner = %owner, actor = %actor, record_id, path = ?access.path, "record updated");
        self.publish(
            now,
            Event::RecordUpdated {
                record: record.clone(),
                actor,
            },
        );
        Ok(record)
    }

    /// Soft-delete a record. Owner only; deleting twice succeeds.
    pub async fn delete_record(
        &self,
        actor: AccountKey,
        owner: AccountKey,
        record_id: u64,
    ) -> Result<HealthRecord> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        if actor != owner {
            debug!(owner = %owner, actor = %actor, record_id, "delete refused: not owner");
            return Err(PermsError::NotOwner(actor).into());
        }

        let mut profile = self.require_profile(&owner).await?;
        let mut record = self.require_record(&profile, record_id).await?;

        if record.soft_delete(now) {
            profile.touch(now);
            let mut batch = WriteBatch::new();
            batch.put(&profile)?;
            batch.put(&record)?;
            self.store.commit(batch).await?;
            info!(owner = %owner, record_id, "record deleted");
        } else {
            debug!(owner = %owner, record_id, "record already deleted");
        }

        self.publish(
            now,
            Event::RecordDeleted {
                record: record.clone(),
            },
        );
        Ok(record)
    }

    /// Read a record. Requires Read access by any path.
    ///
    /// Deleted records are returned with `is_deleted` set. A proof-based
    /// read counts one verification on the proof.
    pub async fn read_record(
        &self,
        actor: AccountKey,
        owner: AccountKey,
        record_id: u64,
        proof_hash: Option<ProofHash>,
    ) -> Result<RecordAccess> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut request = AccessRequest::read(actor, owner, record_id);
        request.proof_hash = proof_hash;

        let mut batch = WriteBatch::new();
        let (access, verified) = self.admit(&request, now, &mut batch).await?;

        let profile = self.require_profile(&owner).await?;
        let record = self.require_record(&profile, record_id).await?;
        self.store.commit(batch).await?;

        debug!(owner = %owner, actor = %actor, record_id, path = ?access.path, "record read");
        if let Some(proof) = verified {
            self.publish(
                now,
                Event::ProofVerified {
                    proof,
                    verifier: actor,
                },
            );
        }
        self.publish(
            now,
            Event::AuthorizedRecordAccess {
                owner,
                record_id,
                accessor: actor,
                path: access.path,
            },
        );
        Ok(RecordAccess { record, access })
    }

    /// Run the authorization engine for a request.
    ///
    /// Does not look at the record itself. A proof-based allow counts one
    /// verification, exactly as a read would.
    pub async fn authorize(&self, request: &AccessRequest) -> Result<Access> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut batch = WriteBatch::new();
        let (access, verified) = self.admit(request, now, &mut batch).await?;
        self.store.commit(batch).await?;

        if let Some(proof) = verified {
            self.publish(
                now,
                Event::ProofVerified {
                    proof,
                    verifier: request.actor,
                },
            );
        }
        Ok(access)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grants
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `grantee` access for `duration` seconds.
    ///
    /// Replaces any existing grant for the pair.
    pub async fn grant_access(
        &self,
        owner: AccountKey,
        grantee: AccountKey,
        duration: i64,
        permissions: Permissions,
    ) -> Result<AccessGrant> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let grant = issue_grant(
            owner,
            grantee,
            duration,
            permissions,
            now,
            &self.config.grant_policy(),
        )?;
        let mut profile = self.require_profile(&owner).await?;
        profile.touch(now);

        let mut batch = WriteBatch::new();
        batch.put(&grant)?;
        batch.put(&profile)?;
        self.store.commit(batch).await?;

        info!(
            owner = %owner,
            grantee = %grantee,
            permissions = %permissions,
            expires_at = grant.expires_at,
            "access granted"
        );
        self.publish(
            now,
            Event::AccessGranted {
                grant: grant.clone(),
            },
        );
        Ok(grant)
    }

    /// Remove the grant for the pair. Returns the removed grant.
    pub async fn revoke_access(
        &self,
        owner: AccountKey,
        grantee: AccountKey,
    ) -> Result<AccessGrant> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let existing = self
            .store
            .load::<AccessGrant>(&EntityAddress::grant(&owner, &grantee))
            .await?;
        let grant = revoke_grant(owner, grantee, existing)?;

        let mut batch = WriteBatch::new();
        batch.delete(EntityAddress::grant(&owner, &grantee));
        self.touch_profile(&owner, now, &mut batch).await?;
        self.store.commit(batch).await?;

        info!(owner = %owner, grantee = %grantee, "access revoked");
        self.publish(
            now,
            Event::AccessRevoked {
                grant: grant.clone(),
            },
        );
        Ok(grant)
    }

    /// Get the grant for a pair, expired or not.
    pub async fn grant(
        &self,
        owner: &AccountKey,
        grantee: &AccountKey,
    ) -> Result<Option<AccessGrant>> {
        Ok(self.store.load(&EntityAddress::grant(owner, grantee)).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Proofs
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a proof attestation. Validity is decided here, once.
    pub async fn register_proof(
        &self,
        owner: AccountKey,
        proof_hash: ProofHash,
        public_inputs: Bytes,
        proof_payload: Bytes,
    ) -> Result<ZkProofState> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut profile = self.require_profile(&owner).await?;
        let existing = self
            .store
            .load::<ZkProofState>(&EntityAddress::proof(&owner, &proof_hash))
            .await?;
        let proof = register_proof(
            existing.as_ref(),
            owner,
            proof_hash,
            public_inputs,
            proof_payload,
            &self.verifier,
            now,
        )?;
        profile.touch(now);

        let mut batch = WriteBatch::new();
        batch.put(&proof)?;
        batch.put(&profile)?;
        self.store.commit(batch).await?;

        info!(owner = %owner, proof = %proof_hash, valid = proof.is_valid, "proof registered");
        self.publish(
            now,
            Event::ProofRegistered {
                proof: proof.clone(),
            },
        );
        Ok(proof)
    }

    /// Get a registered proof.
    pub async fn proof(
        &self,
        owner: &AccountKey,
        proof_hash: &ProofHash,
    ) -> Result<Option<ZkProofState>> {
        Ok(self
            .store
            .load(&EntityAddress::proof(owner, proof_hash))
            .await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Emergency Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Name `contact` as an emergency contact. Starts inactive.
    pub async fn configure_emergency_access(
        &self,
        owner: AccountKey,
        contact: AccountKey,
    ) -> Result<EmergencyAccess> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut profile = self.require_profile(&owner).await?;
        let existing = self
            .store
            .load::<EmergencyAccess>(&EntityAddress::emergency(&owner, &contact))
            .await?;
        let access = emergency::configure(existing.as_ref(), owner, contact, now)?;
        profile.touch(now);

        let mut batch = WriteBatch::new();
        batch.put(&access)?;
        batch.put(&profile)?;
        self.store.commit(batch).await?;

        info!(owner = %owner, contact = %contact, "emergency access configured");
        self.publish(
            now,
            Event::EmergencyConfigured {
                access: access.clone(),
            },
        );
        Ok(access)
    }

    /// Switch emergency access on. Only the contact may do this.
    pub async fn activate_emergency_access(
        &self,
        actor: AccountKey,
        owner: AccountKey,
        contact: AccountKey,
        reason: String,
    ) -> Result<EmergencyAccess> {
        self.config.limits.check_reason(&reason)?;

        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let existing = self
            .store
            .load::<EmergencyAccess>(&EntityAddress::emergency(&owner, &contact))
            .await?;
        let access = emergency::activate(
            existing,
            actor,
            contact,
            reason,
            now,
            &self.config.emergency_policy(),
        )?;

        let mut batch = WriteBatch::new();
        batch.put(&access)?;
        self.touch_profile(&owner, now, &mut batch).await?;
        self.store.commit(batch).await?;

        warn!(
            owner = %owner,
            contact = %contact,
            expires_at = ?access.expires_at,
            "emergency access activated"
        );
        self.publish(
            now,
            Event::EmergencyActivated {
                access: access.clone(),
            },
        );
        Ok(access)
    }

    /// Switch emergency access off. Only the owner may do this.
    pub async fn deactivate_emergency_access(
        &self,
        actor: AccountKey,
        owner: AccountKey,
        contact: AccountKey,
    ) -> Result<EmergencyAccess> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let existing = self
            .store
            .load::<EmergencyAccess>(&EntityAddress::emergency(&owner, &contact))
            .await?;
        let access = emergency::deactivate(existing, actor, owner, contact)?;

        let mut batch = WriteBatch::new();
        batch.put(&access)?;
        self.touch_profile(&owner, now, &mut batch).await?;
        self.store.commit(batch).await?;

        info!(owner = %owner, contact = %contact, "emergency access deactivated");
        self.publish(
            now,
            Event::EmergencyDeactivated {
                access: access.clone(),
            },
        );
        Ok(access)
    }

    /// Get the emergency relationship for a pair.
    pub async fn emergency_access(
        &self,
        owner: &AccountKey,
        contact: &AccountKey,
    ) -> Result<Option<EmergencyAccess>> {
        Ok(self
            .store
            .load(&EntityAddress::emergency(owner, contact))
            .await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    /// Load the request's context, run the engine, and queue the proof side
    /// effect on allow. Returns the updated proof when the proof path matched.
    async fn admit(
        &self,
        request: &AccessRequest,
        now: i64,
        batch: &mut WriteBatch,
    ) -> Result<(Access, Option<ZkProofState>)> {
        let (grant, proof, emergency) = if request.is_self() {
            (None, None, None)
        } else {
            let grant: Option<AccessGrant> = self.store.load(&request.grant_address()).await?;
            let proof: Option<ZkProofState> = match request.proof_address() {
                Some(address) => self.store.load(&address).await?,
                None => None,
            };
            let emergency: Option<EmergencyAccess> =
                self.store.load(&request.emergency_address()).await?;
            (grant, proof, emergency)
        };

        let ctx = AccessContext {
            grant: grant.as_ref(),
            proof: proof.as_ref(),
            emergency: emergency.as_ref(),
        };
        let access = match authorize(request, &ctx, now) {
            Verdict::Allow(access) => access,
            Verdict::Deny(reason) => {
                debug!(
                    owner = %request.owner,
                    actor = %request.actor,
                    record_id = request.record_id,
                    operation = %request.operation,
                    %reason,
                    "access denied"
                );
                return Err(reason.into());
            }
        };

        let verified = match (access.path, proof) {
            (AccessPath::Proof { .. }, Some(mut proof)) => {
                let count = proof.record_verification(now);
                batch.put(&proof)?;
                debug!(proof = %proof.proof_hash, count, "proof verified");
                Some(proof)
            }
            _ => None,
        };
        Ok((access, verified))
    }

    async fn require_profile(&self, owner: &AccountKey) -> Result<Profile> {
        self.store
            .load(&EntityAddress::profile(owner))
            .await?
            .ok_or(LedgerError::ProfileNotFound(*owner))
    }

    async fn require_record(&self, profile: &Profile, record_id: u64) -> Result<HealthRecord> {
        let owner = profile.owner;
        if !profile.has_allocated(record_id) {
            return Err(LedgerError::RecordNotFound { owner, record_id });
        }
        self.store
            .load(&EntityAddress::record(&owner, record_id))
            .await?
            .ok_or(LedgerError::RecordNotFound { owner, record_id })
    }

    /// Bump the owner's profile timestamp, if the profile exists.
    async fn touch_profile(
        &self,
        owner: &AccountKey,
        now: i64,
        batch: &mut WriteBatch,
    ) -> Result<()> {
        let profile: Option<Profile> = self.store.load(&EntityAddress::profile(owner)).await?;
        if let Some(mut profile) = profile {
            profile.touch(now);
            batch.put(&profile)?;
        }
        Ok(())
    }

    fn publish(&self, at: i64, event: Event) {
        debug!(event = event.name(), owner = %event.owner(), "notify");
        // No subscribers is not an error.
        let _ = self.notifications.send(Notification { at, event });
    }
}
