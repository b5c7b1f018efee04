//! Test fixtures and helpers.
//!
//! Common setup code for ledger tests: deterministic parties, a ledger over
//! a [`MemoryStore`] driven by a [`ManualClock`], and sample inputs.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use hms_kernel::{Ledger, LedgerConfig, Result};
use hms_kernel_core::{
    AccountKey, Clock, DataHash, Keypair, ManualClock, NewRecord, ProofHash,
};
use hms_kernel_perms::proof::{PROOF_PAYLOAD_LEN, PUBLIC_INPUTS_LEN};
use hms_kernel_perms::StructuralVerifier;
use hms_kernel_store::MemoryStore;

/// Fixed start time for fixtures: 2025-01-14T16:00:00Z.
pub const START: i64 = 1_736_870_400;

/// One hour in seconds.
pub const HOUR: i64 = 60 * 60;

/// One day in seconds.
pub const DAY: i64 = 24 * HOUR;

/// The ledger type every fixture builds.
pub type TestLedger = Ledger<MemoryStore, Arc<ManualClock>, StructuralVerifier>;

/// Deterministic account key for a party number.
pub fn party(n: u8) -> AccountKey {
    let mut seed = [0u8; 32];
    seed[0] = n;
    seed[31] = 0x5a;
    Keypair::from_seed(&seed).account()
}

/// Distinct parties for multi-party tests.
pub fn multi_party(count: u8) -> Vec<AccountKey> {
    (0..count).map(party).collect()
}

/// A small, valid record whose contents depend on `n`.
pub fn sample_record(n: u64) -> NewRecord {
    NewRecord {
        record_type: if n % 2 == 0 { "lab" } else { "vital" }.into(),
        encrypted_locator: format!("ipfs://bafy-record-{}", n),
        data_hash: DataHash::of(&n.to_le_bytes()),
        metadata: format!("{{\"n\":{}}}", n),
    }
}

/// Inputs for a proof registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofMaterial {
    pub hash: ProofHash,
    pub public_inputs: Bytes,
    pub payload: Bytes,
}

impl ProofMaterial {
    fn from_parts(public_inputs: Vec<u8>, payload: Vec<u8>) -> Self {
        let hash = ProofHash::commit(&public_inputs, &payload);
        Self {
            hash,
            public_inputs: Bytes::from(public_inputs),
            payload: Bytes::from(payload),
        }
    }
}

/// A proof the structural verifier accepts.
pub fn valid_proof(tag: u8) -> ProofMaterial {
    ProofMaterial::from_parts(
        vec![tag; PUBLIC_INPUTS_LEN],
        vec![tag.wrapping_add(1).max(1); PROOF_PAYLOAD_LEN],
    )
}

/// A proof the structural verifier rejects (all-zero payload).
pub fn invalid_proof(tag: u8) -> ProofMaterial {
    ProofMaterial::from_parts(vec![tag; PUBLIC_INPUTS_LEN], vec![0; PROOF_PAYLOAD_LEN])
}

/// A ledger with a manual clock and three parties.
pub struct TestFixture {
    pub ledger: TestLedger,
    pub clock: Arc<ManualClock>,
    pub owner: AccountKey,
    pub grantee: AccountKey,
    pub contact: AccountKey,
}

impl TestFixture {
    /// Create a fixture with default configuration.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create a fixture with the given configuration.
    pub fn with_config(config: LedgerConfig) -> Self {
        let clock = Arc::new(ManualClock::new(START));
        let ledger = Ledger::with_parts(
            MemoryStore::new(),
            Arc::clone(&clock),
            StructuralVerifier,
            config,
        );
        Self {
            ledger,
            clock,
            owner: party(1),
            grantee: party(2),
            contact: party(3),
        }
    }

    /// Create the owner's profile and add `records` sample records.
    pub async fn seeded(records: u64) -> Result<Self> {
        let fixture = Self::new();
        fixture.ledger.init_profile(fixture.owner).await?;
        for n in 0..records {
            fixture
                .ledger
                .add_record(fixture.owner, sample_record(n))
                .await?;
        }
        Ok(fixture)
    }

    /// Move the clock forward.
    pub fn advance(&self, seconds: i64) {
        self.clock.advance(seconds);
    }

    /// Current fixture time.
    pub fn now(&self) -> i64 {
        self.clock.now()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a future to completion on a fresh single-threaded runtime.
///
/// For proptest bodies, which are synchronous.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build test runtime")
        .block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hms_kernel_perms::{ProofVerifier, StructuralVerifier};

    #[test]
    fn test_parties_are_distinct() {
        let parties = multi_party(4);
        for (i, a) in parties.iter().enumerate() {
            for b in &parties[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(party(2), party(2));
    }

    #[test]
    fn test_proof_material() {
        let valid = valid_proof(7);
        assert!(StructuralVerifier.verify(&valid.payload, &valid.public_inputs));
        let invalid = invalid_proof(7);
        assert!(!StructuralVerifier.verify(&invalid.payload, &invalid.public_inputs));
        assert_ne!(valid.hash, invalid.hash);

        // 0xff wraps to 0, which must not produce an all-zero payload.
        let edge = valid_proof(0xff);
        assert!(StructuralVerifier.verify(&edge.payload, &edge.public_inputs));
    }

    #[tokio::test]
    async fn test_seeded_fixture() {
        let fixture = TestFixture::seeded(3).await.unwrap();
        let profile = fixture
            .ledger
            .profile(&fixture.owner)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.record_count, 3);
    }
}
