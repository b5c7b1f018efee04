//! Address vectors for deterministic derivation.
//!
//! Entity addresses are the only index the kernel has, so every
//! implementation must derive byte-identical addresses from the same
//! inputs. These vectors pin both the inputs and the resulting bytes.

use hms_kernel_core::{AccountKey, EntityAddress, EntityKind, Keypair, ProofHash};
use serde::Serialize;

/// An address test vector.
#[derive(Debug, Clone, Serialize)]
pub struct AddressVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Entity kind.
    #[serde(serialize_with = "serialize_kind")]
    pub kind: EntityKind,
    /// Seed of the owner key.
    pub owner_seed: [u8; 32],
    /// Seed of the counterparty key (grantee or contact), if any.
    pub counterparty_seed: Option<[u8; 32]>,
    /// Record id, for record addresses.
    pub record_id: Option<u64>,
    /// Proof hash (hex), for proof addresses.
    pub proof_hash: Option<&'static str>,
    /// Expected address (hex).
    pub expected: &'static str,
}

fn serialize_kind<S: serde::Serializer>(kind: &EntityKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&kind.to_string())
}

/// Get all address vectors.
pub fn all_vectors() -> Vec<AddressVector> {
    vec![
        AddressVector {
            name: "profile of seed 0x42",
            kind: EntityKind::Profile,
            owner_seed: [0x42; 32],
            counterparty_seed: None,
            record_id: None,
            proof_hash: None,
            expected: "90eba26726df1c7942f130a634a4e914c4e4f5010ab359b5fe0b61ea782b3f46",
        },
        AddressVector {
            name: "first record",
            kind: EntityKind::Record,
            owner_seed: [0x42; 32],
            counterparty_seed: None,
            record_id: Some(0),
            proof_hash: None,
            expected: "8fe145df68c58dfabb937dabc4edd757349e6320cf387d7c18fd24f31a221ef8",
        },
        AddressVector {
            name: "record with multi-byte id",
            kind: EntityKind::Record,
            owner_seed: [0x42; 32],
            counterparty_seed: None,
            record_id: Some(0x0102_0304_0506_0708),
            proof_hash: None,
            expected: "283cd0229bd105d24c3404b4e6c8dcb13bf15dc7afe74853f821db36ae7e3590",
        },
        AddressVector {
            name: "grant to seed 0x07",
            kind: EntityKind::Grant,
            owner_seed: [0x42; 32],
            counterparty_seed: Some([0x07; 32]),
            record_id: None,
            proof_hash: None,
            expected: "28a67283def0fe5667a3d590399130d02e387e033413461da8efbe75761aca11",
        },
        AddressVector {
            name: "proof",
            kind: EntityKind::Proof,
            owner_seed: [0x42; 32],
            counterparty_seed: None,
            record_id: None,
            proof_hash: Some("abababababababababababababababababababababababababababababababab"),
            expected: "31e8510c8dd49ac6963a9ef38e6e97ecc315744abf135d19495db31690de157f",
        },
        AddressVector {
            name: "emergency contact seed 0x07",
            kind: EntityKind::Emergency,
            owner_seed: [0x42; 32],
            counterparty_seed: Some([0x07; 32]),
            record_id: None,
            proof_hash: None,
            expected: "173bc862df1f84f4ae6a9eff5147109857c8b1eefe59e3d70d21f34b880ad206",
        },
    ]
}

fn account(seed: &[u8; 32]) -> AccountKey {
    Keypair::from_seed(seed).account()
}

/// Derive the address a vector describes.
///
/// Returns `None` if the vector is missing an input its kind needs.
pub fn derive_vector(vector: &AddressVector) -> Option<EntityAddress> {
    let owner = account(&vector.owner_seed);
    let counterparty = vector.counterparty_seed.as_ref().map(account);
    match vector.kind {
        EntityKind::Profile => Some(EntityAddress::profile(&owner)),
        EntityKind::Record => vector
            .record_id
            .map(|id| EntityAddress::record(&owner, id)),
        EntityKind::Grant => counterparty.map(|grantee| EntityAddress::grant(&owner, &grantee)),
        EntityKind::Proof => {
            let hash = ProofHash::from_hex(vector.proof_hash?).ok()?;
            Some(EntityAddress::proof(&owner, &hash))
        }
        EntityKind::Emergency => {
            counterparty.map(|contact| EntityAddress::emergency(&owner, &contact))
        }
    }
}

/// Derive a vector and compare it with its expectation.
///
/// Returns whether it matched, and the derived hex (empty if the vector is
/// incomplete).
pub fn check_vector(vector: &AddressVector) -> (bool, String) {
    let hex = derive_vector(vector).map(|a| a.to_hex()).unwrap_or_default();
    (!hex.is_empty() && hex == vector.expected, hex)
}

/// Verify all vectors. Returns `(name, matches, derived hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let (matches, hex) = check_vector(v);
            (v.name.to_string(), matches, hex)
        })
        .collect()
}

/// All vectors with their derived addresses, as pretty JSON.
pub fn vectors_json() -> serde_json::Result<String> {
    #[derive(Serialize)]
    struct Recorded<'a> {
        #[serde(flatten)]
        vector: &'a AddressVector,
        derived: String,
    }

    let vectors = all_vectors();
    let recorded: Vec<Recorded<'_>> = vectors
        .iter()
        .map(|vector| Recorded {
            vector,
            derived: derive_vector(vector).map(|a| a.to_hex()).unwrap_or_default(),
        })
        .collect();
    serde_json::to_string_pretty(&recorded)
}
