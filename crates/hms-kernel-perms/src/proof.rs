//! Proof registration and the verifier capability.
//!
//! The registry does not verify proof mathematics. Validity is decided once,
//! at registration, by an injected [`ProofVerifier`] and stored on the
//! attestation.

use std::sync::Arc;

use bytes::Bytes;
use hms_kernel_core::{AccountKey, ProofHash, ZkProofState};

use crate::error::{PermsError, Result};

/// Expected length of public inputs for [`StructuralVerifier`].
pub const PUBLIC_INPUTS_LEN: usize = 32;

/// Expected length of a proof payload for [`StructuralVerifier`].
pub const PROOF_PAYLOAD_LEN: usize = 256;

/// Decides whether a proof is valid for its public inputs.
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, proof_payload: &[u8], public_inputs: &[u8]) -> bool;
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for Arc<V> {
    fn verify(&self, proof_payload: &[u8], public_inputs: &[u8]) -> bool {
        (**self).verify(proof_payload, public_inputs)
    }
}

/// Shape check only: 32 bytes of inputs and a non-zero 256-byte payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralVerifier;

impl ProofVerifier for StructuralVerifier {
    fn verify(&self, proof_payload: &[u8], public_inputs: &[u8]) -> bool {
        public_inputs.len() == PUBLIC_INPUTS_LEN
            && proof_payload.len() == PROOF_PAYLOAD_LEN
            && proof_payload.iter().any(|&b| b != 0)
    }
}

/// Build the attestation for a new proof.
///
/// An invalid proof is still registered, with `is_valid = false`; it will
/// simply never authorize anything.
pub fn register_proof<V: ProofVerifier + ?Sized>(
    existing: Option<&ZkProofState>,
    owner: AccountKey,
    proof_hash: ProofHash,
    public_inputs: Bytes,
    proof_payload: Bytes,
    verifier: &V,
    now: i64,
) -> Result<ZkProofState> {
    if existing.is_some() {
        return Err(PermsError::ProofAlreadyRegistered(proof_hash));
    }
    let is_valid = verifier.verify(&proof_payload, &public_inputs);
    Ok(ZkProofState {
        owner,
        proof_hash,
        public_inputs,
        proof_payload,
        is_valid,
        verification_count: 0,
        created_at: now,
        last_verified: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hms_kernel_core::ErrorKind;

    struct RejectAll;

    impl ProofVerifier for RejectAll {
        fn verify(&self, _: &[u8], _: &[u8]) -> bool {
            false
        }
    }

    fn owner() -> AccountKey {
        AccountKey::from_bytes([1; 32])
    }

    #[test]
    fn test_structural_verifier() {
        let v = StructuralVerifier;
        assert!(v.verify(&[1; 256], &[0; 32]));
        assert!(!v.verify(&[0; 256], &[0; 32]));
        assert!(!v.verify(&[1; 255], &[0; 32]));
        assert!(!v.verify(&[1; 256], &[0; 31]));
    }

    #[test]
    fn test_register_records_validity() {
        let inputs = Bytes::from_static(&[7; 32]);
        let payload = Bytes::from_static(&[8; 256]);
        let hash = ProofHash::commit(&inputs, &payload);

        let state = register_proof(
            None,
            owner(),
            hash,
            inputs.clone(),
            payload.clone(),
            &StructuralVerifier,
            50,
        )
        .unwrap();
        assert!(state.is_valid);
        assert_eq!(state.verification_count, 0);
        assert_eq!(state.last_verified, None);

        let rejected =
            register_proof(None, owner(), hash, inputs, payload, &RejectAll, 50).unwrap();
        assert!(!rejected.is_valid);
    }

    #[test]
    fn test_duplicate_registration() {
        let inputs = Bytes::from_static(&[7; 32]);
        let payload = Bytes::from_static(&[8; 256]);
        let hash = ProofHash::commit(&inputs, &payload);
        let first = register_proof(
            None,
            owner(),
            hash,
            inputs.clone(),
            payload.clone(),
            &StructuralVerifier,
            1,
        )
        .unwrap();

        let err = register_proof(
            Some(&first),
            owner(),
            hash,
            inputs,
            payload,
            &StructuralVerifier,
            2,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_arc_verifier() {
        let shared: Arc<dyn ProofVerifier> = Arc::new(StructuralVerifier);
        assert!(shared.verify(&[3; 256], &[0; 32]));
    }
}
