//! Proptest generators for property-based testing.

use proptest::prelude::*;

use hms_kernel_core::validation::{MAX_LOCATOR_LEN, MAX_METADATA_LEN};
use hms_kernel_core::{AccountKey, DataHash, Keypair, NewRecord, Operation, Permissions, ProofHash};

use crate::fixtures::DAY;

/// Generate a random account key.
pub fn account_key() -> impl Strategy<Value = AccountKey> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed).account())
}

/// Generate two distinct account keys.
pub fn distinct_pair() -> impl Strategy<Value = (AccountKey, AccountKey)> {
    (account_key(), account_key()).prop_filter("keys must differ", |(a, b)| a != b)
}

/// Generate a random proof hash.
pub fn proof_hash() -> impl Strategy<Value = ProofHash> {
    any::<[u8; 32]>().prop_map(ProofHash::from_bytes)
}

/// Generate a well-formed permission bitmask (non-empty, known bits).
pub fn permissions() -> impl Strategy<Value = Permissions> {
    (1u8..=7).prop_map(Permissions::from_bits)
}

/// Generate any bitmask, including empty and unknown bits.
pub fn raw_permissions() -> impl Strategy<Value = Permissions> {
    any::<u8>().prop_map(Permissions::from_bits)
}

/// Generate a requested operation.
pub fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![Just(Operation::Read), Just(Operation::Write)]
}

/// Generate a positive grant duration within the default cap.
pub fn duration() -> impl Strategy<Value = i64> {
    1i64..=365 * DAY
}

/// Generate a record type within the length limit.
pub fn record_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("lab".to_string()),
        Just("vital".to_string()),
        Just("medication".to_string()),
        "[a-z][a-z_]{0,31}",
    ]
}

/// Generate a valid new record.
pub fn new_record() -> impl Strategy<Value = NewRecord> {
    (
        record_type(),
        prop::collection::vec(any::<u8>(), 0..=MAX_LOCATOR_LEN / 2),
        any::<[u8; 32]>(),
        prop::collection::vec(any::<u8>(), 0..=MAX_METADATA_LEN / 2),
    )
        .prop_map(|(record_type, locator, digest, metadata)| NewRecord {
            record_type,
            encrypted_locator: format!("ipfs://{}", hex::encode(&locator[..locator.len().min(60)])),
            data_hash: DataHash::from_bytes(digest),
            metadata: hex::encode(metadata),
        })
}

/// Parameters for issuing a grant.
#[derive(Debug, Clone)]
pub struct GrantParams {
    pub owner: AccountKey,
    pub grantee: AccountKey,
    pub duration: i64,
    pub permissions: Permissions,
    /// Seconds after issue at which the grant is checked.
    pub check_after: i64,
    pub operation: Operation,
}

impl Arbitrary for GrantParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            distinct_pair(),
            1i64..=30 * DAY,
            permissions(),
            0i64..=31 * DAY,
            operation(),
        )
            .prop_map(
                |((owner, grantee), duration, permissions, check_after, operation)| GrantParams {
                    owner,
                    grantee,
                    duration,
                    permissions,
                    check_after,
                    operation,
                },
            )
            .boxed()
    }
}

impl GrantParams {
    /// Whether the engine should allow the check.
    pub fn expect_allowed(&self) -> bool {
        self.permissions.contains(self.operation.required()) && self.check_after < self.duration
    }
}
