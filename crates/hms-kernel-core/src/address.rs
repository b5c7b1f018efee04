//! Deterministic entity addresses.
//!
//! Every entity lives at an address derived from the fields that identify it
//! (owner key, a kind discriminator, and optionally a counterparty key,
//! record sequence number or proof hash). There is no separate index: any
//! address can be recomputed from its inputs alone.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{AccountKey, ProofHash};

/// Domain separator mixed into every address derivation.
const ADDRESS_DOMAIN: &[u8] = b"hms-address-v0:";

/// The kind of entity stored at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityKind {
    /// Per-user profile and record counter.
    Profile = 1,
    /// A single health record.
    Record = 2,
    /// A delegation from an owner to a grantee.
    Grant = 3,
    /// A registered zero-knowledge proof attestation.
    Proof = 4,
    /// An emergency contact relationship.
    Emergency = 5,
}

impl EntityKind {
    /// Seed bytes that discriminate this kind during derivation.
    pub const fn seed(self) -> &'static [u8] {
        match self {
            EntityKind::Profile => b"user_profile",
            EntityKind::Record => b"health_record",
            EntityKind::Grant => b"access_grant",
            EntityKind::Proof => b"zk_proof",
            EntityKind::Emergency => b"emergency_access",
        }
    }

    /// Convert to u8 for storage.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Profile),
            2 => Some(Self::Record),
            3 => Some(Self::Grant),
            4 => Some(Self::Proof),
            5 => Some(Self::Emergency),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Profile => "profile",
            EntityKind::Record => "record",
            EntityKind::Grant => "grant",
            EntityKind::Proof => "proof",
            EntityKind::Emergency => "emergency",
        };
        f.write_str(name)
    }
}

/// A 32-byte entity address.
///
/// Derived as Blake3(domain || kind seed || length-prefixed fields).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityAddress(pub [u8; 32]);

impl EntityAddress {
    /// Derive an address from a kind and its identifying fields.
    ///
    /// Fields are length-prefixed so that distinct field lists never
    /// collide by concatenation.
    pub fn derive(kind: EntityKind, fields: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(kind.seed());
        for field in fields {
            hasher.update(&(field.len() as u32).to_le_bytes());
            hasher.update(field);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Address of an owner's profile.
    pub fn profile(owner: &AccountKey) -> Self {
        Self::derive(EntityKind::Profile, &[owner.as_bytes()])
    }

    /// Address of a health record (record id encoded as 8-byte little-endian).
    pub fn record(owner: &AccountKey, record_id: u64) -> Self {
        Self::derive(
            EntityKind::Record,
            &[owner.as_bytes(), &record_id.to_le_bytes()],
        )
    }

    /// Address of the grant from `owner` to `grantee`.
    pub fn grant(owner: &AccountKey, grantee: &AccountKey) -> Self {
        Self::derive(EntityKind::Grant, &[owner.as_bytes(), grantee.as_bytes()])
    }

    /// Address of a proof registered by `owner`.
    pub fn proof(owner: &AccountKey, proof_hash: &ProofHash) -> Self {
        Self::derive(EntityKind::Proof, &[owner.as_bytes(), proof_hash.as_bytes()])
    }

    /// Address of the emergency relationship between `owner` and `contact`.
    pub fn emergency(owner: &AccountKey, contact: &AccountKey) -> Self {
        Self::derive(
            EntityKind::Emergency,
            &[owner.as_bytes(), contact.as_bytes()],
        )
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for EntityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityAddress({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for EntityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for EntityAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for EntityAddress {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}
