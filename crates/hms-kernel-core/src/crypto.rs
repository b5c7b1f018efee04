//! Key and digest primitives for the HMS kernel.
//!
//! Wraps Ed25519 identities and Blake3 digests with strong types.

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte account key (an Ed25519 public key).
///
/// Every party in the system (record owner, grantee, emergency contact,
/// verifier) is identified by its account key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountKey(pub [u8; 32]);

impl AccountKey {
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

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(decode_32(s)?))
    }

    /// The zero key (never a valid identity, used as a placeholder).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for AccountKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for AccountKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Integrity digest of an off-ledger health-record payload.
///
/// The kernel never sees the payload; it only stores the digest the client
/// computed over it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataHash(pub [u8; 32]);

impl DataHash {
    /// Compute the Blake3 digest of the given data.
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
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

impl fmt::Debug for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataHash({})", &self.to_hex()[..16])
    }
}

impl From<[u8; 32]> for DataHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Identifier of a registered zero-knowledge proof attestation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofHash(pub [u8; 32]);

impl ProofHash {
    /// Commit to a proof by hashing its public inputs and payload.
    ///
    /// Callers are free to choose any 32-byte identifier; this is the
    /// conventional one.
    pub fn commit(public_inputs: &[u8], proof_payload: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"hms-proof-v0:");
        hasher.update(&(public_inputs.len() as u64).to_le_bytes());
        hasher.update(public_inputs);
        hasher.update(proof_payload);
        Self(*hasher.finalize().as_bytes())
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

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(decode_32(s)?))
    }
}

impl fmt::Debug for ProofHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ProofHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl From<[u8; 32]> for ProofHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

fn decode_32(s: &str) -> Result<[u8; 32], hex::FromHexError> {
    let bytes = hex::decode(s)?;
    if bytes.len() != 32 {
        return Err(hex::FromHexError::InvalidStringLength);
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// An account keypair.
///
/// Transaction signing happens outside the kernel; the keypair exists so
/// tools and tests can mint real account identities.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the account key.
    pub fn account(&self) -> AccountKey {
        AccountKey(self.signing_key.verifying_key().to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.account())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.account(), kp2.account());
        assert_ne!(kp1.account(), Keypair::from_seed(&[0x43; 32]).account());
    }

    #[test]
    fn test_account_key_hex_roundtrip() {
        let key = Keypair::generate().account();
        let recovered = AccountKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key, recovered);
        assert!(AccountKey::from_hex("abcd").is_err());
    }

    #[test]
    fn test_account_key_display_is_short() {
        let key = AccountKey::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", key), "abababababababab");
        assert!(format!("{:?}", key).starts_with("AccountKey("));
    }

    #[test]
    fn test_proof_commitment_binds_inputs() {
        let h1 = ProofHash::commit(b"inputs", b"payload");
        let h2 = ProofHash::commit(b"inputs", b"payload");
        let h3 = ProofHash::commit(b"inputsp", b"ayload");
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_data_hash() {
        assert_eq!(DataHash::of(b"scan"), DataHash::of(b"scan"));
        assert_ne!(DataHash::of(b"scan"), DataHash::of(b"scan2"));
    }
}
