//! # HMS Kernel
//!
//! A permissioned store for health records. Records are opaque (a locator
//! and a digest of an encrypted payload held elsewhere); what this crate
//! decides is who may read or change them.
//!
//! ## Overview
//!
//! Four paths can admit an actor to another party's record, checked in a
//! fixed order by one decision function:
//!
//! - **Self**: the owner can always read and write their own records
//! - **Grant**: a time-bounded, bitmask-scoped delegation
//! - **Proof**: a registered, valid zero-knowledge attestation (read only)
//! - **Emergency**: an override switched on by a pre-configured contact (read only)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hms_kernel::{Ledger, LedgerConfig};
//! use hms_kernel::core::{Keypair, NewRecord, DataHash, Permissions};
//! use hms_kernel::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("hms.db").unwrap();
//!     let ledger = Ledger::new(store, LedgerConfig::default());
//!
//!     let patient = Keypair::generate().account();
//!     let doctor = Keypair::generate().account();
//!
//!     ledger.init_profile(patient).await.unwrap();
//!     let record = ledger
//!         .add_record(
//!             patient,
//!             NewRecord {
//!                 record_type: "lab".into(),
//!                 encrypted_locator: "ipfs://bafy...".into(),
//!                 data_hash: DataHash::of(b"ciphertext"),
//!                 metadata: String::new(),
//!             },
//!         )
//!         .await
//!         .unwrap();
//!
//!     ledger
//!         .grant_access(patient, doctor, 24 * 3600, Permissions::READ)
//!         .await
//!         .unwrap();
//!     let read = ledger
//!         .read_record(doctor, patient, record.id, None)
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `hms_kernel::core` - Keys, addresses, entities
//! - `hms_kernel::store` - Storage abstraction and SQLite
//! - `hms_kernel::perms` - The authorization engine

pub mod config;
pub mod error;
pub mod ledger;

// Re-export component crates
pub use hms_kernel_core as core;
pub use hms_kernel_perms as perms;
pub use hms_kernel_store as store;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, RecordAccess};

// Re-export commonly used types
pub use hms_kernel_core::{
    AccessGrant, AccessPath, AccountKey, EmergencyAccess, ErrorKind, Event, HealthRecord,
    NewRecord, Notification, Operation, Permissions, Profile, ProofHash, ZkProofState,
};
pub use hms_kernel_perms::{Access, AccessRequest, DenyReason, ProofVerifier, StructuralVerifier};
