//! # HMS Kernel Core
//!
//! Pure primitives for the HMS kernel: account keys, deterministic entity
//! addresses, and the health-record entities the authorization engine
//! reasons about.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`AccountKey`] - Identity of every party
//! - [`EntityAddress`] - Address derived from an entity's identifying fields
//! - [`Profile`], [`HealthRecord`], [`AccessGrant`], [`ZkProofState`],
//!   [`EmergencyAccess`] - The stored entities
//! - [`Permissions`] - Read/Write/Share bitmask
//! - [`ErrorKind`] - The error taxonomy shared by every crate
//!
//! ## Addressing
//!
//! There is no lookup table. Every entity's address is recomputed from its
//! inputs with [`EntityAddress::derive`].

pub mod address;
pub mod canonical;
pub mod clock;
pub mod crypto;
pub mod entity;
pub mod error;
pub mod event;
pub mod permission;
pub mod validation;

pub use address::{EntityAddress, EntityKind};
pub use canonical::{decode_entity, encode_entity};
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{AccountKey, DataHash, Keypair, ProofHash};
pub use entity::{
    AccessGrant, EmergencyAccess, HealthRecord, NewRecord, Profile, StoredEntity, ZkProofState,
};
pub use error::{CoreError, ErrorKind, ValidationError};
pub use event::{Event, Notification};
pub use permission::{AccessPath, Operation, Permissions};
pub use validation::FieldLimits;
