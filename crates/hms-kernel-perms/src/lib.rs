//! # HMS Kernel Perms
//!
//! The authorization engine and the state transitions of the three
//! registries it consults: grants, proofs and emergency access.
//!
//! ## Overview
//!
//! Everything here is pure. Callers load the entities a request names,
//! hand them to [`authorize`] or to a transition function, and persist
//! whatever comes back.
//!
//! ## Key Types
//!
//! - [`authorize`] - The single decision function
//! - [`AccessRequest`] / [`AccessContext`] - What is asked, and what is known
//! - [`Verdict`] - Allow with a scope and path, or deny with a reason
//! - [`ProofVerifier`] - Capability that decides proof validity at registration
//! - [`GrantPolicy`] / [`EmergencyPolicy`] - Configurable limits

pub mod emergency;
pub mod engine;
pub mod error;
pub mod grant;
pub mod proof;

pub use emergency::{EmergencyPolicy, DEFAULT_EMERGENCY_COOLDOWN, DEFAULT_EMERGENCY_WINDOW};
pub use engine::{authorize, Access, AccessContext, AccessRequest, Verdict};
pub use error::{DenyReason, PermsError, Result};
pub use grant::{issue_grant, revoke_grant, GrantPolicy, DEFAULT_MAX_GRANT_DURATION};
pub use proof::{register_proof, ProofVerifier, StructuralVerifier};
