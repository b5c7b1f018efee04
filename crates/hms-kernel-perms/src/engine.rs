//! The authorization engine.
//!
//! One pure decision function, [`authorize`], evaluates an ordered list of
//! rules against a snapshot of the entities that bear on a request. Every
//! entry point that touches a record goes through it.
//!
//! Rule order is fixed: self, grant, proof, emergency. Each rule allows,
//! denies or skips. The first allow wins. If nothing allows, the first
//! deny in rule order is returned, and if no rule denied either the
//! request is [`DenyReason::Unauthorized`].
//!
//! The engine never mutates anything. The one side effect of a proof-based
//! allow (counting the verification) is applied by the caller, which can
//! see the matched path on the verdict.

use hms_kernel_core::{
    AccessGrant, AccessPath, AccountKey, EmergencyAccess, EntityAddress, Operation, Permissions,
    ProofHash, ZkProofState,
};
use serde::{Deserialize, Serialize};

use crate::error::DenyReason;

/// A request to perform `operation` on one of `owner`'s records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub actor: AccountKey,
    pub owner: AccountKey,
    pub record_id: u64,
    pub operation: Operation,
    /// Proof offered by the actor, if any.
    pub proof_hash: Option<ProofHash>,
}

impl AccessRequest {
    /// A read request without a proof.
    pub fn read(actor: AccountKey, owner: AccountKey, record_id: u64) -> Self {
        Self {
            actor,
            owner,
            record_id,
            operation: Operation::Read,
            proof_hash: None,
        }
    }

    /// A write request.
    pub fn write(actor: AccountKey, owner: AccountKey, record_id: u64) -> Self {
        Self {
            actor,
            owner,
            record_id,
            operation: Operation::Write,
            proof_hash: None,
        }
    }

    /// Attach a proof.
    pub fn with_proof(mut self, proof_hash: ProofHash) -> Self {
        self.proof_hash = Some(proof_hash);
        self
    }

    /// True if the actor is the owner.
    pub fn is_self(&self) -> bool {
        self.actor == self.owner
    }

    /// Address of the grant that could admit this request.
    pub fn grant_address(&self) -> EntityAddress {
        EntityAddress::grant(&self.owner, &self.actor)
    }

    /// Address of the offered proof, if any.
    pub fn proof_address(&self) -> Option<EntityAddress> {
        self.proof_hash
            .map(|hash| EntityAddress::proof(&self.owner, &hash))
    }

    /// Address of the emergency relationship that could admit this request.
    pub fn emergency_address(&self) -> EntityAddress {
        EntityAddress::emergency(&self.owner, &self.actor)
    }
}

/// The entities the engine consults, as loaded by the caller.
///
/// Entities whose keys do not match the request are treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessContext<'a> {
    /// Grant(owner, actor).
    pub grant: Option<&'a AccessGrant>,
    /// Proof(owner, proof_hash).
    pub proof: Option<&'a ZkProofState>,
    /// Emergency(owner, actor).
    pub emergency: Option<&'a EmergencyAccess>,
}

/// An allowed request: the scope granted and the path that granted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub scope: Permissions,
    pub path: AccessPath,
}

/// The engine's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Allow(Access),
    Deny(DenyReason),
}

impl Verdict {
    /// True if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow(_))
    }

    /// Convert to a `Result`.
    pub fn into_result(self) -> Result<Access, DenyReason> {
        match self {
            Verdict::Allow(access) => Ok(access),
            Verdict::Deny(reason) => Err(reason),
        }
    }
}

/// Result of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Allow(Access),
    Deny(DenyReason),
    Skip,
}

type Rule = fn(&AccessRequest, &AccessContext<'_>, i64) -> Outcome;

/// The rules in precedence order.
const RULES: [Rule; 4] = [self_rule, grant_rule, proof_rule, emergency_rule];

/// Decide whether `request` is allowed at time `now`.
pub fn authorize(request: &AccessRequest, ctx: &AccessContext<'_>, now: i64) -> Verdict {
    let mut first_deny = None;
    for rule in RULES {
        match rule(request, ctx, now) {
            Outcome::Allow(access) => return Verdict::Allow(access),
            Outcome::Deny(reason) => {
                first_deny.get_or_insert(reason);
            }
            Outcome::Skip => {}
        }
    }
    Verdict::Deny(first_deny.unwrap_or(DenyReason::Unauthorized))
}

fn self_rule(request: &AccessRequest, _ctx: &AccessContext<'_>, _now: i64) -> Outcome {
    if request.is_self() {
        Outcome::Allow(Access {
            scope: Permissions::ALL,
            path: AccessPath::SelfAccess,
        })
    } else {
        Outcome::Skip
    }
}

fn grant_rule(request: &AccessRequest, ctx: &AccessContext<'_>, now: i64) -> Outcome {
    let grant = match ctx.grant {
        Some(g) if g.owner == request.owner && g.grantee == request.actor => g,
        _ => return Outcome::Skip,
    };
    if grant.is_expired(now) {
        return Outcome::Deny(DenyReason::GrantExpired {
            expires_at: grant.expires_at,
        });
    }
    if !grant.permits(request.operation) {
        return Outcome::Deny(DenyReason::InsufficientPermission {
            required: request.operation.required(),
            granted: grant.permissions,
        });
    }
    Outcome::Allow(Access {
        scope: grant.permissions,
        path: AccessPath::Grant,
    })
}

fn proof_rule(request: &AccessRequest, ctx: &AccessContext<'_>, _now: i64) -> Outcome {
    let Some(proof_hash) = request.proof_hash else {
        return Outcome::Skip;
    };
    let valid = ctx.proof.map_or(false, |p| {
        p.owner == request.owner && p.proof_hash == proof_hash && p.is_valid
    });
    if !valid {
        return Outcome::Deny(DenyReason::InvalidProof { proof_hash });
    }
    // Proofs never admit writes.
    if request.operation != Operation::Read {
        return Outcome::Skip;
    }
    Outcome::Allow(Access {
        scope: Permissions::READ,
        path: AccessPath::Proof { proof_hash },
    })
}

fn emergency_rule(request: &AccessRequest, ctx: &AccessContext<'_>, now: i64) -> Outcome {
    let access = match ctx.emergency {
        Some(e) if e.owner == request.owner && e.emergency_contact == request.actor => e,
        _ => return Outcome::Skip,
    };
    if !access.is_active_at(now) {
        return Outcome::Deny(DenyReason::NoActiveEmergencyAccess);
    }
    if request.operation != Operation::Read {
        return Outcome::Skip;
    }
    Outcome::Allow(Access {
        scope: Permissions::READ,
        path: AccessPath::Emergency,
    })
}
