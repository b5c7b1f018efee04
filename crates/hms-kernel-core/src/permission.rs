//! Permission bitmask, requested operations and access paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::crypto::ProofHash;

/// A permission bitmask.
///
/// Bit 1 is Read, bit 2 is Write, bit 4 is Share. Share is stored and
/// returned unchanged but is not consumed by any authorization check.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Permissions(u8);

impl Permissions {
    /// No permissions.
    pub const NONE: Self = Self(0);
    /// Read access.
    pub const READ: Self = Self(1 << 0);
    /// Write access.
    pub const WRITE: Self = Self(1 << 1);
    /// Share access (reserved for delegation of delegation).
    pub const SHARE: Self = Self(1 << 2);
    /// Every known bit.
    pub const ALL: Self = Self(Self::READ.0 | Self::WRITE.0 | Self::SHARE.0);

    /// Interpret a raw bitmask. Unknown bits are kept; see [`Self::is_well_formed`].
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bitmask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no bits are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if at least one bit is set and only known bits are used.
    pub const fn is_well_formed(self) -> bool {
        self.0 != 0 && self.0 & !Self::ALL.0 == 0
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permissions({})", self)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut parts = Vec::new();
        if self.contains(Self::READ) {
            parts.push("read");
        }
        if self.contains(Self::WRITE) {
            parts.push("write");
        }
        if self.contains(Self::SHARE) {
            parts.push("share");
        }
        let unknown = self.0 & !Self::ALL.0;
        if unknown != 0 {
            return write!(f, "{}|0x{:02x}", parts.join("|"), unknown);
        }
        f.write_str(&parts.join("|"))
    }
}

/// An operation requested against a health record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    /// The permission bit this operation requires.
    pub const fn required(self) -> Permissions {
        match self {
            Operation::Read => Permissions::READ,
            Operation::Write => Permissions::WRITE,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => f.write_str("read"),
            Operation::Write => f.write_str("write"),
        }
    }
}

/// The authorization path that admitted a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessPath {
    /// The actor owns the record.
    SelfAccess,
    /// A live grant from the owner.
    Grant,
    /// A registered, valid proof attestation.
    Proof { proof_hash: ProofHash },
    /// An active emergency override.
    Emergency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let rw = Permissions::READ | Permissions::WRITE;
        assert!(rw.contains(Permissions::READ));
        assert!(rw.contains(Permissions::WRITE));
        assert!(!rw.contains(Permissions::SHARE));
        assert!(rw.contains(Permissions::NONE));
    }

    #[test]
    fn test_well_formed() {
        assert!(Permissions::READ.is_well_formed());
        assert!(Permissions::ALL.is_well_formed());
        assert!(!Permissions::NONE.is_well_formed());
        assert!(!Permissions::from_bits(0b1000).is_well_formed());
        assert!(!Permissions::from_bits(0b1001).is_well_formed());
    }

    #[test]
    fn test_share_bit_preserved() {
        let p = Permissions::from_bits(0b101);
        assert_eq!(p.bits(), 5);
        assert!(p.contains(Permissions::SHARE));
        assert_eq!(p.to_string(), "read|share");
    }

    #[test]
    fn test_operation_bits() {
        assert_eq!(Operation::Read.required(), Permissions::READ);
        assert_eq!(Operation::Write.required(), Permissions::WRITE);
    }
}
