use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Width of the capability bitmask.
pub const MAX_CAPABILITIES: u8 = 64;

/// Built-in capabilities, in bit order starting at bit 0.
pub const BUILTINS: [&str; 6] = [
    "ViewDashboard",
    "ViewModels",
    "ViewUsers",
    "ManageUsers",
    "ManageModels",
    "Administrator",
];

/// Number of bits reserved for built-ins; custom capabilities start here.
pub const BUILTIN_COUNT: u8 = BUILTINS.len() as u8;

/// Bitmask of capabilities held by (or required of) a principal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(u64);

impl CapabilitySet {
    pub const EMPTY: Self = Self(0);

    pub const VIEW_DASHBOARD: Self = Self(1 << 0);
    pub const VIEW_MODELS: Self = Self(1 << 1);
    pub const VIEW_USERS: Self = Self(1 << 2);
    pub const MANAGE_USERS: Self = Self(1 << 3);
    pub const MANAGE_MODELS: Self = Self(1 << 4);
    pub const ADMINISTRATOR: Self = Self(1 << 5);

    /// Holding this bit satisfies every check.
    pub const SUPERUSER: Self = Self::ADMINISTRATOR;

    pub const BASIC_USER: Self =
        Self(Self::VIEW_DASHBOARD.0 | Self::VIEW_MODELS.0 | Self::VIEW_USERS.0);
    pub const ADMIN: Self = Self::ADMINISTRATOR;

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Single-bit set for `position`, or `None` past the mask width.
    pub fn from_position(position: u8) -> Option<Self> {
        1u64.checked_shl(u32::from(position)).map(Self)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn grant(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn revoke(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Bit positions set in this mask, ascending.
    pub fn positions(self) -> impl Iterator<Item = u8> {
        (0..MAX_CAPABILITIES).filter(move |bit| self.0 & (1u64 << bit) != 0)
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CapabilitySet({:#x})", self.0)
    }
}

impl BitOr for CapabilitySet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for CapabilitySet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.grant(rhs);
    }
}

/// Does `held` satisfy `required`? The superuser bit satisfies anything,
/// including capabilities registered after it was granted.
pub fn has_capability(held: CapabilitySet, required: CapabilitySet) -> bool {
    held.contains(CapabilitySet::SUPERUSER) || held.contains(required)
}

/// A named capability bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Capability {
    pub name: String,
    pub bit: u8,
}

impl Capability {
    pub fn mask(&self) -> CapabilitySet {
        CapabilitySet(1u64 << self.bit)
    }

    pub fn is_builtin(&self) -> bool {
        self.bit < BUILTIN_COUNT
    }
}
