//! Branch locations and per-location reach state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// Type-safe identifier of a tracked program point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(u32);

impl LocationId {
    /// Create a location ID
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Location ID of a source position
    ///
    /// FNV-1a over `file:line:column`, so the same call site maps to the
    /// same ID in every process.
    #[must_use]
    pub fn from_source(location: &Location<'_>) -> Self {
        let mut hash: u32 = 0x811c_9dc5;
        let line = location.line().to_le_bytes();
        let column = location.column().to_le_bytes();
        let bytes = location
            .file()
            .as_bytes()
            .iter()
            .chain(line.iter())
            .chain(column.iter());
        for byte in bytes {
            hash ^= u32::from(*byte);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        Self(hash)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{:08x}", self.0)
    }
}

/// Outcome of a binary branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Condition held
    True,
    /// Condition did not hold
    False,
}

impl Polarity {
    pub(crate) const fn bit(self) -> u8 {
        match self {
            Self::True => 0b01,
            Self::False => 0b10,
        }
    }
}

impl From<bool> for Polarity {
    fn from(outcome: bool) -> Self {
        if outcome {
            Self::True
        } else {
            Self::False
        }
    }
}

/// Reach state of a branch point
///
/// ```text
/// Unreached ──true──► ReachedTrue ──false──┐
///     │                                    ▼
///     └──false──► ReachedFalse ──true──► ReachedBoth
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchState {
    /// Never evaluated
    #[default]
    Unreached,
    /// Only the true arm was taken
    ReachedTrue,
    /// Only the false arm was taken
    ReachedFalse,
    /// Both arms were taken
    ReachedBoth,
}

impl BranchState {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Unreached,
            0b01 => Self::ReachedTrue,
            0b10 => Self::ReachedFalse,
            _ => Self::ReachedBoth,
        }
    }

    /// State after observing `polarity`
    #[must_use]
    pub const fn after(self, polarity: Polarity) -> Self {
        Self::from_bits(self.bits() | polarity.bit())
    }

    const fn bits(self) -> u8 {
        match self {
            Self::Unreached => 0b00,
            Self::ReachedTrue => 0b01,
            Self::ReachedFalse => 0b10,
            Self::ReachedBoth => 0b11,
        }
    }

    /// Both polarities reached
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::ReachedBoth)
    }
}
