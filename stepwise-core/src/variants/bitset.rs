//! Compact bitmap of attempted variant indices
//!
//! Bit `i` set means variant `i` has been attempted. The value is persisted as
//! a plain integer so records written by earlier deployments load unchanged.

use serde::{Deserialize, Serialize};

use crate::error::BitIndexError;

/// Width of the bit window; covers every supported variant index
pub const WINDOW_BITS: u32 = 32;

/// Set of attempted variant indices, stored as a bitmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptedSet(u32);

impl AttemptedSet {
    /// The empty set
    pub const EMPTY: Self = Self(0);

    /// Wrap a raw bitmap
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bitmap
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Return a copy with bit `index` set
    pub fn set(self, index: i64) -> Result<Self, BitIndexError> {
        if index < 0 {
            return Err(BitIndexError::Negative(index));
        }
        if index >= i64::from(WINDOW_BITS) {
            return Err(BitIndexError::OutOfWindow {
                index,
                width: WINDOW_BITS,
            });
        }
        Ok(Self(self.0 | (1u32 << index)))
    }

    /// Whether bit `index` is set. Indices outside the window are never set.
    pub fn is_set(self, index: u32) -> bool {
        index < WINDOW_BITS && self.0 & (1u32 << index) != 0
    }

    /// Number of set bits within the window
    pub fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the set indices in ascending order
    pub fn indices(self) -> impl Iterator<Item = u32> {
        (0..WINDOW_BITS).filter(move |i| self.is_set(*i))
    }
}
