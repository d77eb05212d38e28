//! Variant selection
//!
//! Picks the next question variant for a student, cycling through the pool
//! without repeats and starting a fresh cycle once every variant has been
//! attempted. Selection never marks a variant as attempted; that only happens
//! when the student actually starts an attempt.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::bitset::AttemptedSet;

/// Draws allowed before falling back to variant 0
pub const MAX_TRIES: u32 = 100;

/// Largest pool the selector supports
pub const MAX_VARIANTS: u32 = 10;

/// The set of variants a question can present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPool {
    size: u32,
}

impl VariantPool {
    /// Create a pool, clamping the size into `1..=MAX_VARIANTS`
    pub fn new(size: i64) -> Self {
        let size = size.clamp(1, i64::from(MAX_VARIANTS)) as u32;
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

impl Default for VariantPool {
    fn default() -> Self {
        Self { size: 1 }
    }
}

/// Result of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// The chosen variant index, always within the pool
    pub index: u32,
    /// The attempted set after selection (cleared if the pool was exhausted)
    pub attempted: AttemptedSet,
    /// Whether the attempted set was cleared
    pub reset: bool,
}

/// Pick the next variant to present.
///
/// A candidate equal to `previous` is redrawn while more than one variant is
/// still unattempted, so the student does not see the same variant twice in a
/// row when alternatives exist.
pub fn pick_variant<R: Rng + ?Sized>(
    rng: &mut R,
    pool: VariantPool,
    attempted: AttemptedSet,
    previous: Option<u32>,
) -> Selection {
    let size = pool.size();
    let mut attempted = attempted;
    let mut reset = false;

    if attempted.popcount() >= size {
        debug!(
            attempted = attempted.bits(),
            size, "all variants attempted, starting a new cycle"
        );
        attempted = AttemptedSet::EMPTY;
        reset = true;
    }

    for attempt in 1..=MAX_TRIES {
        let candidate = rng.gen_range(0..size);

        // popcount < size - 1, written to stay in unsigned range
        let alternatives_left = attempted.popcount() + 1 < size;
        if previous == Some(candidate) && alternatives_left {
            debug!(attempt, candidate, "skipping previously shown variant");
            continue;
        }

        if !attempted.is_set(candidate) {
            return Selection {
                index: candidate,
                attempted,
                reset,
            };
        }

        if attempted.popcount() >= size {
            return Selection {
                index: 0,
                attempted: AttemptedSet::EMPTY,
                reset: true,
            };
        }
    }

    warn!(
        tries = MAX_TRIES,
        size, "could not find an unattempted variant, falling back to variant 0"
    );
    Selection {
        index: 0,
        attempted: AttemptedSet::EMPTY,
        reset: true,
    }
}
