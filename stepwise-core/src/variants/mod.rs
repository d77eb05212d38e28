//! Variant tracking and selection

mod bitset;
mod selector;

pub use bitset::{AttemptedSet, WINDOW_BITS};
pub use selector::{MAX_TRIES, MAX_VARIANTS, Selection, VariantPool, pick_variant};
