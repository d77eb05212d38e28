//! Binary complete/incomplete grading
//!
//! A finished problem earns the full raw point, anything else earns nothing.
//! Weight is applied only when the score is published.

use serde::{Deserialize, Serialize};

/// Raw points a question is worth before weighting
pub const RAW_POSSIBLE: f64 = 1.0;

/// Raw score earned for the current answer state
pub fn compute_grade(is_answered: bool) -> f64 {
    if is_answered { RAW_POSSIBLE } else { 0.0 }
}

/// A grade as published to the host gradebook
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub value: f64,
    pub max_value: f64,
}

impl Score {
    /// Build a publishable score, clamping `raw_earned` into `[0, weight]`.
    /// A negative weight is treated as zero.
    pub fn clamped(raw_earned: f64, weight: f64) -> Self {
        let max_value = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        let value = if raw_earned.is_nan() {
            0.0
        } else {
            raw_earned.clamp(0.0, max_value)
        };
        Self { value, max_value }
    }
}

/// Completion reported to the host alongside a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    Incomplete,
    Complete,
}

impl Completion {
    /// Fraction complete, 0.0 or 1.0
    pub fn fraction(self) -> f64 {
        match self {
            Completion::Incomplete => 0.0,
            Completion::Complete => 1.0,
        }
    }
}
