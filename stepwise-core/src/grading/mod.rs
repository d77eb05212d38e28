//! Grade computation and grading settings

mod policy;
mod settings;

pub use policy::{Completion, RAW_POSSIBLE, Score, compute_grade};
pub use settings::{
    DEFAULT_APP_KEY, GradingSettings, SettingsLayer, UNLIMITED_ATTEMPTS, resolve_layered,
};
