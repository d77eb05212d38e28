//! stepwise-core: attempt tracking and grading for the StepWise POWER block
//!
//! This crate holds everything that is not HTTP or process setup:
//!
//! - **Variant selection** - [`AttemptedSet`] bitmap and [`pick_variant`], cycling a
//!   student through a pool of up to ten question variants
//! - **Grading** - [`compute_grade`], [`Score`] clamping and layered [`GradingSettings`]
//! - **Records** - [`QuestionRecord`] (authored content) and [`StudentState`]
//!   (per-student, schema-versioned)
//! - **State machine** - [`QuestionSession`], one student working one question
//! - **Host interfaces** - [`StateStore`], [`GradeSink`], [`UserDirectory`] and
//!   [`CourseSettingsSource`] with in-memory and file-backed implementations
//! - **Orchestration** - [`AttemptService`], which wires the above together per request
//! - **Widget** - [`WidgetConfig`], the object handed to the embedded tutoring UI
//!
//! # Request flow
//!
//! ```text
//! handler ──► AttemptService::open ──► QuestionSession (transition)
//!                                           │
//!                    ┌──────────────────────┴───────────────┐
//!                    ▼                                      ▼
//!          StateStore (persist, best effort)     GradeSink (score, completion)
//! ```

pub mod environment;
pub mod error;
pub mod grading;
pub mod host;
pub mod question;
pub mod service;
pub mod session;
pub mod state;
pub mod variants;
pub mod widget;

// Re-export key types for convenience
pub use environment::{ENVIRONMENT_VAR, Environment};
pub use error::{AttemptError, BitIndexError, ConfigError, QuestionFormError, StoreError};
pub use grading::{Completion, GradingSettings, Score, SettingsLayer, compute_grade};
pub use host::{
    CourseSettingsSource, FileStore, GradeSink, GradebookEvent, Host, LogGradeSink,
    MemoryGradebook, MemoryStore, MemoryUserDirectory, StateKey, StateStore, StaticCourseSettings,
    UserDirectory, UserIdentity,
};
pub use question::{QuestionDefinition, QuestionDescriptor, QuestionForm, QuestionRecord};
pub use service::AttemptService;
pub use session::{QuestionData, QuestionSession, ResultOutcome};
pub use state::{AttemptPhase, StudentState, Submission};
pub use variants::{AttemptedSet, Selection, VariantPool, pick_variant};
pub use widget::{CallbackUrls, WidgetConfig, WidgetSettings};
