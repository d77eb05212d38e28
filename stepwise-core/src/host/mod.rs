//! Collaborator interfaces to the hosting learning platform
//!
//! The attempt logic talks to the platform only through these traits:
//! field persistence ([`StateStore`]), the gradebook ([`GradeSink`]), user
//! identity ([`UserDirectory`]) and course-wide defaults
//! ([`CourseSettingsSource`]).

mod file;
mod log;
mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::grading::{Completion, Score, SettingsLayer};
use crate::question::QuestionRecord;
use crate::state::StudentState;

pub use file::FileStore;
pub use log::LogGradeSink;
pub use memory::{
    GradebookEvent, MemoryGradebook, MemoryStore, MemoryUserDirectory, StaticCourseSettings,
};

/// Identifies one student's state for one question
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub question_id: String,
    pub student_id: String,
}

impl StateKey {
    pub fn new(question_id: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            student_id: student_id.into(),
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.question_id, self.student_id)
    }
}

/// Who the student is, as the platform reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub username: String,
    pub full_name: String,
}

impl UserIdentity {
    /// Identity for a student the platform knows nothing about
    pub fn anonymous(student_id: &str) -> Self {
        Self {
            username: student_id.to_string(),
            full_name: student_id.to_string(),
        }
    }
}

/// Field persistence for question content and student state
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_question(&self, question_id: &str) -> Result<Option<QuestionRecord>, StoreError>;

    async fn save_question(&self, record: &QuestionRecord) -> Result<(), StoreError>;

    async fn load_student(&self, key: &StateKey) -> Result<Option<StudentState>, StoreError>;

    async fn save_student(&self, key: &StateKey, state: &StudentState) -> Result<(), StoreError>;
}

/// The platform gradebook and completion tracker
#[async_trait]
pub trait GradeSink: Send + Sync {
    /// Publish a `(value, max_value)` grade event
    async fn publish_grade(&self, key: &StateKey, score: Score) -> Result<(), StoreError>;

    /// Report how complete the student's work is
    async fn emit_completion(&self, key: &StateKey, completion: Completion)
    -> Result<(), StoreError>;
}

/// Student identity lookup
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn identity(&self, student_id: &str) -> UserIdentity;
}

/// Course-wide grading defaults
pub trait CourseSettingsSource: Send + Sync {
    fn course_settings(&self, course_id: &str) -> SettingsLayer;
}

/// The full set of platform collaborators
#[derive(Clone)]
pub struct Host {
    pub store: Arc<dyn StateStore>,
    pub grades: Arc<dyn GradeSink>,
    pub users: Arc<dyn UserDirectory>,
    pub courses: Arc<dyn CourseSettingsSource>,
}

impl Host {
    pub fn new(
        store: Arc<dyn StateStore>,
        grades: Arc<dyn GradeSink>,
        users: Arc<dyn UserDirectory>,
        courses: Arc<dyn CourseSettingsSource>,
    ) -> Self {
        Self {
            store,
            grades,
            users,
            courses,
        }
    }

    /// Host backed entirely by in-memory collaborators
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryGradebook::new()),
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(StaticCourseSettings::default()),
        )
    }
}
