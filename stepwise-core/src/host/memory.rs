//! In-memory host collaborators
//!
//! `MemoryStore` backs the server when no storage directory is configured.
//! `MemoryGradebook` keeps every event and is meant for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{
    CourseSettingsSource, GradeSink, StateKey, StateStore, UserDirectory, UserIdentity,
};
use crate::error::StoreError;
use crate::grading::{Completion, Score, SettingsLayer};
use crate::question::QuestionRecord;
use crate::state::StudentState;

/// Map-backed [`StateStore`]
#[derive(Default)]
pub struct MemoryStore {
    questions: RwLock<HashMap<String, QuestionRecord>>,
    students: RwLock<HashMap<StateKey, StudentState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load_question(&self, question_id: &str) -> Result<Option<QuestionRecord>, StoreError> {
        Ok(self.questions.read().await.get(question_id).cloned())
    }

    async fn save_question(&self, record: &QuestionRecord) -> Result<(), StoreError> {
        self.questions
            .write()
            .await
            .insert(record.question_id.clone(), record.clone());
        Ok(())
    }

    async fn load_student(&self, key: &StateKey) -> Result<Option<StudentState>, StoreError> {
        Ok(self.students.read().await.get(key).cloned())
    }

    async fn save_student(&self, key: &StateKey, state: &StudentState) -> Result<(), StoreError> {
        self.students
            .write()
            .await
            .insert(key.clone(), state.clone());
        Ok(())
    }
}

/// One event received by the gradebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradebookEvent {
    Grade {
        key: StateKey,
        score: Score,
        at: DateTime<Utc>,
    },
    Completion {
        key: StateKey,
        completion: Completion,
        at: DateTime<Utc>,
    },
}

/// [`GradeSink`] that records every event it receives
#[derive(Default)]
pub struct MemoryGradebook {
    events: RwLock<Vec<GradebookEvent>>,
}

impl MemoryGradebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in arrival order
    pub async fn events(&self) -> Vec<GradebookEvent> {
        self.events.read().await.clone()
    }

    /// The most recently published score for `key`
    pub async fn latest_score(&self, key: &StateKey) -> Option<Score> {
        self.events
            .read()
            .await
            .iter()
            .rev()
            .find_map(|event| match event {
                GradebookEvent::Grade { key: k, score, .. } if k == key => Some(*score),
                _ => None,
            })
    }

    /// The most recently reported completion for `key`
    pub async fn latest_completion(&self, key: &StateKey) -> Option<Completion> {
        self.events
            .read()
            .await
            .iter()
            .rev()
            .find_map(|event| match event {
                GradebookEvent::Completion { key: k, completion, .. } if k == key => {
                    Some(*completion)
                }
                _ => None,
            })
    }
}

#[async_trait]
impl GradeSink for MemoryGradebook {
    async fn publish_grade(&self, key: &StateKey, score: Score) -> Result<(), StoreError> {
        tracing::debug!(%key, value = score.value, max_value = score.max_value, "grade published");
        self.events.write().await.push(GradebookEvent::Grade {
            key: key.clone(),
            score,
            at: Utc::now(),
        });
        Ok(())
    }

    async fn emit_completion(
        &self,
        key: &StateKey,
        completion: Completion,
    ) -> Result<(), StoreError> {
        tracing::debug!(%key, completion = completion.fraction(), "completion emitted");
        self.events.write().await.push(GradebookEvent::Completion {
            key: key.clone(),
            completion,
            at: Utc::now(),
        });
        Ok(())
    }
}

/// [`UserDirectory`] over a fixed set of registered students
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<String, UserIdentity>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, student_id: impl Into<String>, identity: UserIdentity) {
        self.users.write().await.insert(student_id.into(), identity);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn identity(&self, student_id: &str) -> UserIdentity {
        let known = self.users.read().await.get(student_id).cloned();
        let mut identity = known.unwrap_or_else(|| UserIdentity::anonymous(student_id));
        if identity.username.is_empty() {
            identity.username = student_id.to_string();
        }
        if identity.full_name.is_empty() {
            identity.full_name = identity.username.clone();
        }
        identity
    }
}

/// [`CourseSettingsSource`] over a fixed map of course defaults
#[derive(Debug, Clone, Default)]
pub struct StaticCourseSettings {
    courses: HashMap<String, SettingsLayer>,
}

impl StaticCourseSettings {
    pub fn new(courses: HashMap<String, SettingsLayer>) -> Self {
        Self { courses }
    }
}

impl CourseSettingsSource for StaticCourseSettings {
    fn course_settings(&self, course_id: &str) -> SettingsLayer {
        self.courses.get(course_id).cloned().unwrap_or_default()
    }
}
