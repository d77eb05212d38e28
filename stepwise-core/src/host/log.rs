//! Grade sink that only logs

use async_trait::async_trait;
use tracing::info;

use super::{GradeSink, StateKey};
use crate::error::StoreError;
use crate::grading::{Completion, Score};

/// [`GradeSink`] that writes each event to the log and keeps nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct LogGradeSink;

impl LogGradeSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GradeSink for LogGradeSink {
    async fn publish_grade(&self, key: &StateKey, score: Score) -> Result<(), StoreError> {
        info!(
            question_id = %key.question_id,
            student_id = %key.student_id,
            value = score.value,
            max_value = score.max_value,
            "grade published"
        );
        Ok(())
    }

    async fn emit_completion(
        &self,
        key: &StateKey,
        completion: Completion,
    ) -> Result<(), StoreError> {
        info!(
            question_id = %key.question_id,
            student_id = %key.student_id,
            completion = completion.fraction(),
            "completion reported"
        );
        Ok(())
    }
}
