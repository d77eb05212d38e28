//! Attempt state machine for one student on one question
//!
//! `NotStarted → InProgress → Completed`. Partial results keep the student in
//! `InProgress`; once a final result has been recorded, later partial results
//! are discarded so a stray step callback cannot undo a finished grade.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::BitIndexError;
use crate::grading::{
    Completion, GradingSettings, RAW_POSSIBLE, Score, SettingsLayer, compute_grade,
};
use crate::host::{StateKey, UserIdentity};
use crate::question::{QuestionDescriptor, QuestionRecord};
use crate::state::{AttemptPhase, StudentState, Submission};
use crate::variants::{VariantPool, pick_variant};

/// What recording a result produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultOutcome {
    /// Late partial result after completion; nothing changed
    Ignored,
    /// Grade recomputed; publish `score` and report `completion`
    Recorded { score: Score, completion: Completion },
}

/// Response body of the `get_data` handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionData {
    pub question: Option<QuestionDescriptor>,
    pub grade: f64,
    pub count_attempts: u32,
    pub variants_count: u32,
    pub max_attempts: i64,
}

/// A question instance loaded for one student
#[derive(Debug, Clone)]
pub struct QuestionSession {
    key: StateKey,
    record: QuestionRecord,
    state: StudentState,
    settings: GradingSettings,
    identity: UserIdentity,
}

impl QuestionSession {
    /// Assemble a session, resolving settings against the course layer and
    /// upgrading older student records
    pub fn new(
        key: StateKey,
        record: QuestionRecord,
        mut state: StudentState,
        course: &SettingsLayer,
        identity: UserIdentity,
    ) -> Self {
        if state.upgrade() {
            debug!(%key, "upgraded student record");
        }
        let settings = GradingSettings::resolve(&record.overrides, course);
        Self {
            key,
            record,
            state,
            settings,
            identity,
        }
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }

    pub fn record(&self) -> &QuestionRecord {
        &self.record
    }

    pub fn state(&self) -> &StudentState {
        &self.state
    }

    pub fn settings(&self) -> &GradingSettings {
        &self.settings
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn phase(&self) -> AttemptPhase {
        self.state.phase()
    }

    pub fn pool(&self) -> VariantPool {
        VariantPool::new(self.record.variants_count)
    }

    /// Record that the student started working variant `q_index`.
    ///
    /// Always counts the attempt; marks the variant attempted only once.
    pub fn start_attempt(&mut self, q_index: i64) -> Result<u32, BitIndexError> {
        let attempted = self.state.variants_attempted.set(q_index)?;
        self.state.count_attempts = self.state.count_attempts.saturating_add(1);

        if attempted != self.state.variants_attempted {
            self.state.variants_attempted = attempted;
            // set() succeeded, so the index is within u32 range
            self.state.previous_variant = u32::try_from(q_index).ok();
        } else {
            debug!(key = %self.key, q_index, "variant already attempted");
        }

        info!(
            key = %self.key,
            q_index,
            count_attempts = self.state.count_attempts,
            "attempt started"
        );
        Ok(self.state.count_attempts)
    }

    /// Pick a new variant and make it the current question
    pub fn select_new_variant<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &QuestionDescriptor {
        let selection = pick_variant(
            rng,
            self.pool(),
            self.state.variants_attempted,
            self.state.previous_variant,
        );
        if selection.reset {
            info!(key = %self.key, "all variants attempted, cleared attempted set");
        }

        self.state.variants_attempted = selection.attempted;
        self.state.previous_variant = Some(selection.index);

        let descriptor = QuestionDescriptor::new(
            &self.record.definition,
            &self.settings,
            &self.identity.username,
            selection.index,
        );
        debug!(key = %self.key, q_index = selection.index, "variant selected");
        self.state.question.insert(descriptor)
    }

    /// The current question, selecting one first if none is set
    pub fn current_question<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &QuestionDescriptor {
        if self.state.question.is_none() {
            return self.select_new_variant(rng);
        }
        let descriptor = QuestionDescriptor::new(
            &self.record.definition,
            &self.settings,
            &self.identity.username,
            self.state.question.as_ref().map_or(0, |q| q.q_index),
        );
        self.state.question.insert(descriptor)
    }

    /// Record an in-progress result. Discarded once the question is completed.
    pub fn save_partial_result(&mut self, payload: Value) -> ResultOutcome {
        if self.phase() == AttemptPhase::Completed {
            info!(key = %self.key, "ignoring partial result after completion");
            return ResultOutcome::Ignored;
        }
        self.record_result(payload, false)
    }

    /// Record a finished result
    pub fn save_final_result(&mut self, payload: Value) -> ResultOutcome {
        self.record_result(payload, true)
    }

    fn record_result(&mut self, payload: Value, answered: bool) -> ResultOutcome {
        self.state.last_submission = Some(Submission::from_payload(payload));
        self.state.is_answered = answered;

        let earned = compute_grade(answered);
        self.state.raw_earned = earned;
        self.state.grade = earned;
        self.state.weight = self.settings.weight;

        let completion = if answered {
            Completion::Complete
        } else {
            Completion::Incomplete
        };
        info!(
            key = %self.key,
            answered,
            grade = earned,
            "result recorded"
        );
        ResultOutcome::Recorded {
            score: self.score(),
            completion,
        }
    }

    /// The score to publish, clamping the stored raw score into
    /// `[0, weight]` first
    pub fn score(&mut self) -> Score {
        let score = Score::clamped(self.state.raw_earned, self.state.weight);
        self.state.raw_earned = score.value;
        score
    }

    pub fn has_submitted_answer(&self) -> bool {
        self.state.is_answered
    }

    pub fn max_score(&self) -> f64 {
        RAW_POSSIBLE
    }

    /// Points earned by the student after weighting
    pub fn weighted_grade(&self) -> f64 {
        self.state.raw_earned * self.settings.weight
    }

    /// Assign the question's unique id if it has none. Returns true when a
    /// new id was generated and the question record needs saving.
    pub fn ensure_unique_id(&mut self) -> bool {
        match self.record.ensure_unique_id() {
            Some(id) => {
                info!(key = %self.key, unique_id = id, "assigned unique id");
                true
            }
            None => false,
        }
    }

    /// Payload for the `get_data` handler
    pub fn data(&self) -> QuestionData {
        QuestionData {
            question: self.state.question.clone(),
            grade: self.state.grade,
            count_attempts: self.state.count_attempts,
            variants_count: self.pool().size(),
            max_attempts: self.settings.max_attempts_code(),
        }
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut StudentState {
        &mut self.state
    }
}
