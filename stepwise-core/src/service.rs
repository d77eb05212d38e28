//! Request-level orchestration of attempt handling
//!
//! Each operation loads the question and student state through the
//! [`Host`], runs one [`QuestionSession`] transition, then writes back and
//! publishes. Writes and gradebook calls are best effort: failures are logged
//! and the caller still gets the locally computed result. Every operation
//! runs in a span carrying the question and student ids.

use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::error::AttemptError;
use crate::host::{Host, StateKey};
use crate::question::{QuestionDescriptor, QuestionForm, QuestionRecord};
use crate::session::{QuestionData, QuestionSession, ResultOutcome};
use crate::widget::{CallbackUrls, WidgetConfig, WidgetSettings};

/// Runs attempt operations against a host
pub struct AttemptService {
    host: Host,
    widget: WidgetSettings,
    rng: Mutex<StdRng>,
}

impl AttemptService {
    pub fn new(host: Host, widget: WidgetSettings) -> Self {
        Self {
            host,
            widget,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Service with a deterministic variant draw (for testing)
    pub fn with_seed(host: Host, widget: WidgetSettings, seed: u64) -> Self {
        Self {
            host,
            widget,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn widget_settings(&self) -> &WidgetSettings {
        &self.widget
    }

    /// Current question and grade summary, selecting a variant on first use
    #[instrument(
        name = "attempt::get_data",
        skip(self, key),
        fields(question_id = %key.question_id, student_id = %key.student_id)
    )]
    pub async fn get_data(&self, key: &StateKey) -> Result<QuestionData, AttemptError> {
        let mut session = self.open(key).await?;
        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            session.current_question(&mut *rng);
        }
        self.persist(&mut session).await;
        Ok(session.data())
    }

    /// Widget configuration for rendering the question to the student
    #[instrument(
        name = "attempt::student_view",
        skip(self, key, handlers),
        fields(question_id = %key.question_id, student_id = %key.student_id)
    )]
    pub async fn student_view(
        &self,
        key: &StateKey,
        handlers: CallbackUrls,
    ) -> Result<WidgetConfig, AttemptError> {
        let mut session = self.open(key).await?;
        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            session.select_new_variant(&mut *rng);
        }
        self.persist(&mut session).await;
        Ok(WidgetConfig::build(&session, &self.widget, handlers))
    }

    /// Count an attempt on variant `q_index`; returns the new attempt count
    #[instrument(
        name = "attempt::start",
        skip(self, key),
        fields(question_id = %key.question_id, student_id = %key.student_id)
    )]
    pub async fn start_attempt(&self, key: &StateKey, q_index: i64) -> Result<u32, AttemptError> {
        let mut session = self.open(key).await?;
        let count = session.start_attempt(q_index)?;
        self.persist(&mut session).await;
        Ok(count)
    }

    /// Select a fresh variant for another try
    #[instrument(
        name = "attempt::retry",
        skip(self, key),
        fields(question_id = %key.question_id, student_id = %key.student_id)
    )]
    pub async fn retry(&self, key: &StateKey) -> Result<QuestionDescriptor, AttemptError> {
        let mut session = self.open(key).await?;
        let question = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            session.select_new_variant(&mut *rng).clone()
        };
        self.persist(&mut session).await;
        Ok(question)
    }

    #[instrument(
        name = "attempt::save_final",
        skip(self, key, payload),
        fields(question_id = %key.question_id, student_id = %key.student_id)
    )]
    pub async fn save_final_results(
        &self,
        key: &StateKey,
        payload: Value,
    ) -> Result<ResultOutcome, AttemptError> {
        let mut session = self.open(key).await?;
        let outcome = session.save_final_result(payload);
        self.persist(&mut session).await;
        self.publish(&session, outcome).await;
        Ok(outcome)
    }

    #[instrument(
        name = "attempt::save_partial",
        skip(self, key, payload),
        fields(question_id = %key.question_id, student_id = %key.student_id)
    )]
    pub async fn save_partial_results(
        &self,
        key: &StateKey,
        payload: Value,
    ) -> Result<ResultOutcome, AttemptError> {
        let mut session = self.open(key).await?;
        let outcome = session.save_partial_result(payload);
        if outcome != ResultOutcome::Ignored {
            self.persist(&mut session).await;
            self.publish(&session, outcome).await;
        }
        Ok(outcome)
    }

    /// Create or update a question from an authoring form.
    ///
    /// `course_id` is only used when the question does not exist yet.
    #[instrument(name = "attempt::save_question", skip(self, form))]
    pub async fn save_question(
        &self,
        question_id: &str,
        course_id: Option<&str>,
        form: &QuestionForm,
    ) -> Result<QuestionRecord, AttemptError> {
        let mut record = match self.host.store.load_question(question_id).await? {
            Some(record) => record,
            None => {
                info!("creating question");
                QuestionRecord::new(question_id, course_id.unwrap_or_default())
            }
        };
        record.apply_form(form)?;
        if let Some(id) = record.ensure_unique_id() {
            info!(unique_id = id, "assigned unique id");
        }

        if let Err(e) = self.host.store.save_question(&record).await {
            warn!(error = %e, "failed to save question");
        }
        Ok(record)
    }

    async fn open(&self, key: &StateKey) -> Result<QuestionSession, AttemptError> {
        let record = self
            .host
            .store
            .load_question(&key.question_id)
            .await?
            .ok_or_else(|| AttemptError::QuestionNotFound(key.question_id.clone()))?;
        let state = self.host.store.load_student(key).await?.unwrap_or_default();
        let course = self.host.courses.course_settings(&record.course_id);
        let identity = self.host.users.identity(&key.student_id).await;
        Ok(QuestionSession::new(key.clone(), record, state, &course, identity))
    }

    async fn persist(&self, session: &mut QuestionSession) {
        if session.ensure_unique_id() {
            if let Err(e) = self.host.store.save_question(session.record()).await {
                warn!(error = %e, "failed to save question record");
            }
        }
        if let Err(e) = self.host.store.save_student(session.key(), session.state()).await {
            warn!(error = %e, "failed to save student state");
        }
    }

    async fn publish(&self, session: &QuestionSession, outcome: ResultOutcome) {
        let ResultOutcome::Recorded { score, completion } = outcome else {
            return;
        };
        if let Err(e) = self.host.grades.publish_grade(session.key(), score).await {
            error!(error = %e, "failed to publish grade");
        }
        if let Err(e) = self.host.grades.emit_completion(session.key(), completion).await {
            error!(error = %e, "failed to report completion");
        }
    }
}
