//! Per-student state for one question, and the submissions it stores
//!
//! Records are schema-versioned. Older records (no version, missing fields,
//! `-1` for "no previous variant", an empty object for "no question", a
//! two-element list for a submission) load with defaults and are brought up
//! to [`STATE_VERSION`] by [`StudentState::upgrade`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::question::QuestionDescriptor;
use crate::variants::AttemptedSet;

/// Current schema version of [`StudentState`]
pub const STATE_VERSION: u32 = 1;

/// Grade value meaning "never graded"
pub const UNGRADED: f64 = -1.0;

/// The student's last session and step log, as posted by the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Submission {
    pub session: Value,
    pub log: Value,
}

impl Submission {
    /// Normalize a widget payload.
    ///
    /// `[session, log]` splits into its parts, an object that already has a
    /// `session` key is kept as is, and anything else becomes the session
    /// with an empty log.
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::Array(items) => {
                let mut items = items.into_iter();
                let session = items.next().unwrap_or_else(|| Value::Object(Default::default()));
                let log = items.next().unwrap_or_else(|| Value::Array(Vec::new()));
                Self { session, log }
            }
            Value::Object(mut map) if map.contains_key("session") => {
                let session = map.remove("session").unwrap_or(Value::Null);
                let log = map.remove("log").unwrap_or_else(|| Value::Array(Vec::new()));
                Self { session, log }
            }
            other => Self {
                session: other,
                log: Value::Array(Vec::new()),
            },
        }
    }
}

impl From<Value> for Submission {
    fn from(value: Value) -> Self {
        Self::from_payload(value)
    }
}

/// Where a student is in working the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPhase {
    NotStarted,
    InProgress,
    Completed,
}

/// Persisted state for one (student, question) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentState {
    #[serde(default)]
    pub version: u32,
    /// Attempts started; never decremented
    pub count_attempts: u32,
    pub variants_attempted: AttemptedSet,
    #[serde(with = "optional_index")]
    pub previous_variant: Option<u32>,
    #[serde(deserialize_with = "empty_object_as_none")]
    pub question: Option<QuestionDescriptor>,
    /// Last computed grade, [`UNGRADED`] until the first result arrives
    pub grade: f64,
    pub raw_earned: f64,
    pub weight: f64,
    pub is_answered: bool,
    pub last_submission: Option<Submission>,
}

impl Default for StudentState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            count_attempts: 0,
            variants_attempted: AttemptedSet::EMPTY,
            previous_variant: None,
            question: None,
            grade: UNGRADED,
            raw_earned: 0.0,
            weight: 1.0,
            is_answered: false,
            last_submission: None,
        }
    }
}

impl StudentState {
    /// Bring an older record up to the current schema. Returns true if the
    /// record changed.
    pub fn upgrade(&mut self) -> bool {
        if self.version >= STATE_VERSION {
            return false;
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            self.weight = 1.0;
        }
        self.version = STATE_VERSION;
        true
    }

    pub fn phase(&self) -> AttemptPhase {
        if self.is_answered {
            AttemptPhase::Completed
        } else if self.count_attempts > 0 || self.last_submission.is_some() {
            AttemptPhase::InProgress
        } else {
            AttemptPhase::NotStarted
        }
    }
}

/// `Option<u32>` stored as an integer with `-1` for `None`
mod optional_index {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(index) => serializer.serialize_i64(i64::from(*index)),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.and_then(|v| u32::try_from(v).ok()))
    }
}

fn empty_object_as_none<'de, D>(deserializer: D) -> Result<Option<QuestionDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => match serde_json::from_value(value) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(e) => {
                warn!(error = %e, "dropping unreadable stored question descriptor");
                Ok(None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submission_splits_session_and_log() {
        let sub = Submission::from_payload(json!([{"phase": "victory"}, [{"step": 1}]]));
        assert_eq!(sub.session, json!({"phase": "victory"}));
        assert_eq!(sub.log, json!([{"step": 1}]));
    }

    #[test]
    fn submission_single_element_list_gets_empty_log() {
        let sub = Submission::from_payload(json!([{"phase": "plan"}]));
        assert_eq!(sub.log, json!([]));
    }

    #[test]
    fn submission_keeps_structured_record() {
        let sub = Submission::from_payload(json!({"session": {"a": 1}, "log": [2]}));
        assert_eq!(sub.session, json!({"a": 1}));
        assert_eq!(sub.log, json!([2]));
    }

    #[test]
    fn submission_wraps_other_payloads() {
        let sub = Submission::from_payload(json!({"errors": 2}));
        assert_eq!(sub.session, json!({"errors": 2}));
        assert_eq!(sub.log, json!([]));
    }

    #[test]
    fn fresh_state_is_not_started() {
        let state = StudentState::default();
        assert_eq!(state.phase(), AttemptPhase::NotStarted);
        assert_eq!(state.grade, UNGRADED);
        assert_eq!(state.version, STATE_VERSION);
    }

    #[test]
    fn legacy_record_loads_and_upgrades() {
        let legacy = json!({
            "count_attempts": 2,
            "variants_attempted": 1,
            "previous_variant": -1,
            "question": {},
            "grade": 1.0,
            "is_answered": true,
            "last_submission": [{"s": 1}, [3]]
        });

        let mut state: StudentState = serde_json::from_value(legacy).unwrap();
        assert_eq!(state.version, 0);
        assert_eq!(state.previous_variant, None);
        assert!(state.question.is_none());
        assert_eq!(state.variants_attempted.bits(), 1);
        assert_eq!(state.last_submission.as_ref().unwrap().log, json!([3]));
        assert_eq!(state.phase(), AttemptPhase::Completed);

        assert!(state.upgrade());
        assert_eq!(state.version, STATE_VERSION);
        assert!(!state.upgrade());
    }

    #[test]
    fn partial_descriptor_fills_missing_fields() {
        let legacy = json!({
            "count_attempts": 1,
            "variants_attempted": 1,
            "previous_variant": 0,
            "question": {"q_id": "P-1", "q_index": 0, "q_label": "old"},
            "grade": -1.0
        });

        let state: StudentState = serde_json::from_value(legacy).unwrap();
        let question = state.question.unwrap();
        assert_eq!(question.q_id, "P-1");
        assert_eq!(question.q_label, "old");
        assert_eq!(question.q_user, "");
        assert_eq!(question.q_weight, 1.0);
        assert_eq!(question.q_max_attempts, -1);
        assert_eq!(question.q_grade_app_key, "SBIRPhase2");
    }

    #[test]
    fn unreadable_descriptor_is_dropped() {
        let legacy = json!({
            "count_attempts": 1,
            "question": {"q_id": "P-1", "q_index": "first"},
            "last_submission": [{"s": 1}]
        });

        let state: StudentState = serde_json::from_value(legacy).unwrap();
        assert!(state.question.is_none());
        assert_eq!(state.count_attempts, 1);
        assert!(state.last_submission.is_some());
    }

    #[test]
    fn state_survives_json() {
        let state = StudentState {
            count_attempts: 3,
            previous_variant: Some(2),
            ..Default::default()
        };
        let text = serde_json::to_string(&state).unwrap();
        assert!(text.contains("\"previous_variant\":2"));
        let parsed: StudentState = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn missing_previous_variant_serializes_as_minus_one() {
        let text = serde_json::to_string(&StudentState::default()).unwrap();
        assert!(text.contains("\"previous_variant\":-1"));
    }
}
