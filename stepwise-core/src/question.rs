//! Question content, authoring form parsing, and the variant descriptor
//! handed to the tutoring widget

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::QuestionFormError;
use crate::grading::{GradingSettings, SettingsLayer};

/// Rank shown to students when the author sets none
pub const DEFAULT_RANK: &str = "cadet";

/// Display name assigned when a question is saved from the authoring view
pub const AUTHORED_DISPLAY_NAME: &str = "Step-by-Step POWER";

/// Values of the unique id that older course imports left behind
const UNSET_UNIQUE_IDS: [&str; 2] = ["", "NONE"];

/// The problem a question poses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionDefinition {
    pub id: String,
    pub label: String,
    pub stimulus: String,
    pub definition: String,
    pub qtype: String,
    pub display_math: String,
    pub hint1: String,
    pub hint2: String,
    pub hint3: String,
    pub swpwr_problem: String,
    pub swpwr_rank: String,
    /// Comma-separated schema names the student may not use
    pub swpwr_invalid_schemas: String,
    /// JSON text of page-specific hints
    pub swpwr_problem_hints: String,
}

impl Default for QuestionDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            label: String::new(),
            stimulus: r"Solve for \(a\). \(5a+4=2a-5\)".to_string(),
            definition: "SolveFor[5a+4=2a-5,a]".to_string(),
            qtype: "gradeBasicAlgebra".to_string(),
            display_math: r"\(\)".to_string(),
            hint1: String::new(),
            hint2: String::new(),
            hint3: String::new(),
            swpwr_problem: String::new(),
            swpwr_rank: DEFAULT_RANK.to_string(),
            swpwr_invalid_schemas: String::new(),
            swpwr_problem_hints: "[]".to_string(),
        }
    }
}

/// Content-scoped record for one question instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionRecord {
    pub question_id: String,
    pub course_id: String,
    /// Stable identifier, generated on first persist
    pub unique_id: Option<String>,
    pub display_name: String,
    /// Number of variants in the pool
    pub variants_count: i64,
    pub definition: QuestionDefinition,
    pub overrides: SettingsLayer,
}

impl Default for QuestionRecord {
    fn default() -> Self {
        Self {
            question_id: String::new(),
            course_id: String::new(),
            unique_id: None,
            display_name: "SWPWR".to_string(),
            variants_count: 1,
            definition: QuestionDefinition::default(),
            overrides: SettingsLayer::default(),
        }
    }
}

impl QuestionRecord {
    pub fn new(question_id: impl Into<String>, course_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            course_id: course_id.into(),
            ..Default::default()
        }
    }

    /// The unique id, if one has been assigned
    pub fn unique_id(&self) -> Option<&str> {
        self.unique_id
            .as_deref()
            .filter(|id| !UNSET_UNIQUE_IDS.contains(id))
    }

    /// Assign a fresh unique id if none is set. Returns the new id when one
    /// was generated; an existing id is never replaced.
    pub fn ensure_unique_id(&mut self) -> Option<&str> {
        if self.unique_id().is_some() {
            return None;
        }
        self.unique_id = Some(Uuid::new_v4().simple().to_string());
        self.unique_id.as_deref()
    }

    /// Apply an authoring form. Fields absent from the form keep their
    /// current values.
    pub fn apply_form(&mut self, form: &QuestionForm) -> Result<(), QuestionFormError> {
        let o = &mut self.overrides;
        if let Some(v) = form.int("q_max_attempts")? {
            o.max_attempts = Some(v);
        }
        if let Some(v) = form.float("q_weight")? {
            o.weight = Some(v);
        }
        if let Some(v) = form.flag("q_option_showme") {
            o.option_showme = Some(v);
        }
        if let Some(v) = form.flag("q_option_hint") {
            o.option_hint = Some(v);
        }
        if let Some(v) = form.float("q_grade_showme_ded")? {
            o.grade_showme_ded = Some(v);
        }
        if let Some(v) = form.int("q_grade_hints_count")? {
            o.grade_hints_count = Some(v);
        }
        if let Some(v) = form.float("q_grade_hints_ded")? {
            o.grade_hints_ded = Some(v);
        }
        if let Some(v) = form.int("q_grade_errors_count")? {
            o.grade_errors_count = Some(v);
        }
        if let Some(v) = form.float("q_grade_errors_ded")? {
            o.grade_errors_ded = Some(v);
        }
        if let Some(v) = form.int("q_grade_min_steps_count")? {
            o.grade_min_steps_count = Some(v);
        }
        if let Some(v) = form.float("q_grade_min_steps_ded")? {
            o.grade_min_steps_ded = Some(v);
        }
        if let Some(v) = form.text("q_grade_app_key") {
            o.grade_app_key = Some(v);
        }
        if let Some(v) = form.int("variants_count")? {
            self.variants_count = v;
        }

        let d = &mut self.definition;
        let text_fields: [(&str, &mut String); 13] = [
            ("id", &mut d.id),
            ("label", &mut d.label),
            ("stimulus", &mut d.stimulus),
            ("definition", &mut d.definition),
            ("qtype", &mut d.qtype),
            ("display_math", &mut d.display_math),
            ("hint1", &mut d.hint1),
            ("hint2", &mut d.hint2),
            ("hint3", &mut d.hint3),
            ("swpwr_problem", &mut d.swpwr_problem),
            ("swpwr_rank", &mut d.swpwr_rank),
            ("swpwr_invalid_schemas", &mut d.swpwr_invalid_schemas),
            ("swpwr_problem_hints", &mut d.swpwr_problem_hints),
        ];
        for (name, slot) in text_fields {
            if let Some(v) = form.text(name) {
                *slot = v;
            }
        }

        self.display_name = AUTHORED_DISPLAY_NAME.to_string();
        Ok(())
    }
}

/// Authoring form as posted by the studio view. Values arrive as strings or
/// JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionForm(Map<String, Value>);

impl QuestionForm {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    fn raw(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    fn text(&self, field: &str) -> Option<String> {
        self.raw(field).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn int(&self, field: &str) -> Result<Option<i64>, QuestionFormError> {
        let Some(value) = self.raw(field) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| invalid(field, "integer", value))
    }

    fn float(&self, field: &str) -> Result<Option<f64>, QuestionFormError> {
        let Some(value) = self.raw(field) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|f| f.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(field, "number", value))
    }

    /// `"true"` in any case is true, anything else is false
    fn flag(&self, field: &str) -> Option<bool> {
        self.raw(field).map(|v| match v {
            Value::Bool(b) => *b,
            Value::String(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        })
    }
}

/// `3.0` is 3; fractional or out-of-range values are not integers
fn whole_number(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn invalid(field: &str, expected: &'static str, value: &Value) -> QuestionFormError {
    QuestionFormError::Invalid {
        field: field.to_string(),
        expected,
        value: value.to_string(),
    }
}

/// The question variant currently presented to a student, with resolved
/// settings. Field names match what the widget reads.
///
/// Fields missing from a stored descriptor take the values an unauthored
/// question with default settings would have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionDescriptor {
    pub q_id: String,
    pub q_user: String,
    pub q_index: u32,
    pub q_label: String,
    pub q_stimulus: String,
    pub q_definition: String,
    pub q_type: String,
    pub q_display_math: String,
    pub q_hint1: String,
    pub q_hint2: String,
    pub q_hint3: String,
    pub q_swpwr_problem: String,
    pub q_swpwr_rank: String,
    pub q_swpwr_invalid_schemas: String,
    pub q_swpwr_problem_hints: String,
    pub q_weight: f64,
    pub q_max_attempts: i64,
    pub q_option_hint: bool,
    pub q_option_showme: bool,
    pub q_grade_showme_ded: f64,
    pub q_grade_hints_count: i64,
    pub q_grade_hints_ded: f64,
    pub q_grade_errors_count: i64,
    pub q_grade_errors_ded: f64,
    pub q_grade_min_steps_count: i64,
    pub q_grade_min_steps_ded: f64,
    pub q_grade_app_key: String,
}

impl QuestionDescriptor {
    pub fn new(
        definition: &QuestionDefinition,
        settings: &GradingSettings,
        username: &str,
        index: u32,
    ) -> Self {
        Self {
            q_id: definition.id.clone(),
            q_user: username.to_string(),
            q_index: index,
            q_label: definition.label.clone(),
            q_stimulus: definition.stimulus.clone(),
            q_definition: definition.definition.clone(),
            q_type: definition.qtype.clone(),
            q_display_math: definition.display_math.clone(),
            q_hint1: definition.hint1.clone(),
            q_hint2: definition.hint2.clone(),
            q_hint3: definition.hint3.clone(),
            q_swpwr_problem: definition.swpwr_problem.clone(),
            q_swpwr_rank: definition.swpwr_rank.clone(),
            q_swpwr_invalid_schemas: definition.swpwr_invalid_schemas.clone(),
            q_swpwr_problem_hints: definition.swpwr_problem_hints.clone(),
            q_weight: settings.weight,
            q_max_attempts: settings.max_attempts_code(),
            q_option_hint: settings.option_hint,
            q_option_showme: settings.option_showme,
            q_grade_showme_ded: settings.grade_showme_ded,
            q_grade_hints_count: settings.grade_hints_count,
            q_grade_hints_ded: settings.grade_hints_ded,
            q_grade_errors_count: settings.grade_errors_count,
            q_grade_errors_ded: settings.grade_errors_ded,
            q_grade_min_steps_count: settings.grade_min_steps_count,
            q_grade_min_steps_ded: settings.grade_min_steps_ded,
            q_grade_app_key: settings.grade_app_key.clone(),
        }
    }
}

impl Default for QuestionDescriptor {
    fn default() -> Self {
        Self::new(
            &QuestionDefinition::default(),
            &GradingSettings::default(),
            "",
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> QuestionForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unique_id_is_generated_once() {
        let mut record = QuestionRecord::new("q1", "course");
        assert!(record.unique_id().is_none());

        let generated = record.ensure_unique_id().map(str::to_string);
        assert!(generated.is_some());
        assert_eq!(record.unique_id(), generated.as_deref());

        assert!(record.ensure_unique_id().is_none());
        assert_eq!(record.unique_id(), generated.as_deref());
    }

    #[test]
    fn legacy_none_unique_id_is_replaced() {
        let mut record = QuestionRecord::new("q1", "course");
        record.unique_id = Some("NONE".into());
        assert!(record.unique_id().is_none());
        let id = record.ensure_unique_id().unwrap().to_string();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn apply_form_parses_strings() {
        let mut record = QuestionRecord::new("q1", "course");
        record
            .apply_form(&form(json!({
                "q_max_attempts": "3",
                "q_weight": "2.5",
                "q_option_showme": "False",
                "q_option_hint": "TRUE",
                "q_grade_hints_count": 4,
                "q_grade_app_key": "Key",
                "id": "P-17",
                "stimulus": "Solve it",
                "swpwr_invalid_schemas": "TOTAL,COMPARE",
            })))
            .unwrap();

        assert_eq!(record.overrides.max_attempts, Some(3));
        assert_eq!(record.overrides.weight, Some(2.5));
        assert_eq!(record.overrides.option_showme, Some(false));
        assert_eq!(record.overrides.option_hint, Some(true));
        assert_eq!(record.overrides.grade_hints_count, Some(4));
        assert_eq!(record.overrides.grade_app_key.as_deref(), Some("Key"));
        assert_eq!(record.definition.id, "P-17");
        assert_eq!(record.definition.stimulus, "Solve it");
        assert_eq!(record.definition.swpwr_invalid_schemas, "TOTAL,COMPARE");
        assert_eq!(record.display_name, AUTHORED_DISPLAY_NAME);
    }

    #[test]
    fn apply_form_keeps_absent_fields() {
        let mut record = QuestionRecord::new("q1", "course");
        record.definition.label = "Keep me".into();
        record.apply_form(&form(json!({"id": "P-1"}))).unwrap();
        assert_eq!(record.definition.label, "Keep me");
        assert_eq!(record.definition.swpwr_rank, DEFAULT_RANK);
    }

    #[test]
    fn apply_form_rejects_bad_numbers() {
        let mut record = QuestionRecord::new("q1", "course");
        let err = record
            .apply_form(&form(json!({"q_weight": "heavy"})))
            .unwrap_err();
        assert!(matches!(err, QuestionFormError::Invalid { ref field, .. } if field == "q_weight"));
    }

    #[test]
    fn apply_form_rejects_fractional_integers() {
        let mut record = QuestionRecord::new("q1", "course");
        let err = record
            .apply_form(&form(json!({"q_max_attempts": 2.7})))
            .unwrap_err();
        assert!(
            matches!(err, QuestionFormError::Invalid { ref field, .. } if field == "q_max_attempts")
        );
        assert_eq!(record.overrides.max_attempts, None);

        record.apply_form(&form(json!({"q_max_attempts": 3.0}))).unwrap();
        assert_eq!(record.overrides.max_attempts, Some(3));
    }

    #[test]
    fn partial_descriptor_deserializes_with_defaults() {
        let descriptor: QuestionDescriptor =
            serde_json::from_value(json!({"q_id": "P-1", "q_swreact_problem": "x"})).unwrap();
        assert_eq!(descriptor.q_id, "P-1");
        assert_eq!(descriptor.q_index, 0);
        assert_eq!(descriptor.q_weight, 1.0);
        assert!(descriptor.q_option_hint);
    }

    #[test]
    fn descriptor_carries_resolved_settings() {
        let definition = QuestionDefinition {
            id: "P-2".into(),
            ..Default::default()
        };
        let settings = GradingSettings {
            weight: 2.0,
            ..Default::default()
        };
        let descriptor = QuestionDescriptor::new(&definition, &settings, "student1", 0);
        assert_eq!(descriptor.q_id, "P-2");
        assert_eq!(descriptor.q_user, "student1");
        assert_eq!(descriptor.q_weight, 2.0);
        assert_eq!(descriptor.q_max_attempts, -1);
        assert_eq!(descriptor.q_grade_app_key, "SBIRPhase2");
    }
}
