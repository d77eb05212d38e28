//! Layered grading settings
//!
//! Every setting resolves independently as
//! `question override ?? course default ?? hardcoded fallback`.
//! Authoring tools mark a value as "use the fallback" with a sentinel
//! (a negative number or an empty string); [`SettingsLayer::normalized`]
//! turns those into `None` before resolution.

use serde::{Deserialize, Serialize};

/// App key used when neither the question nor the course sets one
pub const DEFAULT_APP_KEY: &str = "SBIRPhase2";

/// Value reported for `max_attempts` when attempts are unlimited
pub const UNLIMITED_ATTEMPTS: i64 = -1;

/// One layer of optional grading settings (a question's overrides, or a
/// course's defaults)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsLayer {
    pub weight: Option<f64>,
    pub max_attempts: Option<i64>,
    pub option_hint: Option<bool>,
    pub option_showme: Option<bool>,
    pub grade_showme_ded: Option<f64>,
    pub grade_hints_count: Option<i64>,
    pub grade_hints_ded: Option<f64>,
    pub grade_errors_count: Option<i64>,
    pub grade_errors_ded: Option<f64>,
    pub grade_min_steps_count: Option<i64>,
    pub grade_min_steps_ded: Option<f64>,
    pub grade_app_key: Option<String>,
}

impl SettingsLayer {
    /// Replace sentinel values with `None`
    pub fn normalized(self) -> Self {
        Self {
            weight: unset_if_negative(self.weight),
            max_attempts: self.max_attempts.filter(|n| *n >= 0),
            option_hint: self.option_hint,
            option_showme: self.option_showme,
            grade_showme_ded: unset_if_negative(self.grade_showme_ded),
            grade_hints_count: self.grade_hints_count.filter(|n| *n >= 0),
            grade_hints_ded: unset_if_negative(self.grade_hints_ded),
            grade_errors_count: self.grade_errors_count.filter(|n| *n >= 0),
            grade_errors_ded: unset_if_negative(self.grade_errors_ded),
            grade_min_steps_count: self.grade_min_steps_count.filter(|n| *n >= 0),
            grade_min_steps_ded: unset_if_negative(self.grade_min_steps_ded),
            grade_app_key: self.grade_app_key.filter(|key| !key.is_empty()),
        }
    }

    /// Fields set in `over` replace ours; unset ones keep ours
    pub fn overlay(self, over: SettingsLayer) -> Self {
        Self {
            weight: over.weight.or(self.weight),
            max_attempts: over.max_attempts.or(self.max_attempts),
            option_hint: over.option_hint.or(self.option_hint),
            option_showme: over.option_showme.or(self.option_showme),
            grade_showme_ded: over.grade_showme_ded.or(self.grade_showme_ded),
            grade_hints_count: over.grade_hints_count.or(self.grade_hints_count),
            grade_hints_ded: over.grade_hints_ded.or(self.grade_hints_ded),
            grade_errors_count: over.grade_errors_count.or(self.grade_errors_count),
            grade_errors_ded: over.grade_errors_ded.or(self.grade_errors_ded),
            grade_min_steps_count: over.grade_min_steps_count.or(self.grade_min_steps_count),
            grade_min_steps_ded: over.grade_min_steps_ded.or(self.grade_min_steps_ded),
            grade_app_key: over.grade_app_key.or(self.grade_app_key),
        }
    }
}

fn unset_if_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Pick the first set layer, else the fallback
pub fn resolve_layered<T>(question: Option<T>, course: Option<T>, fallback: T) -> T {
    question.or(course).unwrap_or(fallback)
}

/// Fully resolved grading settings for one question
///
/// The deduction and threshold fields are stored and reported to the widget
/// but do not take part in [`compute_grade`](super::compute_grade).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingSettings {
    pub weight: f64,
    /// `None` means unlimited
    pub max_attempts: Option<u32>,
    pub option_hint: bool,
    pub option_showme: bool,
    pub grade_showme_ded: f64,
    pub grade_hints_count: i64,
    pub grade_hints_ded: f64,
    pub grade_errors_count: i64,
    pub grade_errors_ded: f64,
    pub grade_min_steps_count: i64,
    pub grade_min_steps_ded: f64,
    pub grade_app_key: String,
}

impl Default for GradingSettings {
    fn default() -> Self {
        Self {
            weight: 1.0,
            max_attempts: None,
            option_hint: true,
            option_showme: true,
            grade_showme_ded: 0.25,
            grade_hints_count: 2,
            grade_hints_ded: 1.0,
            grade_errors_count: 2,
            grade_errors_ded: 1.0,
            grade_min_steps_count: 3,
            grade_min_steps_ded: 0.0,
            grade_app_key: DEFAULT_APP_KEY.to_string(),
        }
    }
}

impl GradingSettings {
    /// Resolve each field from the question layer, then the course layer,
    /// then the hardcoded default
    pub fn resolve(question: &SettingsLayer, course: &SettingsLayer) -> Self {
        let q = question.clone().normalized();
        let c = course.clone().normalized();
        let d = Self::default();

        Self {
            weight: resolve_layered(q.weight, c.weight, d.weight),
            max_attempts: q
                .max_attempts
                .or(c.max_attempts)
                .and_then(|n| u32::try_from(n).ok()),
            option_hint: resolve_layered(q.option_hint, c.option_hint, d.option_hint),
            option_showme: resolve_layered(q.option_showme, c.option_showme, d.option_showme),
            grade_showme_ded: resolve_layered(
                q.grade_showme_ded,
                c.grade_showme_ded,
                d.grade_showme_ded,
            ),
            grade_hints_count: resolve_layered(
                q.grade_hints_count,
                c.grade_hints_count,
                d.grade_hints_count,
            ),
            grade_hints_ded: resolve_layered(
                q.grade_hints_ded,
                c.grade_hints_ded,
                d.grade_hints_ded,
            ),
            grade_errors_count: resolve_layered(
                q.grade_errors_count,
                c.grade_errors_count,
                d.grade_errors_count,
            ),
            grade_errors_ded: resolve_layered(
                q.grade_errors_ded,
                c.grade_errors_ded,
                d.grade_errors_ded,
            ),
            grade_min_steps_count: resolve_layered(
                q.grade_min_steps_count,
                c.grade_min_steps_count,
                d.grade_min_steps_count,
            ),
            grade_min_steps_ded: resolve_layered(
                q.grade_min_steps_ded,
                c.grade_min_steps_ded,
                d.grade_min_steps_ded,
            ),
            grade_app_key: resolve_layered(q.grade_app_key, c.grade_app_key, d.grade_app_key),
        }
    }

    /// Max attempts as reported to the UI (`-1` for unlimited)
    pub fn max_attempts_code(&self) -> i64 {
        self.max_attempts
            .map(i64::from)
            .unwrap_or(UNLIMITED_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layers_use_fallbacks() {
        let resolved =
            GradingSettings::resolve(&SettingsLayer::default(), &SettingsLayer::default());
        assert_eq!(resolved, GradingSettings::default());
        assert_eq!(resolved.max_attempts_code(), UNLIMITED_ATTEMPTS);
        assert_eq!(resolved.grade_app_key, DEFAULT_APP_KEY);
    }

    #[test]
    fn question_override_beats_course_default() {
        let question = SettingsLayer {
            weight: Some(3.0),
            ..Default::default()
        };
        let course = SettingsLayer {
            weight: Some(2.0),
            max_attempts: Some(5),
            ..Default::default()
        };

        let resolved = GradingSettings::resolve(&question, &course);
        assert_eq!(resolved.weight, 3.0);
        assert_eq!(resolved.max_attempts, Some(5));
    }

    #[test]
    fn fields_resolve_independently() {
        let question = SettingsLayer {
            option_hint: Some(false),
            grade_app_key: Some("QuestionKey".into()),
            ..Default::default()
        };
        let course = SettingsLayer {
            option_showme: Some(false),
            grade_hints_count: Some(4),
            ..Default::default()
        };

        let resolved = GradingSettings::resolve(&question, &course);
        assert!(!resolved.option_hint);
        assert!(!resolved.option_showme);
        assert_eq!(resolved.grade_hints_count, 4);
        assert_eq!(resolved.grade_app_key, "QuestionKey");
        assert_eq!(resolved.grade_errors_count, 2);
    }

    #[test]
    fn sentinels_fall_through_to_next_layer() {
        let question = SettingsLayer {
            weight: Some(-1.0),
            max_attempts: Some(-1),
            grade_app_key: Some(String::new()),
            ..Default::default()
        };
        let course = SettingsLayer {
            weight: Some(4.0),
            grade_app_key: Some("CourseKey".into()),
            ..Default::default()
        };

        let resolved = GradingSettings::resolve(&question, &course);
        assert_eq!(resolved.weight, 4.0);
        assert_eq!(resolved.max_attempts, None);
        assert_eq!(resolved.grade_app_key, "CourseKey");
    }

    #[test]
    fn zero_is_a_real_value() {
        let question = SettingsLayer {
            weight: Some(0.0),
            max_attempts: Some(0),
            ..Default::default()
        };
        let resolved = GradingSettings::resolve(&question, &SettingsLayer::default());
        assert_eq!(resolved.weight, 0.0);
        assert_eq!(resolved.max_attempts_code(), 0);
    }

    #[test]
    fn layer_accepts_integer_weight() {
        let layer: SettingsLayer =
            serde_json::from_str(r#"{"weight": 2, "max_attempts": 3, "option_showme": false}"#)
                .unwrap();
        assert_eq!(layer.weight, Some(2.0));
        assert_eq!(layer.max_attempts, Some(3));
        assert_eq!(layer.option_showme, Some(false));
        assert!(layer.grade_app_key.is_none());
    }
}
