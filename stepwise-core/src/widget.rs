//! Configuration object for the embedded tutoring widget
//!
//! The widget reads a single global object describing the problem, the
//! student, display options and the two callback URLs it posts results to.
//! When the student has earlier work, it is handed back as `oldSession` and
//! `oldLog` so the widget can resume.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::environment::Environment;
use crate::session::QuestionSession;

pub const DEFAULT_SWAPI_URL: &str = "https://swapi2.onrender.com";
pub const DEFAULT_GLTF_URL: &str =
    "https://s3.amazonaws.com/stepwise-editorial.querium.com/swReact/dist/models/";

const POLICY_ID: &str = "$A9$";
const FAMILIAR_NAME: &str = "NONE";
const DEFAULT_TITLE: &str = "SAMPLE";

/// Short schema names authors may use, and the names the widget expects
const SCHEMA_NAMES: [(&str, &str); 6] = [
    ("TOTAL", "additiveTotalSchema"),
    ("DIFFERENCE", "additiveDifferenceSchema"),
    ("CHANGEINCREASE", "additiveChangeSchema"),
    ("CHANGEDECREASE", "subtractiveChangeSchema"),
    ("EQUALGROUPS", "multiplicativeEqualGroupsSchema"),
    ("COMPARE", "multiplicativeCompareSchema"),
];

/// Deployment-wide widget settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub swapi_url: String,
    pub gltf_url: String,
    pub environment: Environment,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            swapi_url: DEFAULT_SWAPI_URL.to_string(),
            gltf_url: DEFAULT_GLTF_URL.to_string(),
            environment: Environment::default(),
        }
    }
}

/// Where the widget posts results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackUrls {
    /// Final results
    pub on_complete: String,
    /// Partial results after each step
    pub on_step: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    pub swapi_url: String,
    pub gltf_url: String,
    pub cdn_url: String,
    pub rank: String,
    pub disabled_schemas: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetStudent {
    pub student_id: String,
    pub full_name: String,
    pub familiar_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetProblem {
    pub app_key: String,
    pub policy_id: String,
    pub problem_id: String,
    pub title: String,
    pub stimulus: String,
    pub topic: String,
    pub definition: String,
    pub wp_hints: Value,
    pub math_hints: [String; 3],
}

/// The global object consumed by the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub old_session: Value,
    pub old_log: Value,
    pub options: WidgetOptions,
    pub student: WidgetStudent,
    pub problem: WidgetProblem,
    pub handlers: CallbackUrls,
}

impl WidgetConfig {
    pub fn build(
        session: &QuestionSession,
        settings: &WidgetSettings,
        handlers: CallbackUrls,
    ) -> Self {
        let definition = &session.record().definition;
        let identity = session.identity();

        let (old_session, old_log) = match &session.state().last_submission {
            Some(sub) => (sub.session.clone(), sub.log.clone()),
            None => (Value::Object(Default::default()), Value::Array(Vec::new())),
        };

        let wp_hints = serde_json::from_str(&definition.swpwr_problem_hints).unwrap_or_else(|e| {
            warn!(
                key = %session.key(),
                error = %e,
                "problem hints are not valid JSON, sending none"
            );
            Value::Array(Vec::new())
        });

        let title = if definition.label.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            definition.label.clone()
        };

        Self {
            old_session,
            old_log,
            options: WidgetOptions {
                swapi_url: settings.swapi_url.clone(),
                gltf_url: settings.gltf_url.clone(),
                cdn_url: settings.environment.cdn_url(),
                rank: definition.swpwr_rank.clone(),
                disabled_schemas: map_schema_names(&definition.swpwr_invalid_schemas),
            },
            student: WidgetStudent {
                student_id: identity.username.clone(),
                full_name: identity.full_name.clone(),
                familiar_name: FAMILIAR_NAME.to_string(),
            },
            problem: WidgetProblem {
                app_key: session.settings().grade_app_key.clone(),
                policy_id: POLICY_ID.to_string(),
                problem_id: definition.id.clone(),
                title,
                stimulus: definition.stimulus.clone(),
                topic: definition.qtype.clone(),
                definition: definition.definition.clone(),
                wp_hints,
                math_hints: [
                    definition.hint1.clone(),
                    definition.hint2.clone(),
                    definition.hint3.clone(),
                ],
            },
            handlers,
        }
    }
}

/// Translate short schema names in a comma-separated list to the names the
/// widget expects. Official names pass through unchanged.
pub fn map_schema_names(csv: &str) -> String {
    csv.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            SCHEMA_NAMES
                .iter()
                .find(|(short, _)| short.eq_ignore_ascii_case(name))
                .map_or(name, |(_, official)| official)
        })
        .collect::<Vec<_>>()
        .join(",")
}
