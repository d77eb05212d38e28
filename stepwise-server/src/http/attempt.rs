//! Student-facing handlers called by the tutoring widget
//!
//! All routes live under `/api/questions/:question_id/students/:student_id`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stepwise_core::{CallbackUrls, QuestionData, QuestionDescriptor, StateKey, WidgetConfig};

use crate::{AppState, ServerError};

/// Path parameters shared by every student route
#[derive(Debug, Deserialize)]
pub struct StudentPath {
    pub question_id: String,
    pub student_id: String,
}

impl From<StudentPath> for StateKey {
    fn from(p: StudentPath) -> Self {
        StateKey::new(p.question_id, p.student_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartAttemptRequest {
    pub q_index: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartAttemptResponse {
    pub count_attempts: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RetryResponse {
    pub question: QuestionDescriptor,
}

/// Acknowledgement returned once local state is computed
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: String,
}

impl ResultResponse {
    pub fn success() -> Self {
        Self {
            result: "success".to_string(),
        }
    }
}

/// Callback URLs the widget posts results back to
fn callback_urls(key: &StateKey) -> CallbackUrls {
    let base = format!(
        "/api/questions/{}/students/{}",
        urlencoding::encode(&key.question_id),
        urlencoding::encode(&key.student_id)
    );
    CallbackUrls {
        on_complete: format!("{base}/save_final_results"),
        on_step: format!("{base}/save_partial_results"),
    }
}

/// GET|POST .../get_data
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Path(path): Path<StudentPath>,
) -> Result<Json<QuestionData>, ServerError> {
    let key = StateKey::from(path);
    Ok(Json(state.service.get_data(&key).await?))
}

/// GET .../student_view
pub async fn student_view(
    State(state): State<Arc<AppState>>,
    Path(path): Path<StudentPath>,
) -> Result<Json<WidgetConfig>, ServerError> {
    let key = StateKey::from(path);
    let handlers = callback_urls(&key);
    Ok(Json(state.service.student_view(&key, handlers).await?))
}

/// POST .../start_attempt
pub async fn start_attempt(
    State(state): State<Arc<AppState>>,
    Path(path): Path<StudentPath>,
    Json(request): Json<StartAttemptRequest>,
) -> Result<Json<StartAttemptResponse>, ServerError> {
    let key = StateKey::from(path);
    let count_attempts = state.service.start_attempt(&key, request.q_index).await?;
    Ok(Json(StartAttemptResponse { count_attempts }))
}

/// POST .../retry
pub async fn retry(
    State(state): State<Arc<AppState>>,
    Path(path): Path<StudentPath>,
) -> Result<Json<RetryResponse>, ServerError> {
    let key = StateKey::from(path);
    let question = state.service.retry(&key).await?;
    Ok(Json(RetryResponse { question }))
}

/// POST .../save_final_results
pub async fn save_final_results(
    State(state): State<Arc<AppState>>,
    Path(path): Path<StudentPath>,
    Json(payload): Json<Value>,
) -> Result<Json<ResultResponse>, ServerError> {
    let key = StateKey::from(path);
    state.service.save_final_results(&key, payload).await?;
    Ok(Json(ResultResponse::success()))
}

/// POST .../save_partial_results
pub async fn save_partial_results(
    State(state): State<Arc<AppState>>,
    Path(path): Path<StudentPath>,
    Json(payload): Json<Value>,
) -> Result<Json<ResultResponse>, ServerError> {
    let key = StateKey::from(path);
    state.service.save_partial_results(&key, payload).await?;
    Ok(Json(ResultResponse::success()))
}
