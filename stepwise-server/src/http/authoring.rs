//! Authoring handler used by the studio editor

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use stepwise_core::QuestionForm;

use super::attempt::ResultResponse;
use crate::{AppState, ServerError};

#[derive(Debug, Deserialize)]
pub struct SaveQuestionQuery {
    /// Course the question belongs to; only read when creating it
    pub course_id: Option<String>,
}

/// POST /api/questions/:question_id/save_question
pub async fn save_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
    Query(query): Query<SaveQuestionQuery>,
    Json(form): Json<QuestionForm>,
) -> Result<Json<ResultResponse>, ServerError> {
    state
        .service
        .save_question(&question_id, query.course_id.as_deref(), &form)
        .await?;
    Ok(Json(ResultResponse::success()))
}
