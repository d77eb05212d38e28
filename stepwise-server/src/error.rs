//! Server error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use stepwise_core::AttemptError;
use thiserror::Error;

/// Errors that can occur in the stepwise server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Question not found
    #[error("question not found: {0}")]
    QuestionNotFound(String),

    /// Malformed request input
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::QuestionNotFound(_) => (StatusCode::NOT_FOUND, "QUESTION_NOT_FOUND"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ServerError::Bind { .. } | ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl From<AttemptError> for ServerError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::QuestionNotFound(id) => ServerError::QuestionNotFound(id),
            AttemptError::Variant(e) => ServerError::BadRequest(e.to_string()),
            AttemptError::Form(e) => ServerError::BadRequest(e.to_string()),
            AttemptError::Store(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_core::{BitIndexError, StoreError};

    #[test]
    fn attempt_errors_map_to_status() {
        let not_found: ServerError = AttemptError::QuestionNotFound("q9".into()).into();
        assert_eq!(not_found.status_and_code().0, StatusCode::NOT_FOUND);

        let bad: ServerError = AttemptError::Variant(BitIndexError::Negative(-1)).into();
        assert_eq!(bad.status_and_code(), (StatusCode::BAD_REQUEST, "BAD_REQUEST"));

        let store: ServerError = AttemptError::Store(StoreError::Backend("down".into())).into();
        assert_eq!(store.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
