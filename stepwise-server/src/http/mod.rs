//! HTTP server module

mod api;
mod attempt;
mod authoring;

use std::sync::Arc;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub use api::HealthResponse;
pub use attempt::{
    ResultResponse, RetryResponse, StartAttemptRequest, StartAttemptResponse, StudentPath,
};
pub use authoring::SaveQuestionQuery;

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    // The widget is served from a CDN origin and posts back cross-origin
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/health", get(api::health))
        .route(
            "/api/questions/:question_id/save_question",
            post(authoring::save_question),
        )
        .route(
            &student_route("get_data"),
            get(attempt::get_data).post(attempt::get_data),
        )
        .route(&student_route("student_view"), get(attempt::student_view))
        .route(&student_route("start_attempt"), post(attempt::start_attempt))
        .route(&student_route("retry"), post(attempt::retry))
        .route(
            &student_route("save_final_results"),
            post(attempt::save_final_results),
        )
        .route(
            &student_route("save_partial_results"),
            post(attempt::save_partial_results),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn student_route(handler: &str) -> String {
    format!("/api/questions/:question_id/students/:student_id/{handler}")
}
