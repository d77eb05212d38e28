//! Shared test utilities for stepwise-server integration tests

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{Value, json};
use stepwise_core::{
    AttemptService, Host, MemoryGradebook, MemoryStore, MemoryUserDirectory, StateStore,
    StaticCourseSettings, WidgetSettings,
};
use stepwise_server::{AppState, create_router};

/// A router over in-memory collaborators, with handles to inspect them
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<dyn StateStore>,
    pub grades: Arc<MemoryGradebook>,
    pub users: Arc<MemoryUserDirectory>,
}

/// Creates a test app backed by a memory store
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_store(Arc::new(MemoryStore::new()), StaticCourseSettings::default())
}

/// Creates a test app over the given store and course defaults
pub fn create_test_app_with_store(
    store: Arc<dyn StateStore>,
    courses: StaticCourseSettings,
) -> TestApp {
    let grades = Arc::new(MemoryGradebook::new());
    let users = Arc::new(MemoryUserDirectory::new());
    let host = Host::new(store.clone(), grades.clone(), users.clone(), Arc::new(courses));
    let service = AttemptService::with_seed(host, WidgetSettings::default(), 42);
    let router = create_router(Arc::new(AppState::with_service(service)));

    TestApp {
        server: TestServer::new(router).unwrap(),
        store,
        grades,
        users,
    }
}

/// Author a question through the HTTP surface
#[allow(dead_code)]
pub async fn author_question(app: &TestApp, question_id: &str, course_id: &str, form: Value) {
    app.server
        .post(&format!("/api/questions/{question_id}/save_question"))
        .add_query_param("course_id", course_id)
        .json(&form)
        .await
        .assert_status_ok();
}

#[allow(dead_code)]
pub fn student_url(question_id: &str, student_id: &str, handler: &str) -> String {
    format!("/api/questions/{question_id}/students/{student_id}/{handler}")
}

#[allow(dead_code)]
pub fn success() -> Value {
    json!({"result": "success"})
}
