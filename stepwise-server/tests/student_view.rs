//! Widget configuration served to the student

mod common;

use std::sync::Arc;

use serde_json::{Value, json};
use stepwise_core::{
    FileStore, StateKey, StateStore, StaticCourseSettings, UserDirectory, UserIdentity,
};
use tempfile::tempdir;

use common::{author_question, create_test_app, create_test_app_with_store, student_url};

#[tokio::test]
async fn view_carries_problem_and_student() {
    let app = create_test_app();
    app.users
        .register(
            "s1",
            UserIdentity {
                username: "ada".into(),
                full_name: "Ada Lovelace".into(),
            },
        )
        .await;
    author_question(
        &app,
        "q1",
        "course",
        json!({
            "id": "P-101",
            "stimulus": "Sam has 3 apples",
            "swpwr_invalid_schemas": "TOTAL,DIFFERENCE",
            "swpwr_problem_hints": "[]",
            "hint1": "Count them",
            "q_grade_app_key": "OtherKey"
        }),
    )
    .await;

    let config: Value = app.server.get(&student_url("q1", "s1", "student_view")).await.json();

    assert_eq!(config["student"]["studentId"], "ada");
    assert_eq!(config["student"]["fullName"], "Ada Lovelace");
    assert_eq!(config["student"]["familiarName"], "NONE");
    assert_eq!(config["problem"]["problemId"], "P-101");
    assert_eq!(config["problem"]["stimulus"], "Sam has 3 apples");
    assert_eq!(config["problem"]["appKey"], "OtherKey");
    assert_eq!(config["problem"]["mathHints"][0], "Count them");
    assert_eq!(
        config["options"]["disabledSchemas"],
        "additiveTotalSchema,additiveDifferenceSchema"
    );
    assert_eq!(config["options"]["rank"], "cadet");
    assert_eq!(config["options"]["cdnUrl"], "https://cdn.web.stepwisemath.ai");
    assert_eq!(
        config["handlers"]["onComplete"],
        "/api/questions/q1/students/s1/save_final_results"
    );
    assert_eq!(config["oldSession"], json!({}));
    assert_eq!(config["oldLog"], json!([]));
}

#[tokio::test]
async fn view_resumes_previous_work() {
    let app = create_test_app();
    author_question(&app, "q1", "course", json!({})).await;

    app.server
        .post(&student_url("q1", "s1", "save_partial_results"))
        .json(&json!([{"page": "diagram"}, [{"action": "drag"}]]))
        .await
        .assert_status_ok();

    let config: Value = app.server.get(&student_url("q1", "s1", "student_view")).await.json();
    assert_eq!(config["oldSession"], json!({"page": "diagram"}));
    assert_eq!(config["oldLog"], json!([{"action": "drag"}]));
}

#[tokio::test]
async fn unknown_student_uses_id_as_name() {
    let app = create_test_app();
    author_question(&app, "q1", "course", json!({})).await;
    assert_eq!(app.users.identity("s9").await.username, "s9");

    let config: Value = app.server.get(&student_url("q1", "s9", "student_view")).await.json();
    assert_eq!(config["student"]["studentId"], "s9");
    assert_eq!(config["student"]["fullName"], "s9");
}

#[tokio::test]
async fn file_store_keeps_state_between_servers() {
    let dir = tempdir().unwrap();
    let key = StateKey::new("q1", "s1");

    {
        let app = create_test_app_with_store(
            Arc::new(FileStore::new(dir.path())),
            StaticCourseSettings::default(),
        );
        author_question(&app, "q1", "course", json!({"label": "Persisted"})).await;
        app.server
            .post(&student_url("q1", "s1", "start_attempt"))
            .json(&json!({"q_index": 0}))
            .await
            .assert_status_ok();
    }

    let store = Arc::new(FileStore::new(dir.path()));
    let state = store.load_student(&key).await.unwrap().unwrap();
    assert_eq!(state.count_attempts, 1);

    let app = create_test_app_with_store(store, StaticCourseSettings::default());
    let data: Value = app.server.get(&student_url("q1", "s1", "get_data")).await.json();
    assert_eq!(data["count_attempts"], 1);
    assert_eq!(data["question"]["q_label"], "Persisted");
}
