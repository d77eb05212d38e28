//! End-to-end attempt handling over HTTP

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Value, json};
use stepwise_core::{
    Completion, MemoryStore, Score, SettingsLayer, StateKey, StateStore, StaticCourseSettings,
};

use common::{author_question, create_test_app, create_test_app_with_store, student_url, success};

#[tokio::test]
async fn single_variant_question_full_flow() {
    let app = create_test_app();
    author_question(&app, "q1", "course", json!({"label": "Apples"})).await;

    let data: Value = app.server.get(&student_url("q1", "s1", "get_data")).await.json();
    assert_eq!(data["count_attempts"], 0);
    assert_eq!(data["grade"], -1.0);
    assert_eq!(data["variants_count"], 1);
    assert_eq!(data["max_attempts"], -1);
    assert_eq!(data["question"]["q_index"], 0);
    assert_eq!(data["question"]["q_label"], "Apples");

    let started: Value = app
        .server
        .post(&student_url("q1", "s1", "start_attempt"))
        .json(&json!({"q_index": 0}))
        .await
        .json();
    assert_eq!(started["count_attempts"], 1);

    let response = app
        .server
        .post(&student_url("q1", "s1", "save_final_results"))
        .json(&json!([{"status": "complete"}, [{"step": "plan"}]]))
        .await;
    response.assert_status_ok();
    response.assert_json(&success());

    let key = StateKey::new("q1", "s1");
    let state = app.store.load_student(&key).await.unwrap().unwrap();
    assert!(state.is_answered);
    assert_eq!(state.grade, 1.0);
    assert_eq!(
        app.grades.latest_score(&key).await,
        Some(Score {
            value: 1.0,
            max_value: 1.0
        })
    );
    assert_eq!(app.grades.latest_completion(&key).await, Some(Completion::Complete));

    // A stray step callback after completion changes nothing
    let events = app.grades.events().await.len();
    app.server
        .post(&student_url("q1", "s1", "save_partial_results"))
        .json(&json!([{"status": "late"}, []]))
        .await
        .assert_json(&success());
    assert_eq!(app.grades.events().await.len(), events);
    let after = app.store.load_student(&key).await.unwrap().unwrap();
    assert_eq!(after, state);

    let data: Value = app.server.get(&student_url("q1", "s1", "get_data")).await.json();
    assert_eq!(data["grade"], 1.0);
    assert_eq!(data["count_attempts"], 1);
}

#[tokio::test]
async fn course_weight_scales_published_maximum() {
    let mut courses = HashMap::new();
    courses.insert(
        "course".to_string(),
        SettingsLayer {
            weight: Some(2.0),
            max_attempts: Some(3),
            ..Default::default()
        },
    );
    let app = create_test_app_with_store(
        Arc::new(MemoryStore::new()),
        StaticCourseSettings::new(courses),
    );
    author_question(&app, "q1", "course", json!({})).await;

    let data: Value = app.server.get(&student_url("q1", "s1", "get_data")).await.json();
    assert_eq!(data["max_attempts"], 3);
    assert_eq!(data["question"]["q_weight"], 2.0);

    app.server
        .post(&student_url("q1", "s1", "save_final_results"))
        .json(&json!([{}, []]))
        .await
        .assert_status_ok();

    let score = app
        .grades
        .latest_score(&StateKey::new("q1", "s1"))
        .await
        .unwrap();
    assert_eq!(score.value, 1.0);
    assert_eq!(score.max_value, 2.0);
}

#[tokio::test]
async fn question_override_beats_course_default() {
    let mut courses = HashMap::new();
    courses.insert(
        "course".to_string(),
        SettingsLayer {
            weight: Some(2.0),
            ..Default::default()
        },
    );
    let app = create_test_app_with_store(
        Arc::new(MemoryStore::new()),
        StaticCourseSettings::new(courses),
    );
    author_question(&app, "q1", "course", json!({"q_weight": "5", "q_max_attempts": "-1"})).await;

    let data: Value = app.server.get(&student_url("q1", "s1", "get_data")).await.json();
    assert_eq!(data["question"]["q_weight"], 5.0);
    assert_eq!(data["max_attempts"], -1);
}

#[tokio::test]
async fn partial_result_reports_incomplete() {
    let app = create_test_app();
    author_question(&app, "q1", "course", json!({})).await;

    app.server
        .post(&student_url("q1", "s1", "save_partial_results"))
        .json(&json!([{"phase": "solve"}, [{"op": 1}]]))
        .await
        .assert_json(&success());

    let key = StateKey::new("q1", "s1");
    assert_eq!(app.grades.latest_score(&key).await.unwrap().value, 0.0);
    assert_eq!(app.grades.latest_completion(&key).await, Some(Completion::Incomplete));

    let state = app.store.load_student(&key).await.unwrap().unwrap();
    assert!(!state.is_answered);
    assert_eq!(state.last_submission.unwrap().session, json!({"phase": "solve"}));
}

#[tokio::test]
async fn retry_cycles_through_variants() {
    let app = create_test_app();
    author_question(&app, "q1", "course", json!({"variants_count": 3})).await;

    let mut seen = Vec::new();
    let data: Value = app.server.get(&student_url("q1", "s1", "get_data")).await.json();
    let mut current = data["question"]["q_index"].as_i64().unwrap();

    for _ in 0..3 {
        seen.push(current);
        app.server
            .post(&student_url("q1", "s1", "start_attempt"))
            .json(&json!({"q_index": current}))
            .await
            .assert_status_ok();

        let next: Value = app.server.post(&student_url("q1", "s1", "retry")).await.json();
        let index = next["question"]["q_index"].as_i64().unwrap();
        assert!((0..3).contains(&index));
        assert_ne!(index, current);
        current = index;
    }

    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2]);

    let data: Value = app.server.get(&student_url("q1", "s1", "get_data")).await.json();
    assert_eq!(data["count_attempts"], 3);
}

#[tokio::test]
async fn unique_id_assigned_once() {
    let app = create_test_app();
    author_question(&app, "q1", "course", json!({})).await;
    let id = app
        .store
        .load_question("q1")
        .await
        .unwrap()
        .unwrap()
        .unique_id()
        .map(str::to_string)
        .unwrap();

    app.server.get(&student_url("q1", "s1", "get_data")).await.assert_status_ok();
    author_question(&app, "q1", "course", json!({"label": "Renamed"})).await;

    let record = app.store.load_question("q1").await.unwrap().unwrap();
    assert_eq!(record.unique_id(), Some(id.as_str()));
    assert_eq!(record.definition.label, "Renamed");
    assert_eq!(record.display_name, "Step-by-Step POWER");
}

#[tokio::test]
async fn unknown_question_returns_404() {
    let app = create_test_app();
    let response = app
        .server
        .post(&student_url("missing", "s1", "start_attempt"))
        .json(&json!({"q_index": 0}))
        .await;
    response.assert_status_not_found();
}
