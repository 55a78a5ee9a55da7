mod common;
use std::collections::HashMap;

use axum::http::StatusCode;
use schoolhub::model::DatabaseError;
use schoolhub::model::entity::{LessonTask, LessonTaskState};
use schoolhub::quiz::Exercise;
use schoolhub::web::AuthenticatedUser;
use serde_json::{Value, json};

use crate::common::{
    Action, Flow, date, seed_group, seed_lesson, seed_student_account, seed_teacher, setup_server,
    setup_test_db, signin_action,
};

fn canonical(exercises: &[Exercise]) -> HashMap<String, String> {
    exercises
        .iter()
        .enumerate()
        .map(|(idx, ex)| (idx.to_string(), ex.answer().to_string()))
        .collect()
}

#[tokio::test]
async fn lesson_view_submit_and_result_test() {
    let db = setup_test_db().await;
    let group = seed_group(&db, 1.0, None).await;
    let student = seed_student_account(&db, "Anna Ivanova", "anna", Some(&group)).await;
    let lesson = seed_lesson(&db, date(2025, 10, 15), "comparison").await;
    let mut server = setup_server(&db).await;
    server.save_cookies();

    server
        .post("/api/v1/account/signin")
        .json(&json!({ "username": "anna", "password": "anna" }))
        .await
        .assert_status_ok();

    // nothing to show before submission
    server
        .get("/api/v1/lessons/2025-10-15/result")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let first: Value = server.get("/api/v1/lessons/2025-10-15").await.json();
    let second: Value = server.get("/api/v1/lessons/2025-10-15").await.json();

    assert_eq!(first["state"], "pending");
    assert_eq!(first["lesson"]["title"], "Lesson 2025-10-15");
    assert_eq!(first["exercises"].as_array().unwrap().len(), 10);
    assert_eq!(first["exercises"], second["exercises"]);
    assert!(first["result"].is_null());
    for exercise in first["exercises"].as_array().unwrap() {
        assert!(exercise.get("answer").is_none());
        assert!(exercise.get("answer_num").is_none());
    }

    let task = LessonTask::find_for(&db.mm(), &AuthenticatedUser::admin(), lesson.id(), student.id())
        .await
        .unwrap()
        .unwrap();
    let answers = canonical(&task.exercises().unwrap());

    let submitted = server
        .post("/api/v1/lessons/2025-10-15/submit")
        .json(&json!({ "answers": answers }))
        .await;
    submitted.assert_status_ok();
    let submitted: Value = submitted.json();
    assert_eq!(submitted["score"], 7);
    assert_eq!(submitted["correct_count"], 10);
    assert_eq!(submitted["total_count"], 10);
    assert_eq!(submitted["earned_points"], 11);
    assert_eq!(submitted["total_points"], 11);

    // a second try is rejected and changes nothing
    server
        .post("/api/v1/lessons/2025-10-15/submit")
        .json(&json!({ "answers": {} }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let result: Value = server.get("/api/v1/lessons/2025-10-15/result").await.json();
    assert_eq!(result["score"], 7);
    assert_eq!(result["correct_count"], 10);
    // the response to the submit is the stored result
    assert_eq!(result, submitted);
    let outcomes = submitted["exercises"].as_array().unwrap();
    assert_eq!(outcomes.len(), 10);
    assert!(outcomes.iter().all(|o| o["correct"] == true));

    let view: Value = server.get("/api/v1/lessons/2025-10-15").await.json();
    assert_eq!(view["state"], "submitted");
    assert_eq!(view["result"]["score"], 7);
    assert_eq!(view["exercises"], first["exercises"]);
}

#[tokio::test]
async fn lesson_routes_need_student_test() {
    let db = setup_test_db().await;
    seed_teacher(&db, "teacher").await;
    let group = seed_group(&db, 1.0, None).await;
    seed_student_account(&db, "Anna Ivanova", "anna", Some(&group)).await;
    seed_lesson(&db, date(2025, 9, 1), "mixed_fractions").await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(
            Action::new("lesson_anonymous", "GET", "/api/v1/lessons/2025-09-01")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(signin_action("teacher", "teacher"))
        .step(
            Action::new("lesson_teacher", "GET", "/api/v1/lessons/2025-09-01")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(signin_action("anna", "anna").with_clear_cookies(true))
        .step(
            Action::new("lesson_missing", "GET", "/api/v1/lessons/2030-01-01")
                .with_expect(StatusCode::NOT_FOUND),
        )
        // submitting a never opened lesson
        .step(
            Action::new("submit_unopened", "POST", "/api/v1/lessons/2025-09-01/submit")
                .with_body(json!({ "answers": {} }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("lesson", "GET", "/api/v1/lessons/2025-09-01").assert_body(|body| {
                let view: Value = serde_json::from_str(body).unwrap();
                let kinds: Vec<_> = view["exercises"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|e| e["type"].as_str().unwrap().to_string())
                    .collect();
                assert_eq!(kinds[0], "classify");
                assert_eq!(kinds[3], "mixed_to_improper");
                assert_eq!(kinds[9], "improper_to_mixed");
            }),
        )
        .step(
            Action::new("submit_empty", "POST", "/api/v1/lessons/2025-09-01/submit")
                .with_body(json!({ "answers": {} }))
                .assert_body(|body| {
                    let result: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(result["score"], 1);
                    assert_eq!(result["correct_count"], 0);
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn task_generation_is_idempotent_test() {
    let db = setup_test_db().await;
    let student = seed_student_account(&db, "Anna Ivanova", "anna", None).await;
    let lesson = seed_lesson(&db, date(2025, 9, 1), "unknown selector").await;
    let mm = db.mm();
    let actor = AuthenticatedUser::admin();

    let first = LessonTask::get_or_create(&mm, &actor, &lesson, student.id())
        .await
        .unwrap();
    let second = LessonTask::get_or_create(&mm, &actor, &lesson, student.id())
        .await
        .unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(first.exercises().unwrap(), second.exercises().unwrap());
    assert_eq!(first.state(), LessonTaskState::Pending);
    // unknown selectors fall back to mixed fractions
    assert!(matches!(
        first.exercises().unwrap()[0],
        Exercise::Classify { .. }
    ));
}

#[tokio::test]
async fn concurrent_submission_is_rejected_test() {
    let db = setup_test_db().await;
    let student = seed_student_account(&db, "Anna Ivanova", "anna", None).await;
    let lesson = seed_lesson(&db, date(2025, 9, 1), "comparison").await;
    let mm = db.mm();
    let actor = AuthenticatedUser::admin();

    let task = LessonTask::get_or_create(&mm, &actor, &lesson, student.id())
        .await
        .unwrap();
    let stale = task.clone();
    let answers = canonical(&task.exercises().unwrap());

    let (submitted, report) = task.submit(&mm, &actor, answers).await.unwrap();
    assert_eq!(report.grade, 7);
    assert_eq!(submitted.state(), LessonTaskState::Submitted);

    // the stale copy still looks pending, the conditional update catches it
    let err = stale.submit(&mm, &actor, HashMap::new()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::AlreadySubmitted));

    let stored = LessonTask::find_for(&mm, &actor, lesson.id(), student.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.score(), Some(7));

    let err = stored.submit(&mm, &actor, HashMap::new()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::AlreadySubmitted));
}
