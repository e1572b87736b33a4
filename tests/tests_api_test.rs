mod common;

use axum::http::{Method, StatusCode};
use chronica::db::models::Role;
use common::{app, register, register_with_role, request, send};
use serde_json::{json, Value};

/// Body for a test whose every question has the correct answer in the given
/// position (0-3).
fn test_body(title: &str, question_count: usize, correct_idx: usize) -> Value {
    let questions: Vec<Value> = (0..question_count)
        .map(|q| {
            let answers: Vec<Value> = (0..4)
                .map(|a| {
                    json!({
                        "text": format!("Ответ {}", a + 1),
                        "isCorrect": a == correct_idx,
                    })
                })
                .collect();
            json!({ "text": format!("Вопрос {}", q + 1), "answers": answers })
        })
        .collect();
    json!({ "title": title, "questions": questions })
}

async fn create_test(app: &axum::Router, admin: &str, body: Value) -> Value {
    let (status, body) = send(app, request(Method::POST, "/tests", Some(admin), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED, "test creation failed: {body}");
    body["test"].clone()
}

/// (questionId, correct answerId) pairs recovered from the creation response.
fn answer_key(test: &Value) -> Vec<(i64, i64)> {
    test["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| {
            let correct = q["answers"]
                .as_array()
                .unwrap()
                .iter()
                .find(|a| a["isCorrect"] == true)
                .expect("one correct answer");
            (q["id"].as_i64().unwrap(), correct["id"].as_i64().unwrap())
        })
        .collect()
}

async fn submit(
    app: &axum::Router,
    token: &str,
    test_id: i64,
    answers: Vec<Value>,
) -> (StatusCode, Value) {
    let uri = format!("/tests/{test_id}/submit");
    send(
        app,
        request(Method::POST, &uri, Some(token), Some(json!({ "answers": answers }))),
    )
    .await
}

#[tokio::test]
async fn test_creation_is_admin_only() {
    let (app, _db) = app().await;
    let (_, token) = register(&app, "Reader", "reader@example.com").await;

    let (status, _) = send(
        &app,
        request(Method::POST, "/tests", Some(&token), Some(test_body("T", 1, 0))),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_creation_validates_questions() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;

    // No questions at all.
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/tests",
            Some(&admin),
            Some(json!({ "title": "Пустой", "questions": [] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Three answers instead of four.
    let mut body = test_body("Мало ответов", 1, 0);
    body["questions"][0]["answers"].as_array_mut().unwrap().pop();
    let (status, _) = send(&app, request(Method::POST, "/tests", Some(&admin), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Two correct answers.
    let mut body = test_body("Два верных", 1, 0);
    body["questions"][0]["answers"][1]["isCorrect"] = json!(true);
    let (status, response) =
        send(&app, request(Method::POST, "/tests", Some(&admin), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Validation failed");
}

#[tokio::test]
async fn test_detail_hides_the_answer_key() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Русь", 2, 1)).await;
    let test_id = test["id"].as_i64().unwrap();

    let uri = format!("/tests/{test_id}");
    let (status, body) = send(&app, request(Method::GET, &uri, None, None)).await;

    assert_eq!(status, StatusCode::OK);
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for question in questions {
        let answers = question["answers"].as_array().unwrap();
        assert_eq!(answers.len(), 4);
        for answer in answers {
            assert!(answer.get("isCorrect").is_none(), "answer key leaked");
        }
    }
}

#[tokio::test]
async fn missing_test_is_404() {
    let (app, _db) = app().await;
    let (_, token) = register(&app, "Reader", "reader@example.com").await;

    let (status, _) = send(&app, request(Method::GET, "/tests/999", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = submit(&app, &token, 999, vec![]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submission_grades_against_the_answer_key() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Оценка", 2, 2)).await;
    let test_id = test["id"].as_i64().unwrap();
    let key = answer_key(&test);
    let (_, token) = register(&app, "Student", "student@example.com").await;

    // Both correct.
    let answers = key
        .iter()
        .map(|&(q, a)| json!({ "questionId": q, "answerId": a }))
        .collect();
    let (status, body) = submit(&app, &token, test_id, answers).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 2);
    assert_eq!(body["total"], 2);
    assert!(body["resultId"].as_i64().is_some());

    // A nonexistent answer id evaluates as incorrect, not as an error.
    let (status, body) = submit(
        &app,
        &token,
        test_id,
        vec![json!({ "questionId": key[0].0, "answerId": 999999 })],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 0);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn partial_submission_keeps_full_total() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Частичный", 3, 0)).await;
    let test_id = test["id"].as_i64().unwrap();
    let key = answer_key(&test);
    let (_, token) = register(&app, "Student", "student@example.com").await;

    let (status, body) = submit(
        &app,
        &token,
        test_id,
        vec![json!({ "questionId": key[0].0, "answerId": key[0].1 })],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 1);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn submission_requires_auth() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Тест", 1, 0)).await;
    let test_id = test["id"].as_i64().unwrap();

    let uri = format!("/tests/{test_id}/submit");
    let (status, _) = send(
        &app,
        request(Method::POST, &uri, None, Some(json!({ "answers": [] }))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn resubmission_creates_a_second_result() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Повтор", 1, 0)).await;
    let test_id = test["id"].as_i64().unwrap();
    let key = answer_key(&test);
    let (_, token) = register(&app, "Student", "student@example.com").await;

    let answers = vec![json!({ "questionId": key[0].0, "answerId": key[0].1 })];
    let (_, first) = submit(&app, &token, test_id, answers.clone()).await;
    let (_, second) = submit(&app, &token, test_id, answers).await;

    assert_ne!(first["resultId"], second["resultId"]);

    let uri = format!("/tests/{test_id}/results");
    let (status, body) = send(&app, request(Method::GET, &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    // Newest first.
    assert_eq!(results[0]["id"], second["resultId"]);
    assert_eq!(results[1]["id"], first["resultId"]);
    // Per-answer breakdown is attached.
    let breakdown = results[0]["answers"].as_array().unwrap();
    assert_eq!(breakdown.len(), 1);
    assert_eq!(breakdown[0]["isCorrect"], true);
}

#[tokio::test]
async fn results_listing_is_private_to_the_requester() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Личное", 1, 0)).await;
    let test_id = test["id"].as_i64().unwrap();
    let key = answer_key(&test);
    let (_, alice) = register(&app, "Alice", "alice@example.com").await;
    let (_, bob) = register(&app, "Bob", "bob@example.com").await;

    submit(
        &app,
        &alice,
        test_id,
        vec![json!({ "questionId": key[0].0, "answerId": key[0].1 })],
    )
    .await;

    let uri = format!("/tests/{test_id}/results");
    let (_, body) = send(&app, request(Method::GET, &uri, Some(&bob), None)).await;
    assert!(body["results"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, request(Method::GET, &uri, Some(&alice), None)).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn difficulty_stays_blank_without_enough_history() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Новый", 1, 0)).await;
    let test_id = test["id"].as_i64().unwrap();
    let key = answer_key(&test);
    let (_, token) = register(&app, "Student", "student@example.com").await;

    // Exactly five results: still below the gate.
    for _ in 0..5 {
        submit(
            &app,
            &token,
            test_id,
            vec![json!({ "questionId": key[0].0, "answerId": key[0].1 })],
        )
        .await;
    }

    let (status, body) = send(&app, request(Method::GET, "/tests", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let entry = &body["tests"].as_array().unwrap()[0];
    assert_eq!(entry["id"].as_i64(), Some(test_id));
    assert!(entry["difficulty"].is_null());
    // The requester's own latest result is attached.
    assert_eq!(entry["lastResult"]["score"], 1);
    assert_eq!(entry["questionsCount"], 1);
}

#[tokio::test]
async fn difficulty_appears_after_six_results() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Сложный", 1, 0)).await;
    let test_id = test["id"].as_i64().unwrap();
    let key = answer_key(&test);
    let (_, token) = register(&app, "Student", "student@example.com").await;

    // Six failing submissions: fail rate 1.0, one question.
    // 1/5 + 1.0*5 = 5.2 -> rounds to 5.
    for _ in 0..6 {
        submit(
            &app,
            &token,
            test_id,
            vec![json!({ "questionId": key[0].0, "answerId": 999999 })],
        )
        .await;
    }

    let (_, body) = send(&app, request(Method::GET, "/tests", Some(&token), None)).await;
    let entry = &body["tests"].as_array().unwrap()[0];
    assert_eq!(entry["difficulty"], 5);

    // A fresh user sees the shared difficulty but no lastResult.
    let (_, fresh) = register(&app, "Fresh", "fresh@example.com").await;
    let (_, body) = send(&app, request(Method::GET, "/tests", Some(&fresh), None)).await;
    let entry = &body["tests"].as_array().unwrap()[0];
    assert_eq!(entry["difficulty"], 5);
    assert!(entry["lastResult"].is_null());
}

#[tokio::test]
async fn easy_test_difficulty_clamps_to_one() {
    let (app, db) = app().await;
    let (_, admin) = register_with_role(&app, &db, "Admin", "admin@example.com", Role::Admin).await;
    let test = create_test(&app, &admin, test_body("Лёгкий", 1, 0)).await;
    let test_id = test["id"].as_i64().unwrap();
    let key = answer_key(&test);
    let (_, token) = register(&app, "Student", "student@example.com").await;

    // Six perfect submissions: 1/5 + 0*5 = 0.2 -> rounds to 0, clamped to 1.
    for _ in 0..6 {
        submit(
            &app,
            &token,
            test_id,
            vec![json!({ "questionId": key[0].0, "answerId": key[0].1 })],
        )
        .await;
    }

    let (_, body) = send(&app, request(Method::GET, "/tests", Some(&token), None)).await;
    let entry = &body["tests"].as_array().unwrap()[0];
    assert_eq!(entry["difficulty"], 1);
}

#[tokio::test]
async fn tests_listing_requires_auth() {
    let (app, _db) = app().await;

    let (status, _) = send(&app, request(Method::GET, "/tests", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
