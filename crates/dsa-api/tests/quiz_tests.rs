use crate::common::{self, TestClient, TestStateBuilder, test_data};
use axum::http::StatusCode;
use dsa_api::router;
use dsa_core::COOLDOWN_SECONDS;
use serde_json::{Value, json};
use uuid::Uuid;

fn all_answers(count: usize, correct: usize) -> Value {
    let answers: Vec<Value> = (1..=count)
        .map(|n| {
            let answer = if n <= correct {
                format!("Answer-{n} ")
            } else {
                "wrong".to_string()
            };
            json!({ "questionId": format!("q{n}"), "answer": answer })
        })
        .collect();
    Value::Array(answers)
}

#[tokio::test]
async fn test_get_quiz_hides_answers() {
    let state = TestStateBuilder::new()
        .quiz_sample_size(3)
        .build()
        .await
        .expect("Failed to create test state");

    let slug = test_data::unique_slug("sorting");
    common::db::create_roadmap(&state.pool, &slug, &[], true)
        .await
        .expect("Failed to create roadmap");
    common::db::create_quiz(&state.pool, &slug, "week-1", false, 5)
        .await
        .expect("Failed to create quiz");

    let user_id = Uuid::new_v4();
    let token = common::jwt::create_test_token(
        user_id,
        &test_data::unique_email("quiz"),
        &state.jwt_secret,
    );
    let client = TestClient::new(router::router().with_state(state.clone()));

    let response = client
        .get_with_bearer(&format!("/api/roadmaps/quiz?roadmapId={slug}&quizId=week-1"), &token)
        .await;
    response.assert_status(StatusCode::OK);

    let json: Value = response.json();
    assert_eq!(json["totalAvailable"], 5);
    assert_eq!(json["passingScore"], 70);
    assert_eq!(json["nextAttemptNumber"], 1);
    assert_eq!(json["cooldown"]["active"], false);
    let questions = json["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|q| q.get("correctAnswer").is_none()));

    client
        .get_with_bearer(&format!("/api/roadmaps/quiz?roadmapId={slug}&quizId=missing"), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    common::db::delete_roadmaps(&state.pool, &[&slug])
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_submit_grades_and_enforces_cooldown() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let slug = test_data::unique_slug("hashing");
    common::db::create_roadmap(&state.pool, &slug, &[], true)
        .await
        .expect("Failed to create roadmap");
    common::db::create_quiz(&state.pool, &slug, "week-1", false, 4)
        .await
        .expect("Failed to create quiz");

    let user_id = Uuid::new_v4();
    let token = common::jwt::create_test_token(
        user_id,
        &test_data::unique_email("submit"),
        &state.jwt_secret,
    );
    let client = TestClient::new(router::router().with_state(state.clone()));

    // q1 and q2 right (answers are normalized), q3 and q4 wrong
    let body = json!({
        "roadmapId": slug,
        "quizId": "week-1",
        "answers": all_answers(4, 2),
        "timeTaken": 120,
    });
    let response = client
        .post_json_with_bearer("/api/roadmaps/quiz", &body, &token)
        .await;
    response.assert_status(StatusCode::CREATED);

    let json: Value = response.json();
    assert_eq!(json["result"]["score"], 2);
    assert_eq!(json["result"]["totalQuestions"], 4);
    assert_eq!(json["result"]["percentage"], 50);
    assert_eq!(json["result"]["passed"], false);
    assert_eq!(json["result"]["attemptNumber"], 1);
    assert_eq!(json["cooldown"]["active"], true);
    assert_eq!(json["roadmapUnlocked"], false);
    assert_eq!(json["breakdown"].as_array().unwrap().len(), 2);
    assert!(!json["weakTopics"].as_array().unwrap().is_empty());

    // Second attempt inside the window is refused
    let response = client
        .post_json_with_bearer("/api/roadmaps/quiz", &body, &token)
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let json: Value = response.json();
    assert!(json["remainingSeconds"].as_i64().unwrap() > 0);
    assert!(json["availableAt"].is_string());

    // Once the window has passed the next attempt is numbered 2
    common::db::backdate_attempts(&state.pool, user_id, &slug, COOLDOWN_SECONDS + 1)
        .await
        .expect("Failed to backdate attempts");

    let body = json!({
        "roadmapId": slug,
        "quizId": "week-1",
        "answers": all_answers(4, 4),
        "timeTaken": 90,
    });
    let response = client
        .post_json_with_bearer("/api/roadmaps/quiz", &body, &token)
        .await;
    response.assert_status(StatusCode::CREATED);
    let json: Value = response.json();
    assert_eq!(json["result"]["attemptNumber"], 2);
    assert_eq!(json["result"]["passed"], true);

    common::db::delete_roadmaps(&state.pool, &[&slug])
        .await
        .expect("Failed to cleanup");
    common::db::delete_user(&state.pool, user_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_submit_against_served_questions() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let slug = test_data::unique_slug("heaps");
    common::db::create_roadmap(&state.pool, &slug, &[], true)
        .await
        .expect("Failed to create roadmap");
    common::db::create_quiz(&state.pool, &slug, "week-1", false, 6)
        .await
        .expect("Failed to create quiz");

    let user_id = Uuid::new_v4();
    let token = common::jwt::create_test_token(
        user_id,
        &test_data::unique_email("served"),
        &state.jwt_secret,
    );
    let client = TestClient::new(router::router().with_state(state.clone()));

    // Foreign question ids are rejected
    let response = client
        .post_json_with_bearer(
            "/api/roadmaps/quiz",
            &json!({
                "roadmapId": slug,
                "quizId": "week-1",
                "questionIds": ["q1", "q99"],
                "answers": [],
                "timeTaken": 10,
            }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Only the served questions count towards the total
    let response = client
        .post_json_with_bearer(
            "/api/roadmaps/quiz",
            &json!({
                "roadmapId": slug,
                "quizId": "week-1",
                "questionIds": ["q1", "q2"],
                "answers": all_answers(2, 2),
                "timeTaken": 10,
            }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let json: Value = response.json();
    assert_eq!(json["result"]["totalQuestions"], 2);
    assert_eq!(json["result"]["percentage"], 100);

    common::db::delete_roadmaps(&state.pool, &[&slug])
        .await
        .expect("Failed to cleanup");
    common::db::delete_user(&state.pool, user_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_card_test_unlocks_roadmap() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let basics = test_data::unique_slug("basics");
    let advanced = test_data::unique_slug("advanced");
    common::db::create_roadmap(&state.pool, &basics, &[], true)
        .await
        .expect("Failed to create roadmap");
    common::db::create_roadmap(&state.pool, &advanced, &[&basics], true)
        .await
        .expect("Failed to create roadmap");
    common::db::create_quiz(&state.pool, &advanced, "card", true, 5)
        .await
        .expect("Failed to create quiz");

    let user_id = Uuid::new_v4();
    let token = common::jwt::create_test_token(
        user_id,
        &test_data::unique_email("card"),
        &state.jwt_secret,
    );
    let client = TestClient::new(router::router().with_state(state.clone()));

    // 4/5 = 80% meets the card test mark even though the client says otherwise
    let response = client
        .post_json_with_bearer(
            "/api/roadmaps/quiz",
            &json!({
                "roadmapId": advanced,
                "quizId": "card",
                "answers": all_answers(5, 4),
                "timeTaken": 300,
                "isCardTest": false,
            }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let json: Value = response.json();
    assert_eq!(json["passingScore"], 80);
    assert_eq!(json["result"]["isCardTest"], true);
    assert_eq!(json["result"]["passed"], true);
    assert_eq!(json["result"]["cardProgressImpact"]["before"], 0);
    assert_eq!(json["result"]["cardProgressImpact"]["after"], 100);
    assert_eq!(json["roadmapUnlocked"], true);

    let response = client
        .get_with_bearer(&format!("/api/roadmaps/progress?roadmapId={advanced}"), &token)
        .await;
    response.assert_status(StatusCode::OK);
    let json: Value = response.json();
    assert_eq!(json["unlock"]["unlocked"], true);
    assert_eq!(json["unlock"]["unlockedViaCardTest"], true);

    common::db::delete_roadmaps(&state.pool, &[&advanced, &basics])
        .await
        .expect("Failed to cleanup");
    common::db::delete_user(&state.pool, user_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_attempts_are_scoped_to_owner() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let slug = test_data::unique_slug("tries");
    common::db::create_roadmap(&state.pool, &slug, &[], true)
        .await
        .expect("Failed to create roadmap");
    common::db::create_quiz(&state.pool, &slug, "week-1", false, 2)
        .await
        .expect("Failed to create quiz");

    let owner_id = Uuid::new_v4();
    let owner = common::jwt::create_test_token(
        owner_id,
        &test_data::unique_email("owner"),
        &state.jwt_secret,
    );
    let other_id = Uuid::new_v4();
    let other = common::jwt::create_test_token(
        other_id,
        &test_data::unique_email("other"),
        &state.jwt_secret,
    );
    let client = TestClient::new(router::router().with_state(state.clone()));

    let response = client
        .post_json_with_bearer(
            "/api/roadmaps/quiz",
            &json!({
                "roadmapId": slug,
                "quizId": "week-1",
                "answers": all_answers(2, 1),
                "timeTaken": 30,
            }),
            &owner,
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    let json: Value = response.json();
    let attempt_id = json["result"]["id"].as_str().unwrap().to_string();

    let response = client
        .get_with_bearer(&format!("/api/roadmaps/quiz/attempts?roadmapId={slug}"), &owner)
        .await;
    response.assert_status(StatusCode::OK);
    let json: Value = response.json();
    assert_eq!(json.as_array().unwrap().len(), 1);

    let response = client
        .get_with_bearer(&format!("/api/roadmaps/quiz/attempts/{attempt_id}"), &owner)
        .await;
    response.assert_status(StatusCode::OK);
    let json: Value = response.json();
    assert_eq!(json["answers"].as_array().unwrap().len(), 2);
    assert!(json["breakdown"].is_array());

    client
        .get_with_bearer(&format!("/api/roadmaps/quiz/attempts/{attempt_id}"), &other)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    client
        .delete_with_bearer(&format!("/api/roadmaps/quiz/attempts/{attempt_id}"), &other)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    client
        .delete_with_bearer(&format!("/api/roadmaps/quiz/attempts/{attempt_id}"), &owner)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    common::db::delete_roadmaps(&state.pool, &[&slug])
        .await
        .expect("Failed to cleanup");
    common::db::delete_user(&state.pool, owner_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_quiz_submit_is_rate_limited() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let client = TestClient::new(router::router().with_state(state.clone()));
    let token = common::jwt::create_test_token(
        Uuid::new_v4(),
        &test_data::unique_email("burst"),
        &state.jwt_secret,
    );

    // Unknown roadmap: each request fails fast with 404 until the limiter kicks in
    let body = json!({
        "roadmapId": "no-such-roadmap",
        "quizId": "week-1",
        "answers": [],
        "timeTaken": 1,
    });
    let mut statuses = Vec::new();
    for _ in 0..10 {
        let response = client
            .post_json_with_bearer("/api/roadmaps/quiz", &body, &token)
            .await;
        statuses.push(response.status);
    }

    assert!(
        statuses.contains(&StatusCode::TOO_MANY_REQUESTS),
        "Some requests should be rate limited after burst. Got statuses: {statuses:?}"
    );
    assert!(statuses.contains(&StatusCode::NOT_FOUND));
}
