use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Path, State},
    http::{header::AUTHORIZATION, Request, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concern_cell::handlers::*;
use concern_cell::models::{ReplyRequest, SubmitConcernRequest};
use concern_cell::router::concern_routes;
use shared_database::AppState;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn state_for(server: &MockServer) -> Arc<AppState> {
    TestConfig::with_url(&server.uri()).to_state()
}

fn concern_row(id: i64, status: &str, responded_by: Option<i64>) -> Value {
    json!({
        "id": id,
        "category": "stress",
        "message": "Exams are overwhelming",
        "status": status,
        "response": null,
        "responded_by": responded_by
    })
}

#[tokio::test]
async fn test_submit_requires_category_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/concerns"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = submit_concern(
        State(state_for(&server)),
        Extension(TestUser::student(1).to_auth_user()),
        Json(SubmitConcernRequest {
            category: Some("stress".into()),
            message: Some("   ".into()),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.public_message(), "Category and message are required");
}

#[tokio::test]
async fn test_submit_starts_pending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/concerns"))
        .and(body_partial_json(json!({ "student_id": 1, "status": "pending" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 9,
            "category": "stress",
            "message": "Exams are overwhelming",
            "response": null,
            "status": "pending",
            "created_at": "2025-03-01T10:00:00Z",
            "responded_at": null
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, Json(body)) = submit_concern(
        State(state_for(&server)),
        Extension(TestUser::student(1).to_auth_user()),
        Json(SubmitConcernRequest {
            category: Some("stress".into()),
            message: Some("Exams are overwhelming".into()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn test_doctor_sees_pending_and_own_replies_without_student_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/concerns"))
        .and(query_param("or", "(responded_by.eq.2,status.eq.pending)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            concern_row(4, "responded", Some(2)),
            concern_row(3, "pending", None)
        ])))
        .mount(&server)
        .await;

    let (status, Json(body)) = doctor_concerns(
        State(state_for(&server)),
        Extension(TestUser::doctor(2).to_auth_user()),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert!(body["data"][0].get("student_id").is_none());
}

#[tokio::test]
async fn test_reply_unknown_concern_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/concerns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = reply_to_concern(
        State(state_for(&server)),
        Extension(TestUser::doctor(2).to_auth_user()),
        Path(77),
        Json(ReplyRequest {
            reply: Some("Please visit the counselling centre".into()),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.public_message(), "Concern not found");
}

#[tokio::test]
async fn test_reply_marks_responded() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/concerns"))
        .and(query_param("id", "eq.3"))
        .and(body_partial_json(json!({ "responded_by": 2, "status": "responded" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            concern_row(3, "responded", Some(2))
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, Json(body)) = reply_to_concern(
        State(state_for(&server)),
        Extension(TestUser::doctor(2).to_auth_user()),
        Path(3),
        Json(ReplyRequest {
            reply: Some("Please visit the counselling centre".into()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Reply added successfully");
}

#[tokio::test]
async fn test_students_cannot_reply() {
    let server = MockServer::start().await;
    let config = TestConfig::with_url(&server.uri());
    let token = JwtTestUtils::create_test_token(&TestUser::student(1), &config.jwt_secret, Some(1));

    let response = concern_routes(config.to_state())
        .oneshot(
            Request::post("/3/reply")
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"reply":"hi"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
