use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Path, State},
    http::{header::AUTHORIZATION, Request, StatusCode},
    Json,
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::handlers::*;
use notification_cell::models::SendNotificationRequest;
use notification_cell::router::notification_routes;
use shared_database::AppState;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn state_for(server: &MockServer) -> Arc<AppState> {
    TestConfig::with_url(&server.uri()).to_state()
}

#[tokio::test]
async fn test_send_requires_user_and_message() {
    let server = MockServer::start().await;

    let err = send_notification(
        State(state_for(&server)),
        Json(SendNotificationRequest {
            user_id: Some(1),
            message: None,
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.public_message(), "Missing fields");
}

#[tokio::test]
async fn test_send_inserts_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .and(body_partial_json(json!({ "user_id": 1, "message": "Clinic closed Friday" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 12,
            "user_id": 1,
            "message": "Clinic closed Friday",
            "is_read": false,
            "created_at": "2025-03-01T10:00:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, Json(body)) = send_notification(
        State(state_for(&server)),
        Json(SendNotificationRequest {
            user_id: Some(1),
            message: Some("Clinic closed Friday".into()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Notification sent successfully");
}

#[tokio::test]
async fn test_mark_read_scoped_to_recipient() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("user_id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 12,
            "message": "Clinic closed Friday",
            "is_read": true,
            "created_at": "2025-03-01T10:00:00Z"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("user_id", "eq.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (_, Json(body)) = mark_as_read(
        State(state_for(&server)),
        Extension(TestUser::student(1).to_auth_user()),
        Path(12),
    )
    .await
    .unwrap();
    assert_eq!(body["data"]["is_read"], true);

    let err = mark_as_read(
        State(state_for(&server)),
        Extension(TestUser::student(2).to_auth_user()),
        Path(12),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.public_message(), "Notification not found");
}

#[tokio::test]
async fn test_only_admin_sends() {
    let server = MockServer::start().await;
    let config = TestConfig::with_url(&server.uri());
    let token = JwtTestUtils::create_test_token(&TestUser::student(1), &config.jwt_secret, Some(1));

    let response = notification_routes(config.to_state())
        .oneshot(
            Request::post("/send")
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"user_id":2,"message":"hi"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
