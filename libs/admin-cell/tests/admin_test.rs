use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use admin_cell::router::admin_routes;
use admin_cell::services::{AdminService, SystemOverview};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

async fn mount_count(server: &MockServer, table: &str, filter: Option<(&str, &str)>, total: i64) {
    let mut mock = Mock::given(method("HEAD")).and(path(format!("/rest/v1/{}", table)));
    if let Some((key, value)) = filter {
        mock = mock.and(query_param(key, value));
    }
    mock.respond_with(
        ResponseTemplate::new(200).insert_header("Content-Range", format!("*/{}", total).as_str()),
    )
    .mount(server)
    .await;
}

#[tokio::test]
async fn test_overview_counts() {
    let server = MockServer::start().await;
    // Filtered user counts first so they win over the unfiltered mock.
    mount_count(&server, "users", Some(("role", "eq.doctor")), 4).await;
    mount_count(&server, "users", Some(("role", "eq.student")), 30).await;
    mount_count(&server, "users", Some(("role", "eq.pharmacy")), 2).await;
    mount_count(&server, "users", None, 37).await;
    mount_count(&server, "appointments", None, 58).await;
    mount_count(&server, "concerns", Some(("status", "eq.pending")), 3).await;
    mount_count(&server, "medicines", None, 21).await;

    let state = TestConfig::with_url(&server.uri()).to_state();
    let overview = AdminService::new(&state).overview().await.unwrap();

    assert_eq!(
        overview,
        SystemOverview {
            total_users: 37,
            total_doctors: 4,
            total_students: 30,
            total_pharmacy_staff: 2,
            total_appointments: 58,
            pending_concerns: 3,
            medicines_in_inventory: 21,
        }
    );
}

#[tokio::test]
async fn test_admin_routes_reject_other_roles() {
    let server = MockServer::start().await;
    let config = TestConfig::with_url(&server.uri());
    let token = JwtTestUtils::create_test_token(&TestUser::doctor(2), &config.jwt_secret, Some(1));

    let response = admin_routes(config.to_state())
        .oneshot(
            Request::get("/overview")
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_inventory_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/medicines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 1, "name": "Cetirizine", "description": null, "stock": 40, "price": 1.25 }
        ])))
        .mount(&server)
        .await;
    let config = TestConfig::with_url(&server.uri());
    let token = JwtTestUtils::create_test_token(&TestUser::admin(9), &config.jwt_secret, Some(1));

    let response = admin_routes(config.to_state())
        .oneshot(
            Request::get("/inventory")
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["count"], 1);
}
