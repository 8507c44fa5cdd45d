use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use record_cell::handlers::*;
use record_cell::models::NewRecordRequest;
use shared_database::AppState;
use shared_utils::test_utils::{MockRows, TestConfig, TestUser};

fn state_for(server: &MockServer) -> Arc<AppState> {
    TestConfig::with_url(&server.uri()).to_state()
}

fn record(id: i64, author: i64, category: &str) -> Value {
    json!({
        "id": id,
        "student_id": 10,
        "doctor_id": author,
        "doctor_name": "Dr. Author",
        "category": category,
        "diagnosis": "Sprain",
        "notes": null,
        "medicines": "Ibuprofen",
        "date": "2025-03-01"
    })
}

/// Doctor 5 is the viewer; doctors 2 and 3 authored the records.
async fn mount_doctors(server: &MockServer, viewer_specialization: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Dr. Viewer", "specialization": viewer_specialization }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "in.(2,3)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "specialization": "Orthopedics" },
            { "id": 3, "specialization": "Cardiology" }
        ])))
        .mount(server)
        .await;
}

async fn mount_records(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/prescriptions"))
        .and(query_param("student_id", "eq.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            record(1, 2, "specialized"),
            record(2, 3, "specialized"),
            record(3, 3, "general")
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_doctor_sees_general_and_matching_specialized() {
    let server = MockServer::start().await;
    mount_doctors(&server, "Orthopedics").await;
    mount_records(&server).await;

    let (status, Json(body)) = records_for_doctor(
        State(state_for(&server)),
        Extension(TestUser::doctor(5).to_auth_user()),
        Path(10),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_prescription_hidden_from_other_specialization() {
    let server = MockServer::start().await;
    mount_doctors(&server, "Dermatology").await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/prescriptions"))
        .and(query_param("id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record(1, 2, "specialized")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "in.(2)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "specialization": "Orthopedics" }
        ])))
        .mount(&server)
        .await;

    let err = get_prescription(
        State(state_for(&server)),
        Extension(TestUser::doctor(5).to_auth_user()),
        Path(1),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owning_student_reads_prescription() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/prescriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record(1, 2, "specialized")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "specialization": "Orthopedics" }
        ])))
        .mount(&server)
        .await;

    let (status, Json(body)) = get_prescription(
        State(state_for(&server)),
        Extension(TestUser::student(10).to_auth_user()),
        Path(1),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);

    let err = get_prescription(
        State(state_for(&server)),
        Extension(TestUser::student(11).to_auth_user()),
        Path(1),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_add_record_defaults_to_specialized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::doctor(2, "Dr. Rao", Some("Orthopedics"), None)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/prescriptions"))
        .and(body_partial_json(json!({
            "doctor_id": 2,
            "doctor_name": "Dr. Rao",
            "category": "specialized"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([record(7, 2, "specialized")])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _) = add_record(
        State(state_for(&server)),
        Extension(TestUser::doctor(2).to_auth_user()),
        Json(NewRecordRequest {
            student_id: Some(10),
            diagnosis: Some("Sprain".into()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_add_record_requires_student_and_diagnosis() {
    let server = MockServer::start().await;

    let err = add_record(
        State(state_for(&server)),
        Extension(TestUser::doctor(2).to_auth_user()),
        Json(NewRecordRequest {
            student_id: Some(10),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.public_message(), "Student ID and diagnosis are required");
}
