use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

pub type ApiResponse = (StatusCode, Json<Value>);

pub fn ok<T: Serialize>(data: T) -> ApiResponse {
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

pub fn created<T: Serialize>(data: T) -> ApiResponse {
    (StatusCode::CREATED, Json(json!({ "success": true, "data": data })))
}

/// `{success, count, data}` envelope used by the list endpoints.
pub fn listing<T: Serialize>(rows: &[T]) -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "count": rows.len(), "data": rows })),
    )
}

pub fn ok_with_message<T: Serialize>(message: &str, data: T) -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": message, "data": data })),
    )
}

pub fn message(message: &str) -> ApiResponse {
    (StatusCode::OK, Json(json!({ "success": true, "message": message })))
}
