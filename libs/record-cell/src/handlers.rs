use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};

use crate::models::{NewRecordRequest, UpdatePrescriptionRequest};
use crate::services::RecordService;

pub async fn add_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<NewRecordRequest>,
) -> Result<ApiResponse, AppError> {
    let record = RecordService::new(&state).add_record(user.id, request).await?;
    Ok(response::created(record))
}

pub async fn student_records(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse, AppError> {
    let records = RecordService::new(&state).for_student(user.id).await?;
    Ok(response::listing(&records))
}

pub async fn records_for_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(student_id): Path<i64>,
) -> Result<ApiResponse, AppError> {
    let records = RecordService::new(&state).for_doctor(&user, student_id).await?;
    Ok(response::listing(&records))
}

pub async fn get_prescription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(record_id): Path<i64>,
) -> Result<ApiResponse, AppError> {
    let record = RecordService::new(&state).get_prescription(&user, record_id).await?;
    Ok(response::ok(record))
}

pub async fn update_prescription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(record_id): Path<i64>,
    Json(request): Json<UpdatePrescriptionRequest>,
) -> Result<ApiResponse, AppError> {
    let record = RecordService::new(&state)
        .update_prescription(&user, record_id, request)
        .await?;
    Ok(response::ok_with_message("Prescription updated successfully", record))
}
