use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};

use crate::models::{ReplyRequest, SubmitConcernRequest};
use crate::services::ConcernService;

pub async fn submit_concern(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SubmitConcernRequest>,
) -> Result<ApiResponse, AppError> {
    let concern = ConcernService::new(&state).submit(user.id, request).await?;
    Ok(response::created(concern))
}

pub async fn student_concerns(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse, AppError> {
    let concerns = ConcernService::new(&state).for_student(user.id).await?;
    Ok(response::listing(&concerns))
}

pub async fn doctor_concerns(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse, AppError> {
    let concerns = ConcernService::new(&state).for_doctor(user.id).await?;
    Ok(response::listing(&concerns))
}

pub async fn reply_to_concern(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(concern_id): Path<i64>,
    Json(request): Json<ReplyRequest>,
) -> Result<ApiResponse, AppError> {
    let concern = ConcernService::new(&state)
        .reply(user.id, concern_id, request)
        .await?;
    Ok(response::ok_with_message("Reply added successfully", concern))
}
