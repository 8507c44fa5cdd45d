use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};

use crate::models::{ReferralDecision, ReferralRequest};
use crate::services::ReferralService;

pub async fn request_referral(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ReferralRequest>,
) -> Result<ApiResponse, AppError> {
    let referral = ReferralService::new(&state).request(user.id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Referral request created successfully",
            "data": referral
        })),
    ))
}

pub async fn student_referrals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse, AppError> {
    let referrals = ReferralService::new(&state).for_student(user.id).await?;
    Ok(response::listing(&referrals))
}

pub async fn pending_referrals(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let referrals = ReferralService::new(&state).pending().await?;
    Ok(response::listing(&referrals))
}

pub async fn update_referral_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(referral_id): Path<i64>,
    Json(decision): Json<ReferralDecision>,
) -> Result<ApiResponse, AppError> {
    let referral = ReferralService::new(&state)
        .decide(user.id, referral_id, decision)
        .await?;
    Ok(response::ok_with_message("Referral status updated successfully", referral))
}
