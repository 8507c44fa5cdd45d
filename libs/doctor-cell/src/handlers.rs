use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::json;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};

use crate::models::{
    AvailabilityRangeQuery, DeleteAvailabilityQuery, DeletionOutcome, SetAvailabilityRequest,
};
use crate::services::{AvailabilityService, DoctorService};

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let doctors = DoctorService::new(&state).list_doctors().await?;
    Ok(response::listing(&doctors))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<ApiResponse, AppError> {
    let saved = AvailabilityService::new(&state)
        .set_availability(user.id, request)
        .await?;
    Ok(response::created(saved))
}

/// The caller's own windows.
#[axum::debug_handler]
pub async fn get_own_availability(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AvailabilityRangeQuery>,
) -> Result<ApiResponse, AppError> {
    fetch_availability(&state, user.id, query).await
}

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<AvailabilityRangeQuery>,
) -> Result<ApiResponse, AppError> {
    fetch_availability(&state, doctor_id, query).await
}

async fn fetch_availability(
    state: &AppState,
    doctor_id: i64,
    query: AvailabilityRangeQuery,
) -> Result<ApiResponse, AppError> {
    let windows = AvailabilityService::new(state)
        .get_availability(doctor_id, query.start_date.as_deref(), query.end_date.as_deref())
        .await?;
    Ok(response::listing(&windows))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(availability_id): Path<i64>,
    Query(query): Query<DeleteAvailabilityQuery>,
) -> Result<ApiResponse, AppError> {
    let outcome = AvailabilityService::new(&state)
        .delete_availability(user.id, availability_id, query.is_forced())
        .await?;

    Ok(match outcome {
        DeletionOutcome::Deleted(row) => {
            response::ok_with_message("Availability deleted successfully", row)
        }
        DeletionOutcome::Forced(result) => response::ok_with_message(
            &format!(
                "Slot deleted and {} booking(s) cancelled and notified",
                result.cancelled_count
            ),
            json!({
                "deleted": result.deleted,
                "cancelled_count": result.cancelled_count,
                "notified_count": result.notified_count,
            }),
        ),
    })
}
