// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};

use crate::models::{BookAppointmentRequest, DoctorAppointmentsQuery, RescheduleRequest};
use crate::services::lifecycle::resolve_doctor_scope;
use crate::services::{AppointmentBookingService, AppointmentLifecycleService};

// ==============================================================================
// BOOKING
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<ApiResponse, AppError> {
    let appointment = AppointmentBookingService::new(&state)
        .book_appointment(user, request)
        .await?;
    Ok(response::created(appointment))
}

// ==============================================================================
// LISTINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_student_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse, AppError> {
    let appointments = AppointmentLifecycleService::new(&state)
        .student_appointments(user.id)
        .await?;
    Ok(response::listing(&appointments))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DoctorAppointmentsQuery>,
) -> Result<ApiResponse, AppError> {
    let doctor_id = resolve_doctor_scope(&user, &query)?;
    let appointments = AppointmentLifecycleService::new(&state)
        .doctor_appointments(doctor_id)
        .await?;
    Ok(response::listing(&appointments))
}

// ==============================================================================
// CHANGES (behind the participant gate)
// ==============================================================================

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<RescheduleRequest>,
) -> Result<ApiResponse, AppError> {
    let appointment = AppointmentLifecycleService::new(&state)
        .reschedule_appointment(appointment_id, request)
        .await?;
    Ok(response::ok(appointment))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<i64>,
) -> Result<ApiResponse, AppError> {
    AppointmentLifecycleService::new(&state)
        .cancel_appointment(appointment_id)
        .await?;
    Ok(response::message("Appointment cancelled"))
}
