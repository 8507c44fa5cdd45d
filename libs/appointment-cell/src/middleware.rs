// libs/appointment-cell/src/middleware.rs
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use shared_database::AppState;
use shared_models::error::AppError;
use shared_utils::extractor::extract_user;

use crate::models::AppointmentError;
use crate::services::AppointmentLifecycleService;

/// Only the student or the doctor on the appointment gets through.
pub async fn require_participant(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<i64>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = extract_user(&request)?;

    let appointment = AppointmentLifecycleService::new(&state)
        .get_appointment(appointment_id)
        .await?;

    if !appointment.involves(user.id) {
        debug!("User {} is not on appointment {}", user.id, appointment_id);
        return Err(AppointmentError::NotParticipant.into());
    }

    Ok(next.run(request).await)
}
