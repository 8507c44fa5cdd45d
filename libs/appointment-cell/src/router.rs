// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, DOCTOR_OR_ADMIN, STUDENT_ONLY};

use crate::handlers;
use crate::middleware::require_participant;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    let student_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/student", get(handlers::get_student_appointments))
        .route_layer(middleware::from_fn_with_state(STUDENT_ONLY, authorize));

    let doctor_routes = Router::new()
        .route("/doctor", get(handlers::get_doctor_appointments))
        .route_layer(middleware::from_fn_with_state(DOCTOR_OR_ADMIN, authorize));

    let participant_routes = Router::new()
        .route(
            "/{id}",
            put(handlers::reschedule_appointment).delete(handlers::cancel_appointment),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_participant));

    Router::new()
        .merge(student_routes)
        .merge(doctor_routes)
        .merge(participant_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
