use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, DOCTOR_ONLY, STUDENT_ONLY};

use crate::handlers;

pub fn record_routes(state: Arc<AppState>) -> Router {
    let student_routes = Router::new()
        .route("/student", get(handlers::student_records))
        .route_layer(middleware::from_fn_with_state(STUDENT_ONLY, authorize));

    let doctor_routes = Router::new()
        .route("/", post(handlers::add_record))
        .route("/doctor/{student_id}", get(handlers::records_for_doctor))
        .route("/prescriptions/{id}", put(handlers::update_prescription))
        .route_layer(middleware::from_fn_with_state(DOCTOR_ONLY, authorize));

    // Per-record visibility is decided in the service.
    let shared_routes = Router::new().route("/prescriptions/{id}", get(handlers::get_prescription));

    Router::new()
        .merge(student_routes)
        .merge(doctor_routes)
        .merge(shared_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
