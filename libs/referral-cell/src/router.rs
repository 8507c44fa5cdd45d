use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, DOCTOR_ONLY, STUDENT_ONLY};

use crate::handlers;

pub fn referral_routes(state: Arc<AppState>) -> Router {
    let student_routes = Router::new()
        .route("/request", post(handlers::request_referral))
        .route("/student", get(handlers::student_referrals))
        .route_layer(middleware::from_fn_with_state(STUDENT_ONLY, authorize));

    let doctor_routes = Router::new()
        .route("/doctor", get(handlers::pending_referrals))
        .route("/{id}/approve", put(handlers::update_referral_status))
        .route_layer(middleware::from_fn_with_state(DOCTOR_ONLY, authorize));

    Router::new()
        .merge(student_routes)
        .merge(doctor_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
