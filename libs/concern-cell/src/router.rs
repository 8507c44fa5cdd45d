use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, DOCTOR_ONLY, STUDENT_ONLY};

use crate::handlers;

pub fn concern_routes(state: Arc<AppState>) -> Router {
    let student_routes = Router::new()
        .route("/", post(handlers::submit_concern))
        .route("/student", get(handlers::student_concerns))
        .route_layer(middleware::from_fn_with_state(STUDENT_ONLY, authorize));

    let doctor_routes = Router::new()
        .route("/doctor", get(handlers::doctor_concerns))
        .route("/{id}/reply", post(handlers::reply_to_concern))
        .route_layer(middleware::from_fn_with_state(DOCTOR_ONLY, authorize));

    Router::new()
        .merge(student_routes)
        .merge(doctor_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
