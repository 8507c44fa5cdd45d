use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, DOCTOR_ONLY};

use crate::handlers;

/// `/doctors`: the public directory.
pub fn doctor_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .with_state(state)
}

/// `/availability`: reads for any signed-in user, writes for doctors.
pub fn availability_routes(state: Arc<AppState>) -> Router {
    let read_routes = Router::new()
        .route("/", get(handlers::get_own_availability))
        .route("/{id}", get(handlers::get_doctor_availability));

    // `{id}` is the availability id here, the doctor id on GET.
    let doctor_routes = Router::new()
        .route("/", post(handlers::set_availability))
        .route("/{id}", delete(handlers::delete_availability))
        .route_layer(middleware::from_fn_with_state(DOCTOR_ONLY, authorize));

    Router::new()
        .merge(read_routes)
        .merge(doctor_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
