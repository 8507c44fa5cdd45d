use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, ADMIN_ONLY, DOCTOR_ONLY};

use crate::handlers;

/// `/signup`, `/login`, `/logout` at the root.
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .with_state(state)
}

/// `/users`.
pub fn user_routes(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/", get(handlers::list_users))
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, authorize));

    let doctor_routes = Router::new()
        .route("/doctor/time-per-patient", put(handlers::set_time_per_patient))
        .route_layer(middleware::from_fn_with_state(DOCTOR_ONLY, authorize));

    let self_routes = Router::new().route(
        "/{id}",
        get(handlers::get_user).put(handlers::update_user),
    );

    Router::new()
        .merge(admin_routes)
        .merge(doctor_routes)
        .merge(self_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
