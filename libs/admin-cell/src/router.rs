use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, ADMIN_ONLY};

use crate::handlers;

pub fn admin_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/overview", get(handlers::get_overview))
        .route("/users", get(handlers::get_all_users))
        .route("/appointments", get(handlers::get_all_appointments))
        .route("/inventory", get(handlers::get_inventory_summary))
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, authorize))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
