use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, PHARMACY_ONLY, STUDENT_ONLY};

use crate::handlers;

pub fn pharmacy_routes(state: Arc<AppState>) -> Router {
    let staff_routes = Router::new()
        .route("/inventory/{id}", put(handlers::update_inventory_item))
        .route("/orders", get(handlers::get_all_orders))
        .route("/orders/{id}/status", put(handlers::update_order_status))
        .route_layer(middleware::from_fn_with_state(PHARMACY_ONLY, authorize));

    let student_routes = Router::new()
        .route("/orders", post(handlers::place_order))
        .route("/orders/student", get(handlers::get_student_orders))
        .route_layer(middleware::from_fn_with_state(STUDENT_ONLY, authorize));

    Router::new()
        .route("/inventory", get(handlers::get_inventory))
        .merge(staff_routes)
        .merge(student_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
