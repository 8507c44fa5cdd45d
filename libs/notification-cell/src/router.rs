use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, authorize, ADMIN_ONLY};

use crate::handlers;

pub fn notification_routes(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/", post(handlers::send_notification))
        .route("/send", post(handlers::send_notification))
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, authorize));

    Router::new()
        .route("/", get(handlers::get_notifications))
        .route("/{id}/read", put(handlers::mark_as_read))
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
