use std::sync::Arc;

use axum::{routing::get, Router};

use admin_cell::admin_routes;
use appointment_cell::appointment_routes;
use auth_cell::{auth_routes, user_routes};
use concern_cell::concern_routes;
use doctor_cell::{availability_routes, doctor_routes};
use notification_cell::notification_routes;
use pharmacy_cell::pharmacy_routes;
use record_cell::record_routes;
use referral_cell::referral_routes;
use shared_database::AppState;

use crate::dashboard::dashboard_routes;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Campus Health API is running!" }))
        .merge(auth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/availability", availability_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/concerns", concern_routes(state.clone()))
        .nest("/referrals", referral_routes(state.clone()))
        .nest("/records", record_routes(state.clone()))
        .nest("/pharmacy", pharmacy_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state))
}
