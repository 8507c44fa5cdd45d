use std::sync::Arc;

use axum::extract::State;

use appointment_cell::services::AppointmentLifecycleService;
use auth_cell::services::UserService;
use pharmacy_cell::PharmacyService;
use shared_database::AppState;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};

use crate::services::AdminService;

pub async fn get_overview(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let overview = AdminService::new(&state).overview().await?;
    Ok(response::ok_with_message("System overview fetched successfully", overview))
}

pub async fn get_all_users(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let users = UserService::new(&state).list_users().await?;
    Ok(response::listing(&users))
}

pub async fn get_all_appointments(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let appointments = AppointmentLifecycleService::new(&state).all_appointments().await?;
    Ok(response::listing(&appointments))
}

pub async fn get_inventory_summary(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let medicines = PharmacyService::new(&state).inventory().await?;
    Ok(response::listing(&medicines))
}
