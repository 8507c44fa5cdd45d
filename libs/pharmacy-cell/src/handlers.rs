use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};

use crate::models::{OrderStatusRequest, PlaceOrderRequest, UpdateInventoryRequest};
use crate::services::PharmacyService;

pub async fn get_inventory(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let medicines = PharmacyService::new(&state).inventory().await?;
    Ok(response::listing(&medicines))
}

pub async fn update_inventory_item(
    State(state): State<Arc<AppState>>,
    Path(medicine_id): Path<i64>,
    Json(request): Json<UpdateInventoryRequest>,
) -> Result<ApiResponse, AppError> {
    let medicine = PharmacyService::new(&state)
        .update_stock(medicine_id, request)
        .await?;
    Ok(response::ok_with_message("Inventory updated successfully", medicine))
}

pub async fn place_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<ApiResponse, AppError> {
    let order = PharmacyService::new(&state).place_order(user.id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order placed successfully",
            "order_id": order.id,
            "data": order
        })),
    ))
}

pub async fn get_all_orders(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let orders = PharmacyService::new(&state).all_orders().await?;
    Ok(response::listing(&orders))
}

pub async fn get_student_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse, AppError> {
    let orders = PharmacyService::new(&state).student_orders(user.id).await?;
    Ok(response::listing(&orders))
}

pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    Json(request): Json<OrderStatusRequest>,
) -> Result<ApiResponse, AppError> {
    let order = PharmacyService::new(&state)
        .update_order_status(order_id, request)
        .await?;
    Ok(response::ok_with_message("Order status updated successfully", order))
}
