use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub stock: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Ready,
    Completed,
    Cancelled,
}

impl std::str::FromStr for OrderStatus {
    type Err = PharmacyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "ready" => Ok(OrderStatus::Ready),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(PharmacyError::InvalidStatus),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub total: f64,
    pub status: OrderStatus,
    pub ordered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInventoryRequest {
    #[serde(alias = "stock")]
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(alias = "medicineId")]
    pub medicine_id: Option<i64>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderStatusRequest {
    pub status: Option<String>,
}

#[derive(Error, Debug)]
pub enum PharmacyError {
    #[error("Medicine not found")]
    MedicineNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Medicine and quantity are required")]
    MissingOrderFields,

    #[error("Quantity must be greater than 0")]
    InvalidOrderQuantity,

    #[error("Quantity must be 0 or greater")]
    InvalidStockQuantity,

    #[error("Not enough stock available")]
    InsufficientStock,

    #[error("Status must be one of pending, processing, ready, completed, cancelled")]
    InvalidStatus,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<PharmacyError> for AppError {
    fn from(err: PharmacyError) -> Self {
        match err {
            PharmacyError::MedicineNotFound
            | PharmacyError::OrderNotFound
            | PharmacyError::StudentNotFound => AppError::NotFound(err.to_string()),
            PharmacyError::Database(e) => e.into(),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}
