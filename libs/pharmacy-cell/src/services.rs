use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use shared_database::{AppState, SupabaseClient};

use crate::models::{
    Medicine, Order, OrderStatus, OrderStatusRequest, PharmacyError, PlaceOrderRequest,
    UpdateInventoryRequest,
};

const MEDICINES_PATH: &str = "/rest/v1/medicines";
const ORDERS_PATH: &str = "/rest/v1/orders";
const ORDER_LINES_PATH: &str = "/rest/v1/order_medicines";

/// Price times quantity, rounded to cents.
pub fn order_total(price: f64, quantity: i32) -> f64 {
    (price * f64::from(quantity) * 100.0).round() / 100.0
}

#[derive(Deserialize)]
struct NameRow {
    name: String,
}

pub struct PharmacyService {
    db: SupabaseClient,
}

impl PharmacyService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn inventory(&self) -> Result<Vec<Medicine>, PharmacyError> {
        let path = format!("{}?select=id,name,description,stock,price&order=name.asc", MEDICINES_PATH);
        Ok(self.db.select(&path).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_stock(
        &self,
        medicine_id: i64,
        request: UpdateInventoryRequest,
    ) -> Result<Medicine, PharmacyError> {
        let quantity = request
            .quantity
            .filter(|q| *q >= 0)
            .ok_or(PharmacyError::InvalidStockQuantity)?;

        let path = format!("{}?id=eq.{}", MEDICINES_PATH, medicine_id);
        let rows: Vec<Medicine> = self.db.update(&path, json!({ "stock": quantity })).await?;
        let medicine = rows.into_iter().next().ok_or(PharmacyError::MedicineNotFound)?;
        info!("Medicine {} stock set to {}", medicine_id, quantity);
        Ok(medicine)
    }

    async fn medicine(&self, medicine_id: i64) -> Result<Medicine, PharmacyError> {
        let path = format!("{}?id=eq.{}", MEDICINES_PATH, medicine_id);
        self.db
            .select_one(&path)
            .await?
            .ok_or(PharmacyError::MedicineNotFound)
    }

    /// Decrements stock only if it still holds the value we read.
    async fn take_stock(&self, medicine: &Medicine, quantity: i32) -> Result<(), PharmacyError> {
        let path = format!(
            "{}?id=eq.{}&stock=eq.{}",
            MEDICINES_PATH, medicine.id, medicine.stock
        );
        let rows: Vec<Medicine> = self
            .db
            .update(&path, json!({ "stock": medicine.stock - quantity }))
            .await?;
        if rows.is_empty() {
            warn!("Stock for medicine {} changed under an order", medicine.id);
            return Err(PharmacyError::InsufficientStock);
        }
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn place_order(&self, student_id: i64, request: PlaceOrderRequest) -> Result<Order, PharmacyError> {
        let (Some(medicine_id), Some(quantity)) = (request.medicine_id, request.quantity) else {
            return Err(PharmacyError::MissingOrderFields);
        };
        if quantity <= 0 {
            return Err(PharmacyError::InvalidOrderQuantity);
        }

        let medicine = self.medicine(medicine_id).await?;
        if medicine.stock < quantity {
            return Err(PharmacyError::InsufficientStock);
        }

        let student: NameRow = self
            .db
            .select_one(&format!("/rest/v1/users?id=eq.{}&select=name", student_id))
            .await?
            .ok_or(PharmacyError::StudentNotFound)?;

        self.take_stock(&medicine, quantity).await?;

        let total = order_total(medicine.price, quantity);
        let orders: Vec<Order> = self
            .db
            .insert(
                ORDERS_PATH,
                json!({
                    "student_id": student_id,
                    "student_name": student.name,
                    "total": total,
                    "status": OrderStatus::Pending,
                }),
            )
            .await?;
        let order = orders
            .into_iter()
            .next()
            .ok_or(PharmacyError::OrderNotFound)?;

        let _: Vec<serde_json::Value> = self
            .db
            .insert(
                ORDER_LINES_PATH,
                json!({
                    "order_id": order.id,
                    "medicine_id": medicine_id,
                    "quantity": quantity,
                }),
            )
            .await?;

        info!(
            "Order {} placed by student {}: {} x medicine {} = {:.2}",
            order.id, student_id, quantity, medicine_id, total
        );
        Ok(order)
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>, PharmacyError> {
        let path = format!("{}?order=ordered_at.desc", ORDERS_PATH);
        Ok(self.db.select(&path).await?)
    }

    pub async fn student_orders(&self, student_id: i64) -> Result<Vec<Order>, PharmacyError> {
        debug!("Fetching orders for student {}", student_id);
        let path = format!("{}?student_id=eq.{}&order=ordered_at.desc", ORDERS_PATH, student_id);
        Ok(self.db.select(&path).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_order_status(
        &self,
        order_id: i64,
        request: OrderStatusRequest,
    ) -> Result<Order, PharmacyError> {
        let status: OrderStatus = request
            .status
            .as_deref()
            .ok_or(PharmacyError::InvalidStatus)?
            .parse()?;

        let path = format!("{}?id=eq.{}", ORDERS_PATH, order_id);
        let rows: Vec<Order> = self.db.update(&path, json!({ "status": status })).await?;
        let order = rows.into_iter().next().ok_or(PharmacyError::OrderNotFound)?;
        info!("Order {} moved to {:?}", order_id, status);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_rounds_to_cents() {
        assert_eq!(order_total(12.5, 3), 37.5);
        assert_eq!(order_total(0.1, 3), 0.3);
        assert_eq!(order_total(19.99, 1), 19.99);
    }
}
