//! Order forms: submission by customers, review and status changes by admins.

use serde::Serialize;
use tracing::{debug, info};

use crate::models::{Order, OrderQuery, OrderStatus, OrderSubmission};

use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct StatusParam {
    status: OrderStatus,
}

impl ApiClient {
    pub async fn submit_order(&self, submission: &OrderSubmission) -> Result<Order, ApiError> {
        let order: Order = self.post("/orders", submission).await?;
        info!(order_id = order.id, product_id = submission.product.id, "Order submitted");
        Ok(order)
    }

    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, ApiError> {
        let orders: Vec<Order> = self.get_with_query("/orders", query).await?;
        debug!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{}", id)).await
    }

    /// The new status travels as a query parameter; the body is empty
    pub async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.put_with_query(&format!("/orders/{}/status", id), &StatusParam { status })
            .await
    }

    pub async fn delete_order(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/orders/{}", id)).await
    }
}
