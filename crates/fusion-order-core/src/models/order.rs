use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::deserialize_local_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Wire name, as used in the `status` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Confirmed => write!(f, "Confirmed"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "productId")]
    pub product_id: Option<i64>,
    #[serde(rename = "productName")]
    pub product_name: Option<String>,
    pub quantity: i32,
    #[serde(rename = "contactName")]
    pub contact_name: String,
    #[serde(rename = "contactPhone")]
    pub contact_phone: String,
    #[serde(rename = "contactEmail")]
    pub contact_email: Option<String>,
    pub requirements: Option<String>,
    pub status: OrderStatus,
    #[serde(rename = "createdAt", default, deserialize_with = "deserialize_local_datetime")]
    pub created_at: Option<NaiveDateTime>,
}

/// Reference to the product an order is for; the server only reads the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: i64,
}

/// The order form a customer fills in on a product page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub product: ProductRef,
    pub quantity: i32,
    #[serde(rename = "contactName")]
    pub contact_name: String,
    #[serde(rename = "contactPhone")]
    pub contact_phone: String,
    #[serde(rename = "contactEmail", skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

impl OrderSubmission {
    pub fn new(
        product_id: i64,
        quantity: i32,
        contact_name: impl Into<String>,
        contact_phone: impl Into<String>,
    ) -> Self {
        Self {
            product: ProductRef { id: product_id },
            quantity,
            contact_name: contact_name.into(),
            contact_phone: contact_phone.into(),
            contact_email: None,
            requirements: None,
        }
    }
}

/// Filters for `GET /orders`. The server honours `productId` before `status`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderQuery {
    #[serde(rename = "productId", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order() {
        let json = r#"{"id":42,"productId":3,"productName":"Steel Bracket","quantity":10,"contactName":"Li Wei","contactPhone":"13800000000","contactEmail":null,"requirements":"Deliver before Friday","status":"CONFIRMED","createdAt":"2024-04-02T16:20:00"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, 42);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.product_name.as_deref(), Some("Steel Bracket"));
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_submission_wire_shape() {
        let mut submission = OrderSubmission::new(3, 5, "Li Wei", "13800000000");
        submission.requirements = Some("Blue finish".to_string());
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "product": {"id": 3},
                "quantity": 5,
                "contactName": "Li Wei",
                "contactPhone": "13800000000",
                "requirements": "Blue finish"
            })
        );
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!(" CANCELLED ".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::Processing.to_string(), "Processing");
        assert_eq!(OrderStatus::Processing.as_str(), "PROCESSING");
    }

    #[test]
    fn test_order_query_serializes_status_as_wire_name() {
        let query = OrderQuery {
            product_id: None,
            status: Some(OrderStatus::Completed),
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({"status": "COMPLETED"})
        );
    }
}
