//! Data models for the order-management API.
//!
//! - `Product`, `ProductInput`, `ProductQuery`: catalog entries and admin edits
//! - `Order`, `OrderSubmission`, `OrderStatus`, `OrderQuery`: order forms
//! - `User`, `Role`, `UserUpdate`: accounts managed from the admin console
//! - `AuthRequest`, `AuthResponse`, `RegisterRequest`: login and sign-up

pub mod auth;
pub mod order;
pub mod product;
pub mod user;

pub use auth::{AuthRequest, AuthResponse, RegisterRequest};
pub use order::{Order, OrderQuery, OrderStatus, OrderSubmission, ProductRef};
pub use product::{categories, Product, ProductInput, ProductQuery};
pub use user::{Role, User, UserUpdate};

use chrono::NaiveDateTime;

// Server timestamps are zone-less local date-times. Anything unparseable
// (or an array-encoded date) is dropped rather than failing the record.
pub(crate) fn deserialize_local_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<NaiveDateTime>().ok()))
}
