//! User administration. Every call here needs an admin token.

use crate::models::{User, UserUpdate};

use super::{ApiClient, ApiError};

impl ApiClient {
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/admin/users").await
    }

    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        self.get(&format!("/admin/users/{}", id)).await
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        self.put(&format!("/admin/users/{}", id), update).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/admin/users/{}", id)).await
    }
}
