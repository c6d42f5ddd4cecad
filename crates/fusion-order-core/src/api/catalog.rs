//! Product catalog: browsing for everyone, editing for admins and managers.

use tracing::debug;

use crate::models::{Product, ProductInput, ProductQuery};

use super::{ApiClient, ApiError};

impl ApiClient {
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let products: Vec<Product> = self.get_with_query("/products", query).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    pub async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, ApiError> {
        self.list_products(&ProductQuery::search(keyword)).await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, ApiError> {
        self.get(&format!("/products/{}", id)).await
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        self.post("/products", input).await
    }

    pub async fn update_product(&self, id: i64, input: &ProductInput) -> Result<Product, ApiError> {
        self.put(&format!("/products/{}", id), input).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/products/{}", id)).await
    }
}
