use thiserror::Error;

use crate::db_types::{NewProduct, Product};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

/// Product catalog reads and writes.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, CatalogApiError>;

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;

    async fn fetch_products_for_creator(&self, creator_id: &str) -> Result<Vec<Product>, CatalogApiError>;

    /// Creates a product owned by `creator_id` and returns it with its generated id.
    async fn insert_product(&self, creator_id: &str, product: NewProduct) -> Result<Product, CatalogApiError>;

    /// Bumps the product's sales count by `quantity`.
    async fn record_sales(&self, product_id: &str, quantity: i64) -> Result<(), CatalogApiError>;
}
