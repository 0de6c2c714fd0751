use crate::{
    db_types::{NewProduct, Product},
    traits::{CatalogApiError, CatalogManagement},
};

/// Product catalog queries and creator-owned product management.
#[derive(Debug, Clone)]
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn products(&self) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products().await
    }

    pub async fn product(&self, product_id: &str) -> Result<Product, CatalogApiError> {
        self.db.fetch_product(product_id).await?.ok_or_else(|| CatalogApiError::ProductNotFound(product_id.to_string()))
    }

    pub async fn products_for_creator(&self, creator_id: &str) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products_for_creator(creator_id).await
    }

    pub async fn create_product(&self, creator_id: &str, product: NewProduct) -> Result<Product, CatalogApiError> {
        self.db.insert_product(creator_id, product).await
    }
}
