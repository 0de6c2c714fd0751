use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product},
    traits::CatalogApiError,
};

pub async fn fetch_product(product_id: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    trace!("🛒️ Fetching product [{product_id}]");
    let product =
        sqlx::query_as(r#"SELECT * FROM products WHERE id = $1"#).bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as(r#"SELECT * FROM products ORDER BY created_at DESC, id"#).fetch_all(conn).await?;
    Ok(products)
}

pub async fn fetch_products_for_creator(
    creator_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as(r#"SELECT * FROM products WHERE creator_id = $1 ORDER BY created_at DESC, id"#)
        .bind(creator_id)
        .fetch_all(conn)
        .await?;
    Ok(products)
}

pub async fn insert_product(
    creator_id: &str,
    product: NewProduct,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogApiError> {
    let id = uuid::Uuid::new_v4().to_string();
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (id, creator_id, title, description, price, product_type, cover_url, file_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(creator_id)
    .bind(product.title)
    .bind(product.description)
    .bind(product.price)
    .bind(product.product_type)
    .bind(product.cover_url)
    .bind(product.file_url)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

/// Bumps the sales count. Errors with [`CatalogApiError::ProductNotFound`] when no row matches, so fulfillment can
/// log and skip lines whose product has been deleted.
pub async fn incr_sales_count(
    product_id: &str,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), CatalogApiError> {
    let res = sqlx::query(
        r#"
            UPDATE products
            SET sales_count = sales_count + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    if res.rows_affected() == 0 {
        return Err(CatalogApiError::ProductNotFound(product_id.to_string()));
    }
    Ok(())
}
