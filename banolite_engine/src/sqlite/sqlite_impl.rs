//! `SqliteDatabase` is a concrete implementation of a Banolite marketplace backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use bnl_common::Money;
use chrono::Duration;
use log::*;
use sqlx::SqlitePool;

use super::db::{auth, db_url, new_pool, notifications, orders, products, profiles};
use crate::{
    db_types::{
        NewNotification,
        NewOrder,
        NewProduct,
        Notification,
        Order,
        OrderId,
        OrderItem,
        Product,
        Profile,
        ProfileUpdate,
        Role,
    },
    traits::{
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        CatalogApiError,
        CatalogManagement,
        FulfillmentDatabase,
        FulfillmentError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates a profile row. Account provisioning proper lives with the identity provider; this exists for tools
    /// and tests that need to seed users.
    pub async fn create_profile(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<Profile, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        profiles::insert_profile(user_id, name, email, role, &mut conn).await
    }
}

impl FulfillmentDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        let new_order = orders::insert_order(&order, &mut tx).await?;
        for item in &order.items {
            orders::insert_order_item(&new_order.id, &item.product_id, item.price, item.quantity, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB with {} line(s)", new_order.id, order.items.len());
        Ok(new_order)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn mark_order_completed(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::mark_order_completed(order_id, &mut conn).await?;
        Ok(order)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::fetch_products(&mut conn).await?;
        Ok(result)
    }

    async fn fetch_products_for_creator(&self, creator_id: &str) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::fetch_products_for_creator(creator_id, &mut conn).await?;
        Ok(result)
    }

    async fn insert_product(&self, creator_id: &str, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(creator_id, product, &mut conn).await?;
        debug!("🛒️ Product [{}] created by [{}]", product.id, product.creator_id);
        Ok(product)
    }

    async fn record_sales(&self, product_id: &str, quantity: i64) -> Result<(), CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::incr_sales_count(product_id, quantity, &mut conn).await
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        profiles::fetch_profile(user_id, &mut conn).await
    }

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        profiles::update_profile(user_id, update, &mut conn).await
    }

    async fn add_purchased_products(&self, user_id: &str, product_ids: &[String]) -> Result<(), AccountApiError> {
        let mut tx = self.pool.begin().await?;
        profiles::add_purchased_products(user_id, product_ids, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn credit_wallet(&self, user_id: &str, amount: Money) -> Result<Money, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let balance = profiles::credit_wallet(user_id, amount, &mut conn).await?;
        debug!("🧑️ Credited {amount} to [{user_id}]. New balance: {balance}");
        Ok(balance)
    }

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        notifications::insert_notification(notification, &mut conn).await
    }

    async fn fetch_notifications(&self, user_id: &str) -> Result<Vec<Notification>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = notifications::fetch_notifications(user_id, &mut conn).await?;
        Ok(result)
    }

    async fn mark_notification_read(&self, user_id: &str, notification_id: i64) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        notifications::mark_notification_read(user_id, notification_id, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_profiles(&self) -> Result<Vec<Profile>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        profiles::fetch_profiles(&mut conn).await
    }
}

impl AuthManagement for SqliteDatabase {
    async fn profile_for_token(&self, token: &str) -> Result<Profile, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user_id = auth::user_id_for_token(token, &mut conn).await?;
        let profile = profiles::fetch_profile(&user_id, &mut conn)
            .await
            .map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        profile.ok_or(AuthApiError::ProfileNotFound(user_id))
    }

    async fn issue_token(&self, user_id: &str, ttl: Duration) -> Result<String, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        auth::issue_token(user_id, ttl, &mut conn).await
    }
}
