use thiserror::Error;

use crate::{
    db_types::{ConversionError, NewOrder, Order, OrderId, OrderItem},
    traits::{AccountApiError, AccountManagement, CatalogApiError, CatalogManagement},
};

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} was not found")]
    OrderNotFound(OrderId),
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error("Account error: {0}")]
    AccountError(#[from] AccountApiError),
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogApiError),
}

impl From<sqlx::Error> for FulfillmentError {
    fn from(e: sqlx::Error) -> Self {
        FulfillmentError::DatabaseError(e.to_string())
    }
}

impl From<ConversionError> for FulfillmentError {
    fn from(e: ConversionError) -> Self {
        FulfillmentError::InvalidOrder(e.to_string())
    }
}

/// The storage operations the order flow needs. The sales-count, wallet and notification writes that fulfillment
/// triggers come in via the [`AccountManagement`] and [`CatalogManagement`] supertraits.
#[allow(async_fn_in_trait)]
pub trait FulfillmentDatabase: Clone + AccountManagement + CatalogManagement {
    fn url(&self) -> &str;

    /// Persists a new pending order together with its line items in one transaction.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, FulfillmentError>;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, FulfillmentError>;

    /// Flips the order from `Pending` to `Completed` in a single conditional update. Returns the completed order,
    /// or `None` when the order was not pending anymore, so concurrent duplicate deliveries cannot both win.
    async fn mark_order_completed(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError>;
}
