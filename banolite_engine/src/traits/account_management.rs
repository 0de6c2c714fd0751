use bnl_common::Money;
use thiserror::Error;

use crate::db_types::{NewNotification, Notification, Order, Profile, ProfileUpdate};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
    #[error("Notification not found: {0}")]
    NotificationNotFound(i64),
    #[error("Nothing to update")]
    EmptyUpdate,
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Profile, wallet and notification reads and writes.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, AccountApiError>;

    /// Applies the allow-listed fields of `update` and returns the fresh profile.
    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile, AccountApiError>;

    /// Set-union of `product_ids` into the profile's purchased product list.
    async fn add_purchased_products(&self, user_id: &str, product_ids: &[String]) -> Result<(), AccountApiError>;

    /// Adds `amount` to the user's wallet and returns the new balance.
    async fn credit_wallet(&self, user_id: &str, amount: Money) -> Result<Money, AccountApiError>;

    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, AccountApiError>;

    /// Newest first.
    async fn fetch_notifications(&self, user_id: &str) -> Result<Vec<Notification>, AccountApiError>;

    /// No-op if the notification is already read. Errors if it belongs to someone else.
    async fn mark_notification_read(&self, user_id: &str, notification_id: i64) -> Result<(), AccountApiError>;

    /// Order history for a user, newest first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, AccountApiError>;

    /// Admin listing of every profile.
    async fn fetch_profiles(&self) -> Result<Vec<Profile>, AccountApiError>;
}
