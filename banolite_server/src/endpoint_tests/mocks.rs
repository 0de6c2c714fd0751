use banolite_engine::{
    db_types::{
        NewNotification,
        NewProduct,
        Notification,
        Order,
        Product,
        Profile,
        ProfileUpdate,
    },
    traits::{AccountApiError, AccountManagement, AuthApiError, AuthManagement, CatalogApiError, CatalogManagement},
};
use bnl_common::Money;
use chrono::Duration;
use mockall::mock;

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, AccountApiError>;
        async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile, AccountApiError>;
        async fn add_purchased_products(&self, user_id: &str, product_ids: &[String]) -> Result<(), AccountApiError>;
        async fn credit_wallet(&self, user_id: &str, amount: Money) -> Result<Money, AccountApiError>;
        async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, AccountApiError>;
        async fn fetch_notifications(&self, user_id: &str) -> Result<Vec<Notification>, AccountApiError>;
        async fn mark_notification_read(&self, user_id: &str, notification_id: i64) -> Result<(), AccountApiError>;
        async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_profiles(&self) -> Result<Vec<Profile>, AccountApiError>;
    }
}

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, CatalogApiError>;
        async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;
        async fn fetch_products_for_creator(&self, creator_id: &str) -> Result<Vec<Product>, CatalogApiError>;
        async fn insert_product(&self, creator_id: &str, product: NewProduct) -> Result<Product, CatalogApiError>;
        async fn record_sales(&self, product_id: &str, quantity: i64) -> Result<(), CatalogApiError>;
    }
}

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn profile_for_token(&self, token: &str) -> Result<Profile, AuthApiError>;
        async fn issue_token(&self, user_id: &str, ttl: Duration) -> Result<String, AuthApiError>;
    }
}
