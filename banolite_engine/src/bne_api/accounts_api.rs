use crate::{
    db_types::{Notification, Profile, ProfileUpdate},
    traits::{AccountApiError, AccountManagement},
};

/// Profile, wallet and notification queries. A thin, trait-bound wrapper around the backend.
#[derive(Debug, Clone)]
pub struct AccountApi<B> {
    db: B,
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub async fn profile(&self, user_id: &str) -> Result<Profile, AccountApiError> {
        self.db.fetch_profile(user_id).await?.ok_or_else(|| AccountApiError::ProfileNotFound(user_id.to_string()))
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile, AccountApiError> {
        self.db.update_profile(user_id, update).await
    }

    pub async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>, AccountApiError> {
        self.db.fetch_notifications(user_id).await
    }

    pub async fn mark_notification_read(&self, user_id: &str, notification_id: i64) -> Result<(), AccountApiError> {
        self.db.mark_notification_read(user_id, notification_id).await
    }

    /// Admin listing of every profile on the platform.
    pub async fn all_profiles(&self) -> Result<Vec<Profile>, AccountApiError> {
        self.db.fetch_profiles().await
    }
}
