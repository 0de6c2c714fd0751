use chrono::Duration;

use crate::{
    db_types::Profile,
    traits::{AuthApiError, AuthManagement},
};

/// Resolves bearer tokens against the identity provider's token store.
#[derive(Debug, Clone)]
pub struct AuthApi<B> {
    db: B,
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub async fn profile_for_token(&self, token: &str) -> Result<Profile, AuthApiError> {
        self.db.profile_for_token(token).await
    }

    pub async fn issue_token(&self, user_id: &str, ttl: Duration) -> Result<String, AuthApiError> {
        self.db.issue_token(user_id, ttl).await
    }
}
