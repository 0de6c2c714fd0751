use chrono::Duration;
use thiserror::Error;

use crate::db_types::Profile;

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The access token is not valid")]
    InvalidToken,
    #[error("The access token has expired")]
    TokenExpired,
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

/// Bearer-token verification against the identity provider's token store.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Resolves a bearer token to the profile it was issued for. Unknown tokens yield
    /// [`AuthApiError::InvalidToken`] and expired ones [`AuthApiError::TokenExpired`].
    async fn profile_for_token(&self, token: &str) -> Result<Profile, AuthApiError>;

    /// Issues a fresh opaque token for the user, valid for `ttl`.
    async fn issue_token(&self, user_id: &str, ttl: Duration) -> Result<String, AuthApiError>;
}
