use chrono::{DateTime, Duration, Utc};
use log::debug;
use rand::{distributions::Alphanumeric, Rng};
use sqlx::SqliteConnection;

use crate::traits::AuthApiError;

const TOKEN_LENGTH: usize = 48;

fn random_token() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(TOKEN_LENGTH).map(char::from).collect()
}

/// Issues a fresh opaque bearer token for the user.
pub async fn issue_token(user_id: &str, ttl: Duration, conn: &mut SqliteConnection) -> Result<String, AuthApiError> {
    let token = random_token();
    let expires_at = Utc::now() + ttl;
    sqlx::query(r#"INSERT INTO access_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)"#)
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(conn)
        .await?;
    debug!("🔐️ Issued access token for [{user_id}], valid until {expires_at}");
    Ok(token)
}

/// Resolves a token to its user id. Unknown tokens are invalid, known but stale ones are expired.
pub async fn user_id_for_token(token: &str, conn: &mut SqliteConnection) -> Result<String, AuthApiError> {
    let row: Option<(String, DateTime<Utc>)> =
        sqlx::query_as(r#"SELECT user_id, expires_at FROM access_tokens WHERE token = $1"#)
            .bind(token)
            .fetch_optional(conn)
            .await?;
    match row {
        None => Err(AuthApiError::InvalidToken),
        Some((_, expires_at)) if expires_at < Utc::now() => Err(AuthApiError::TokenExpired),
        Some((user_id, _)) => Ok(user_id),
    }
}
