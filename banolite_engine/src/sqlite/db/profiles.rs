use bnl_common::Money;
use chrono::{DateTime, Utc};
use log::{error, trace};
use sqlx::{FromRow, SqliteConnection};

use crate::{
    db_types::{Profile, ProfileUpdate, Role},
    traits::AccountApiError,
};

/// What a profile looks like on disk. `purchased_product_ids` is stored as a JSON array in a TEXT column.
#[derive(Debug, Clone, FromRow)]
struct ProfileRow {
    id: String,
    name: String,
    email: String,
    role: Role,
    wallet_balance: Money,
    purchased_product_ids: String,
    store_name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        let purchased_product_ids = serde_json::from_str(&row.purchased_product_ids).unwrap_or_else(|e| {
            error!("🧑️ Corrupt purchased product list for profile [{}]: {e}. Treating as empty.", row.id);
            Vec::new()
        });
        Profile {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            wallet_balance: row.wallet_balance,
            purchased_product_ids,
            store_name: row.store_name,
            bio: row.bio,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn fetch_profile(user_id: &str, conn: &mut SqliteConnection) -> Result<Option<Profile>, AccountApiError> {
    trace!("🧑️ Fetching profile [{user_id}]");
    let row: Option<ProfileRow> =
        sqlx::query_as(r#"SELECT * FROM profiles WHERE id = $1"#).bind(user_id).fetch_optional(conn).await?;
    Ok(row.map(Profile::from))
}

pub async fn fetch_profiles(conn: &mut SqliteConnection) -> Result<Vec<Profile>, AccountApiError> {
    let rows: Vec<ProfileRow> =
        sqlx::query_as(r#"SELECT * FROM profiles ORDER BY created_at, id"#).fetch_all(conn).await?;
    Ok(rows.into_iter().map(Profile::from).collect())
}

pub async fn insert_profile(
    user_id: &str,
    name: &str,
    email: &str,
    role: Role,
    conn: &mut SqliteConnection,
) -> Result<Profile, AccountApiError> {
    let row: ProfileRow = sqlx::query_as(
        r#"
            INSERT INTO profiles (id, name, email, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(role)
    .fetch_one(conn)
    .await?;
    Ok(row.into())
}

pub async fn update_profile(
    user_id: &str,
    update: ProfileUpdate,
    conn: &mut SqliteConnection,
) -> Result<Profile, AccountApiError> {
    if update.is_empty() {
        return Err(AccountApiError::EmptyUpdate);
    }
    let row: Option<ProfileRow> = sqlx::query_as(
        r#"
            UPDATE profiles
            SET name = COALESCE($1, name),
                store_name = COALESCE($2, store_name),
                bio = COALESCE($3, bio),
                avatar_url = COALESCE($4, avatar_url),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $5
            RETURNING *;
        "#,
    )
    .bind(update.name)
    .bind(update.store_name)
    .bind(update.bio)
    .bind(update.avatar_url)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    row.map(Profile::from).ok_or_else(|| AccountApiError::ProfileNotFound(user_id.to_string()))
}

/// Adds `amount` to the wallet and returns the new balance.
pub async fn credit_wallet(user_id: &str, amount: Money, conn: &mut SqliteConnection) -> Result<Money, AccountApiError> {
    let balance: Option<Money> = sqlx::query_scalar(
        r#"
            UPDATE profiles
            SET wallet_balance = wallet_balance + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING wallet_balance;
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    balance.ok_or_else(|| AccountApiError::ProfileNotFound(user_id.to_string()))
}

/// Set-union of `product_ids` into the profile's purchased product list. Reads, merges and writes back inside the
/// caller's connection, so wrap in a transaction when concurrent purchases for the same user are possible.
pub async fn add_purchased_products(
    user_id: &str,
    product_ids: &[String],
    conn: &mut SqliteConnection,
) -> Result<(), AccountApiError> {
    let profile =
        fetch_profile(user_id, conn).await?.ok_or_else(|| AccountApiError::ProfileNotFound(user_id.to_string()))?;
    let mut purchased = profile.purchased_product_ids;
    for id in product_ids {
        if !purchased.contains(id) {
            purchased.push(id.clone());
        }
    }
    let as_json = serde_json::to_string(&purchased)
        .map_err(|e| AccountApiError::DatabaseError(format!("Could not serialize purchased product list: {e}")))?;
    sqlx::query(
        r#"
            UPDATE profiles
            SET purchased_product_ids = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
        "#,
    )
    .bind(as_json)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}
