use sqlx::SqliteConnection;

use crate::{
    db_types::{NewNotification, Notification},
    traits::AccountApiError,
};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, AccountApiError> {
    let notification = sqlx::query_as(
        r#"
            INSERT INTO notifications (user_id, kind, message, link)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.kind)
    .bind(notification.message)
    .bind(notification.link)
    .fetch_one(conn)
    .await?;
    Ok(notification)
}

pub async fn fetch_notifications(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications =
        sqlx::query_as(r#"SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC"#)
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(notifications)
}

/// Marks a notification as read. The user id guards against marking someone else's notification.
pub async fn mark_notification_read(
    user_id: &str,
    notification_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), AccountApiError> {
    let res = sqlx::query(r#"UPDATE notifications SET read = 1 WHERE id = $1 AND user_id = $2"#)
        .bind(notification_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AccountApiError::NotificationNotFound(notification_id));
    }
    Ok(())
}
