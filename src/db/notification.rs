use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Notification;

pub async fn insert(
    ex: impl PgExecutor<'_>,
    notification: &Notification,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO notifications (id, user_id, title, message, notification_type, is_read, action_url, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(notification.id)
    .bind(notification.user_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.notification_type)
    .bind(notification.is_read)
    .bind(&notification.action_url)
    .bind(notification.created_at)
    .execute(ex)
    .await?;
    Ok(res.rows_affected())
}

pub async fn list_for_user(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    unread_only: bool,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications
         WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .bind(unread_only)
    .fetch_all(ex)
    .await
}

pub async fn unread_for_user(
    ex: impl PgExecutor<'_>,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications
         WHERE user_id = $1 AND is_read = FALSE
         ORDER BY created_at DESC
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(ex)
    .await
}

// scoped to the owner so one user cannot consume another's notifications
pub async fn mark_read(
    ex: impl PgExecutor<'_>,
    id: Uuid,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}
