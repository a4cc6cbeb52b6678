use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Notification;

const COLUMNS: &str = "id, recipient_id, message, is_read, created_at";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    recipient_id: i64,
    message: &str,
    created_at: PrimitiveDateTime,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "INSERT INTO notifications (recipient_id, message, is_read, created_at)
         VALUES ($1,$2,FALSE,$3)
         RETURNING {COLUMNS}"
    ))
    .bind(recipient_id)
    .bind(message)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list(
    pool: &PgPool,
    recipient_id: i64,
    unread_only: bool,
    skip: i64,
    limit: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "SELECT {COLUMNS} FROM notifications
         WHERE recipient_id = $1 AND (NOT $2 OR NOT is_read)
         ORDER BY created_at DESC, id DESC
         OFFSET $3 LIMIT $4"
    ))
    .bind(recipient_id)
    .bind(unread_only)
    .bind(skip.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(
    pool: &PgPool,
    recipient_id: i64,
    unread_only: bool,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND (NOT $2 OR NOT is_read)",
    )
    .bind(recipient_id)
    .bind(unread_only)
    .fetch_one(pool)
    .await
}

/// Scoped to the recipient; someone else's notification behaves as missing.
pub(crate) async fn set_read(
    pool: &PgPool,
    id: i64,
    recipient_id: i64,
    is_read: bool,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "UPDATE notifications SET is_read = $1
         WHERE id = $2 AND recipient_id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(is_read)
    .bind(id)
    .bind(recipient_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn mark_all_read(pool: &PgPool, recipient_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND NOT is_read",
    )
    .bind(recipient_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
