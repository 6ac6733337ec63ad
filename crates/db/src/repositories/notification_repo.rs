//! Repository for the `notifications` table.

use sqlx::PgExecutor;
use parapheur_core::types::DbId;

use crate::models::notification::Notification;

const COLUMNS: &str = "id, user_id, title, message, notification_type, is_read, created_at";

/// Provides operations for the notification inbox.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Durably record a notification for a user.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
        title: &str,
        message: &str,
        notification_type: &str,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (user_id, title, message, notification_type)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(title)
            .bind(message)
            .bind(notification_type)
            .fetch_one(executor)
            .await
    }

    /// List a user's notifications, newest first.
    pub async fn list_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await
    }

    /// Mark one notification as read. Returns `false` when the row does
    /// not exist or belongs to another user.
    pub async fn mark_read<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a user's notifications as read; returns the count.
    pub async fn mark_all_read<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
                .bind(user_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }

    /// Number of unread notifications for a user.
    pub async fn unread_count<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Delete one notification from the user's inbox. Returns `false`
    /// when nothing was deleted.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
