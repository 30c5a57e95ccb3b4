//! Repository for the `officer_notifications` table.

use civicwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::OfficerNotification;

/// Column list for `officer_notifications` queries.
const COLUMNS: &str = "id, officer_id, shift_id, kind, message, is_read, read_at, created_at";

/// Provides CRUD operations for officer notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification for an officer, returning the generated ID.
    pub async fn create(
        pool: &PgPool,
        officer_id: DbId,
        shift_id: Option<DbId>,
        kind: &str,
        message: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO officer_notifications (officer_id, shift_id, kind, message) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(officer_id)
        .bind(shift_id)
        .bind(kind)
        .bind(message)
        .fetch_one(pool)
        .await
    }

    /// List notifications for an officer, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_officer(
        pool: &PgPool,
        officer_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OfficerNotification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM officer_notifications \
             WHERE officer_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, OfficerNotification>(&query)
            .bind(officer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if an unread notification belonging to the officer was
    /// updated, `false` otherwise.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        officer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE officer_notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND officer_id = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(officer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
