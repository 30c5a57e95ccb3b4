//! Delivery seam for officer notifications.

use async_trait::async_trait;
use civicwatch_core::types::DbId;
use civicwatch_db::repositories::NotificationRepo;
use civicwatch_db::DbPool;

use crate::queue::NotificationKind;

/// A notification addressed to a single officer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerMessage {
    pub officer_id: DbId,
    pub shift_id: Option<DbId>,
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Transient storage failure; worth another attempt.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The recipient or shift can never accept this message, e.g. the
    /// officer was deleted after the task was queued.
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

impl DeliveryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// Integrity violations (SQLSTATE class 23) fail the same way on every
    /// attempt, so they become [`DeliveryError::Rejected`].
    fn from_storage(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.code().is_some_and(|code| code.starts_with("23")) =>
            {
                Self::Rejected(db_err.message().to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Somewhere officer notifications end up.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn deliver(&self, message: &OfficerMessage) -> Result<(), DeliveryError>;
}

/// Persists notifications to `officer_notifications` for later retrieval.
pub struct DbNotificationSink {
    pool: DbPool,
}

impl DbNotificationSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for DbNotificationSink {
    async fn deliver(&self, message: &OfficerMessage) -> Result<(), DeliveryError> {
        let id = NotificationRepo::create(
            &self.pool,
            message.officer_id,
            message.shift_id,
            message.kind.as_str(),
            &message.message,
        )
        .await
        .map_err(DeliveryError::from_storage)?;

        tracing::debug!(
            notification_id = id,
            officer_id = message.officer_id,
            kind = message.kind.as_str(),
            "Notification stored"
        );
        Ok(())
    }
}
