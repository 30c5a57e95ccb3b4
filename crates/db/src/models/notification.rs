//! Officer notification model.

use civicwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `officer_notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OfficerNotification {
    pub id: DbId,
    pub officer_id: DbId,
    pub shift_id: Option<DbId>,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
