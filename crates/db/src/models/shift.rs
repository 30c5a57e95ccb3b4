//! Shift entity model and DTOs.

use civicwatch_core::scheduling::ScheduledShift;
use civicwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `shifts` table joined with its assigned officer IDs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Shift {
    pub id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status_id: StatusId,
    pub location: Option<String>,
    pub notes: Option<String>,
    /// Assigned officers, ascending.
    pub officer_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Shift> for ScheduledShift {
    fn from(shift: Shift) -> Self {
        ScheduledShift {
            id: shift.id,
            start_time: shift.start_time,
            end_time: shift.end_time,
            officer_ids: shift.officer_ids.into_iter().collect(),
        }
    }
}

/// DTO for inserting a shift. Times must already be validated.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShift {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub officer_ids: Vec<DbId>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// DTO for replacing a shift's window, officers, and details.
pub type UpdateShift = CreateShift;
