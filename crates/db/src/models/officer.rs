//! Officer entity model and DTOs.

use civicwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A row from the `officers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Officer {
    pub id: DbId,
    pub badge_number: String,
    pub full_name: String,
    pub rank: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an officer.
#[derive(Debug, Deserialize)]
pub struct CreateOfficer {
    pub badge_number: String,
    pub full_name: String,
    pub rank: Option<String>,
}

/// DTO for updating an officer. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOfficer {
    pub full_name: Option<String>,
    /// `None` when omitted, `Some(None)` for an explicit `null` (clear).
    #[serde(default, deserialize_with = "present")]
    pub rank: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Marks a field as present, keeping an explicit `null` distinct from omission.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
