use std::sync::Arc;

use civicwatch_core::scheduling::ShiftConflictValidator;
use civicwatch_db::lookup::{PgOfficerDirectory, PgShiftStore};
use civicwatch_events::{NotificationQueue, NotificationTask};

use crate::config::ServerConfig;

/// Validator wired to the Postgres lookups.
pub type PgShiftValidator = ShiftConflictValidator<PgOfficerDirectory, PgShiftStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: civicwatch_db::DbPool,
    /// Server configuration, including the scheduling policy.
    pub config: Arc<ServerConfig>,
    /// Producer side of the officer notification queue.
    pub notifications: NotificationQueue,
}

impl AppState {
    /// Build a pool-backed shift conflict validator for dry runs. Writes
    /// validate on their own transaction instead.
    pub fn shift_validator(&self) -> PgShiftValidator {
        ShiftConflictValidator::new(
            PgOfficerDirectory::new(self.pool.clone()),
            PgShiftStore::new(self.pool.clone()),
            self.config.scheduling,
        )
    }

    /// Queue a notification task. The write it describes has already
    /// committed, so a full or closed queue is logged rather than surfaced.
    pub fn notify(&self, task: NotificationTask) {
        let shift_id = task.shift_id;
        let kind = task.kind.as_str();
        if let Err(e) = self.notifications.enqueue(task) {
            tracing::warn!(error = %e, shift_id, kind, "Notification not queued");
        }
    }
}
