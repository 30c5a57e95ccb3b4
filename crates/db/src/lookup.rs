//! Postgres-backed collaborators for the shift conflict validator.
//!
//! [`PgOfficerDirectory`] and [`PgShiftStore`] read through the pool and
//! serve dry-run validation. Creates and updates validate while holding
//! per-officer locks on an open transaction, so they read through
//! [`PgTxLookups`] on that same connection instead of borrowing a second
//! one from the pool.

use std::collections::BTreeSet;

use async_trait::async_trait;
use civicwatch_core::scheduling::{LookupError, OfficerDirectory, ScheduledShift, ShiftStore};
use civicwatch_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};
use tokio::sync::Mutex;

use crate::repositories::{OfficerRepo, ShiftRepo};
use crate::DbPool;

async fn existing_officers<'e>(
    executor: impl PgExecutor<'e>,
    officer_ids: &BTreeSet<DbId>,
) -> Result<Vec<DbId>, LookupError> {
    let ids: Vec<DbId> = officer_ids.iter().copied().collect();
    OfficerRepo::find_existing_ids(executor, &ids)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Officer lookup failed");
            LookupError::officer_directory(e)
        })
}

async fn active_shifts<'e>(
    executor: impl PgExecutor<'e>,
    officer_ids: &BTreeSet<DbId>,
) -> Result<Vec<ScheduledShift>, LookupError> {
    let ids: Vec<DbId> = officer_ids.iter().copied().collect();
    let shifts = ShiftRepo::find_by_any_officer(executor, &ids)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Shift lookup failed");
            LookupError::shift_store(e)
        })?;
    Ok(shifts.into_iter().map(ScheduledShift::from).collect())
}

// ---------------------------------------------------------------------------
// Pool-backed
// ---------------------------------------------------------------------------

/// Resolves officer IDs against the `officers` table.
#[derive(Clone)]
pub struct PgOfficerDirectory {
    pool: DbPool,
}

impl PgOfficerDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfficerDirectory for PgOfficerDirectory {
    async fn find_existing_officers(
        &self,
        officer_ids: &BTreeSet<DbId>,
    ) -> Result<Vec<DbId>, LookupError> {
        existing_officers(&self.pool, officer_ids).await
    }
}

/// Reads active shifts from `shifts` / `shift_assignments`.
#[derive(Clone)]
pub struct PgShiftStore {
    pool: DbPool,
}

impl PgShiftStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftStore for PgShiftStore {
    async fn find_shifts_by_any_officer(
        &self,
        officer_ids: &BTreeSet<DbId>,
    ) -> Result<Vec<ScheduledShift>, LookupError> {
        active_shifts(&self.pool, officer_ids).await
    }
}

// ---------------------------------------------------------------------------
// Transaction-bound
// ---------------------------------------------------------------------------

/// Both validator lookups over one borrowed connection, usually the open
/// transaction that holds the officer locks.
///
/// Pass it by reference as both the directory and the store. The reads
/// see the transaction's own uncommitted writes.
pub struct PgTxLookups<'c> {
    conn: Mutex<&'c mut PgConnection>,
}

impl<'c> PgTxLookups<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl<'c> OfficerDirectory for PgTxLookups<'c> {
    async fn find_existing_officers(
        &self,
        officer_ids: &BTreeSet<DbId>,
    ) -> Result<Vec<DbId>, LookupError> {
        let mut conn = self.conn.lock().await;
        existing_officers(&mut **conn, officer_ids).await
    }
}

#[async_trait]
impl<'c> ShiftStore for PgTxLookups<'c> {
    async fn find_shifts_by_any_officer(
        &self,
        officer_ids: &BTreeSet<DbId>,
    ) -> Result<Vec<ScheduledShift>, LookupError> {
        let mut conn = self.conn.lock().await;
        active_shifts(&mut **conn, officer_ids).await
    }
}
