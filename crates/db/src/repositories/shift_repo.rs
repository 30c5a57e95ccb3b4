//! Repository for the `shifts` and `shift_assignments` tables.
//!
//! Writes that must be checked by the shift conflict validator take an open
//! transaction so the caller can hold per-officer locks across
//! lock -> validate -> write.

use civicwatch_core::shift_lifecycle::{self, INACTIVE_STATUSES};
use civicwatch_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::models::shift::{CreateShift, Shift, UpdateShift};
use crate::models::status::StatusId;

/// Column list for `shifts s`, with assigned officers aggregated per row.
const COLUMNS: &str = "s.id, s.start_time, s.end_time, s.status_id, s.location, s.notes, \
    COALESCE(( \
        SELECT ARRAY_AGG(a.officer_id ORDER BY a.officer_id) \
        FROM shift_assignments a WHERE a.shift_id = s.id \
    ), '{}') AS officer_ids, \
    s.created_at, s.updated_at";

/// Provides CRUD and conflict-lookup queries for shifts.
pub struct ShiftRepo;

impl ShiftRepo {
    /// Take transaction-scoped advisory locks on each officer, ascending.
    ///
    /// Concurrent create/update requests touching the same officer serialize
    /// here until the holding transaction ends.
    pub async fn lock_officers(
        tx: &mut Transaction<'_, Postgres>,
        officer_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut ids = officer_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        for id in ids {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Read a shift's status within `tx`, locking the row until the
    /// transaction ends. Returns `None` if the shift does not exist.
    pub async fn lock_status(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<StatusId>, sqlx::Error> {
        sqlx::query_scalar("SELECT status_id FROM shifts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a shift and its assignments within `tx`.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateShift,
    ) -> Result<Shift, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO shifts (start_time, end_time, location, notes) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location)
        .bind(&input.notes)
        .fetch_one(&mut **tx)
        .await?;

        Self::insert_assignments(tx, id, input).await?;
        Self::fetch_in_tx(tx, id).await
    }

    /// Replace a shift's window, details, and assignments within `tx`.
    ///
    /// Returns `None` if the shift does not exist.
    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &UpdateShift,
    ) -> Result<Option<Shift>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE shifts \
             SET start_time = $2, end_time = $3, location = $4, notes = $5, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location)
        .bind(&input.notes)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("DELETE FROM shift_assignments WHERE shift_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Self::insert_assignments(tx, id, input).await?;

        Self::fetch_in_tx(tx, id).await.map(Some)
    }

    /// Find a shift by ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Shift>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shifts s WHERE s.id = $1");
        sqlx::query_as::<_, Shift>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List shifts intersecting the optional `[from, to)` window, by start time.
    pub async fn list(
        pool: &PgPool,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<Shift>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shifts s \
             WHERE ($1::timestamptz IS NULL OR s.end_time > $1) \
               AND ($2::timestamptz IS NULL OR s.start_time < $2) \
             ORDER BY s.start_time, s.id"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// List every shift an officer is assigned to, by start time.
    pub async fn list_for_officer(
        pool: &PgPool,
        officer_id: DbId,
    ) -> Result<Vec<Shift>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shifts s \
             WHERE EXISTS ( \
                 SELECT 1 FROM shift_assignments a \
                 WHERE a.shift_id = s.id AND a.officer_id = $1 \
             ) \
             ORDER BY s.start_time, s.id"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(officer_id)
            .fetch_all(pool)
            .await
    }

    /// Find every active shift assigned to at least one of `officer_ids`.
    ///
    /// Cancelled and rejected shifts are excluded; they no longer occupy
    /// their officers' time.
    pub async fn find_by_any_officer<'e>(
        executor: impl PgExecutor<'e>,
        officer_ids: &[DbId],
    ) -> Result<Vec<Shift>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shifts s \
             WHERE s.status_id <> ALL($2) \
               AND EXISTS ( \
                   SELECT 1 FROM shift_assignments a \
                   WHERE a.shift_id = s.id AND a.officer_id = ANY($1) \
               ) \
             ORDER BY s.start_time, s.id"
        );
        sqlx::query_as::<_, Shift>(&query)
            .bind(officer_ids)
            .bind(INACTIVE_STATUSES)
            .fetch_all(executor)
            .await
    }

    /// Set a shift's status within `tx` and sync whether its assignments
    /// still block. Callers check the transition against the status read by
    /// [`Self::lock_status`] in the same transaction.
    ///
    /// Returns `None` if the shift does not exist.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status_id: StatusId,
    ) -> Result<Option<Shift>, sqlx::Error> {
        let result =
            sqlx::query("UPDATE shifts SET status_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status_id)
                .execute(&mut **tx)
                .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("UPDATE shift_assignments SET is_blocking = $2 WHERE shift_id = $1")
            .bind(id)
            .bind(shift_lifecycle::is_blocking(status_id))
            .execute(&mut **tx)
            .await?;

        Self::fetch_in_tx(tx, id).await.map(Some)
    }

    /// Delete a shift (assignments cascade). Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Insert one assignment row per officer, copying the shift window.
    async fn insert_assignments(
        tx: &mut Transaction<'_, Postgres>,
        shift_id: DbId,
        input: &CreateShift,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO shift_assignments (shift_id, officer_id, start_time, end_time) \
             SELECT $1, officer_id, $3, $4 FROM UNNEST($2::bigint[]) AS officer_id",
        )
        .bind(shift_id)
        .bind(&input.officer_ids)
        .bind(input.start_time)
        .bind(input.end_time)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn fetch_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Shift, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shifts s WHERE s.id = $1");
        sqlx::query_as::<_, Shift>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }
}
