//! Repository for the `officers` table.

use civicwatch_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::officer::{CreateOfficer, Officer, UpdateOfficer};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, badge_number, full_name, rank, is_active, created_at, updated_at";

/// Provides CRUD operations for officers.
pub struct OfficerRepo;

impl OfficerRepo {
    /// Insert a new officer, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateOfficer) -> Result<Officer, sqlx::Error> {
        let query = format!(
            "INSERT INTO officers (badge_number, full_name, rank) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Officer>(&query)
            .bind(&input.badge_number)
            .bind(&input.full_name)
            .bind(&input.rank)
            .fetch_one(pool)
            .await
    }

    /// Find an officer by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Officer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM officers WHERE id = $1");
        sqlx::query_as::<_, Officer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all officers ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Officer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM officers ORDER BY id ASC");
        sqlx::query_as::<_, Officer>(&query).fetch_all(pool).await
    }

    /// Patch an officer. Returns `None` if no row matched.
    ///
    /// `rank` is only written when the patch carries it, so `Some(None)`
    /// clears it and `None` leaves it alone.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOfficer,
    ) -> Result<Option<Officer>, sqlx::Error> {
        let query = format!(
            "UPDATE officers SET \
                full_name = COALESCE($2, full_name), \
                rank = CASE WHEN $5 THEN $3 ELSE rank END, \
                is_active = COALESCE($4, is_active), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Officer>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(input.rank.as_ref().and_then(Option::as_deref))
            .bind(input.is_active)
            .bind(input.rank.is_some())
            .fetch_optional(pool)
            .await
    }

    /// Return which of `ids` exist, ascending.
    pub async fn find_existing_ids<'e>(
        executor: impl PgExecutor<'e>,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM officers WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(executor)
            .await
    }
}
