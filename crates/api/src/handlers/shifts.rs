//! Handlers for the `/shifts` resource.
//!
//! Creates and updates run inside one transaction: per-officer advisory
//! locks are taken first, then the shift conflict validator runs on that
//! transaction's connection, then the write. A concurrent request touching
//! any of the same officers waits on the locks and validates against the
//! committed result. Status changes lock the shift row before checking the
//! transition.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use civicwatch_core::error::CoreError;
use civicwatch_core::roster;
use civicwatch_core::scheduling::{
    ProposedShift, ScheduleError, ShiftConflictValidator, ShiftWindow,
};
use civicwatch_core::shift_lifecycle;
use civicwatch_core::types::{DbId, Timestamp};
use civicwatch_db::lookup::PgTxLookups;
use civicwatch_db::models::shift::{CreateShift, Shift};
use civicwatch_db::models::status::{ShiftStatus, StatusId};
use civicwatch_db::repositories::ShiftRepo;
use civicwatch_events::{NotificationKind, NotificationTask};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /shifts` and `PUT /shifts/{id}`.
///
/// Times are optional here so a missing bound is reported by the validator
/// like every other rejection.
#[derive(Debug, Deserialize)]
pub struct ShiftInput {
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    #[serde(default)]
    pub officer_ids: Vec<DbId>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl ShiftInput {
    fn proposal(&self, id: Option<DbId>) -> ProposedShift {
        ProposedShift {
            id,
            start_time: self.start_time,
            end_time: self.end_time,
            officer_ids: self.officer_ids.iter().copied().collect(),
        }
    }

    fn into_record(self, window: ShiftWindow, officer_ids: &BTreeSet<DbId>) -> CreateShift {
        CreateShift {
            start_time: window.start,
            end_time: window.end,
            officer_ids: officer_ids.iter().copied().collect(),
            location: self.location,
            notes: self.notes,
        }
    }
}

/// Body for `POST /shifts/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateShiftRequest {
    /// Set when checking an edit to an existing shift.
    pub id: Option<DbId>,
    #[serde(flatten)]
    pub shift: ShiftInput,
}

/// Result of a dry-run validation.
#[derive(Debug, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query parameters for `GET /shifts`.
#[derive(Debug, Deserialize)]
pub struct ShiftListQuery {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Body for `PUT /shifts/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateShiftStatus {
    pub status_id: StatusId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/shifts
///
/// Validate and create a shift, then notify its officers.
pub async fn create_shift(
    State(state): State<AppState>,
    Json(input): Json<ShiftInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Shift>>)> {
    roster::validate_location(input.location.as_deref())?;
    let proposal = input.proposal(None);

    let mut tx = state.pool.begin().await?;
    ShiftRepo::lock_officers(&mut tx, &sorted_ids(&proposal.officer_ids)).await?;
    let window = validate_locked(&state, &mut tx, &proposal).await?;
    let shift = ShiftRepo::create(&mut tx, &input.into_record(window, &proposal.officer_ids))
        .await?;
    tx.commit().await?;

    tracing::info!(
        shift_id = shift.id,
        officers = ?shift.officer_ids,
        start = %shift.start_time,
        end = %shift.end_time,
        "Shift created"
    );
    state.notify(task(
        NotificationKind::ShiftAssigned,
        &shift,
        shift.officer_ids.clone(),
    ));

    Ok((StatusCode::CREATED, Json(DataResponse { data: shift })))
}

/// POST /api/v1/shifts/validate
///
/// Run the conflict validator without writing. A rejection is reported in
/// the body with 200; only a failed lookup is an error response.
pub async fn validate_shift(
    State(state): State<AppState>,
    Json(input): Json<ValidateShiftRequest>,
) -> AppResult<Json<DataResponse<ValidationOutcome>>> {
    let proposal = input.shift.proposal(input.id);

    let outcome = match state.shift_validator().validate(&proposal).await {
        Ok(_) => ValidationOutcome {
            valid: true,
            reason: None,
            error: None,
        },
        Err(ScheduleError::Rejected(rejection)) => ValidationOutcome {
            valid: false,
            reason: Some(rejection.reason()),
            error: Some(rejection.to_string()),
        },
        Err(e @ ScheduleError::Lookup(_)) => return Err(e.into()),
    };

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/shifts
///
/// List shifts intersecting the optional `[from, to)` window.
pub async fn list_shifts(
    State(state): State<AppState>,
    Query(params): Query<ShiftListQuery>,
) -> AppResult<Json<DataResponse<Vec<Shift>>>> {
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from >= to {
            return Err(AppError::BadRequest(
                "'from' must be before 'to'".to_string(),
            ));
        }
    }

    let shifts = ShiftRepo::list(&state.pool, params.from, params.to).await?;
    Ok(Json(DataResponse { data: shifts }))
}

/// GET /api/v1/shifts/{id}
pub async fn get_shift(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Shift>>> {
    let shift = find_shift(&state, id).await?;
    Ok(Json(DataResponse { data: shift }))
}

/// PUT /api/v1/shifts/{id}
///
/// Replace a shift's window, officers, and details. Only Pending and
/// Approved shifts can be edited. Officers on either the old or the new
/// roster are notified.
pub async fn update_shift(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ShiftInput>,
) -> AppResult<Json<DataResponse<Shift>>> {
    roster::validate_location(input.location.as_deref())?;
    let proposal = input.proposal(Some(id));

    let mut tx = state.pool.begin().await?;
    let status_id = ShiftRepo::lock_status(&mut tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Shift", id }))?;
    ensure_editable(id, status_id)?;
    let previous = ShiftRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Shift", id }))?;

    ShiftRepo::lock_officers(&mut tx, &sorted_ids(&proposal.officer_ids)).await?;
    let window = validate_locked(&state, &mut tx, &proposal).await?;
    let shift = ShiftRepo::update(&mut tx, id, &input.into_record(window, &proposal.officer_ids))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Shift", id }))?;
    tx.commit().await?;

    tracing::info!(
        shift_id = id,
        officers = ?shift.officer_ids,
        start = %shift.start_time,
        end = %shift.end_time,
        "Shift updated"
    );

    let recipients: BTreeSet<DbId> = previous
        .officer_ids
        .iter()
        .chain(&shift.officer_ids)
        .copied()
        .collect();
    state.notify(task(
        NotificationKind::ShiftUpdated,
        &shift,
        recipients.into_iter().collect(),
    ));

    Ok(Json(DataResponse { data: shift }))
}

/// PUT /api/v1/shifts/{id}/status
///
/// Move a shift through its lifecycle. Cancelling notifies its officers.
pub async fn update_shift_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateShiftStatus>,
) -> AppResult<Json<DataResponse<Shift>>> {
    let target = ShiftStatus::from_id(input.status_id).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown shift status id: {}", input.status_id))
    })?;

    let mut tx = state.pool.begin().await?;
    let from = ShiftRepo::lock_status(&mut tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Shift", id }))?;
    shift_lifecycle::validate_transition(from, target.id())?;

    let shift = ShiftRepo::set_status(&mut tx, id, target.id())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Shift", id }))?;
    tx.commit().await?;

    tracing::info!(
        shift_id = id,
        from = shift_lifecycle::status_name(from),
        to = shift_lifecycle::status_name(shift.status_id),
        "Shift status changed"
    );

    if target == ShiftStatus::Cancelled {
        state.notify(task(
            NotificationKind::ShiftCancelled,
            &shift,
            shift.officer_ids.clone(),
        ));
    }

    Ok(Json(DataResponse { data: shift }))
}

/// DELETE /api/v1/shifts/{id}
pub async fn delete_shift(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ShiftRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Shift", id }));
    }

    tracing::info!(shift_id = id, "Shift deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_shift(state: &AppState, id: DbId) -> AppResult<Shift> {
    ShiftRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Shift", id }))
}

/// Run the validator on `tx`'s connection, logging rejections with their
/// reason code.
async fn validate_locked(
    state: &AppState,
    tx: &mut Transaction<'_, Postgres>,
    proposal: &ProposedShift,
) -> AppResult<ShiftWindow> {
    let lookups = PgTxLookups::new(&mut **tx);
    let validator = ShiftConflictValidator::new(&lookups, &lookups, state.config.scheduling);
    let result = validator.validate(proposal).await;
    result.map_err(|e| {
        if let ScheduleError::Rejected(rejection) = &e {
            tracing::info!(
                shift_id = ?proposal.id,
                reason = rejection.reason(),
                error = %rejection,
                "Shift rejected"
            );
        }
        AppError::from(e)
    })
}

fn ensure_editable(id: DbId, status_id: StatusId) -> AppResult<()> {
    if shift_lifecycle::is_editable(status_id) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Conflict(format!(
            "Shift {id} is {} and can no longer be edited",
            shift_lifecycle::status_name(status_id)
        ))))
    }
}

fn sorted_ids(ids: &BTreeSet<DbId>) -> Vec<DbId> {
    ids.iter().copied().collect()
}

fn task(kind: NotificationKind, shift: &Shift, officer_ids: Vec<DbId>) -> NotificationTask {
    NotificationTask {
        kind,
        shift_id: shift.id,
        officer_ids,
        start_time: shift.start_time,
        end_time: shift.end_time,
        location: shift.location.clone(),
    }
}
