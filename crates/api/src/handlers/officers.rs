//! Handlers for the `/officers` resource and its nested shift and
//! notification views.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use civicwatch_core::error::CoreError;
use civicwatch_core::roster;
use civicwatch_core::types::DbId;
use civicwatch_db::models::notification::OfficerNotification;
use civicwatch_db::models::officer::{CreateOfficer, Officer, UpdateOfficer};
use civicwatch_db::models::shift::Shift;
use civicwatch_db::repositories::{NotificationRepo, OfficerRepo, ShiftRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /officers/{id}/notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/officers
pub async fn create_officer(
    State(state): State<AppState>,
    Json(input): Json<CreateOfficer>,
) -> AppResult<(StatusCode, Json<DataResponse<Officer>>)> {
    roster::validate_badge_number(&input.badge_number)?;
    roster::validate_full_name(&input.full_name)?;

    let officer = OfficerRepo::create(&state.pool, &input).await?;
    tracing::info!(
        officer_id = officer.id,
        badge_number = %officer.badge_number,
        "Officer created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: officer })))
}

/// GET /api/v1/officers
pub async fn list_officers(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Officer>>>> {
    let officers = OfficerRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: officers }))
}

/// GET /api/v1/officers/{id}
pub async fn get_officer(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Officer>>> {
    let officer = find_officer(&state, id).await?;
    Ok(Json(DataResponse { data: officer }))
}

/// PUT /api/v1/officers/{id}
pub async fn update_officer(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOfficer>,
) -> AppResult<Json<DataResponse<Officer>>> {
    if let Some(full_name) = &input.full_name {
        roster::validate_full_name(full_name)?;
    }

    let officer = OfficerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Officer",
            id,
        }))?;

    tracing::info!(officer_id = id, is_active = officer.is_active, "Officer updated");
    Ok(Json(DataResponse { data: officer }))
}

/// GET /api/v1/officers/{id}/shifts
pub async fn list_officer_shifts(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Shift>>>> {
    find_officer(&state, id).await?;
    let shifts = ShiftRepo::list_for_officer(&state.pool, id).await?;
    Ok(Json(DataResponse { data: shifts }))
}

/// GET /api/v1/officers/{id}/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<DataResponse<Vec<OfficerNotification>>>> {
    find_officer(&state, id).await?;

    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let notifications = NotificationRepo::list_for_officer(
        &state.pool,
        id,
        params.unread_only.unwrap_or(false),
        page.limit(),
        page.offset(),
    )
    .await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// POST /api/v1/officers/{id}/notifications/{notification_id}/read
///
/// Returns 204 on success, or 404 if the notification does not belong to
/// the officer or was already read.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path((id, notification_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let found = NotificationRepo::mark_read(&state.pool, notification_id, id).await?;

    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn find_officer(state: &AppState, id: DbId) -> AppResult<Officer> {
    OfficerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Officer",
            id,
        }))
}
