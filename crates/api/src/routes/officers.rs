//! Route definitions for the `/officers` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::officers;
use crate::state::AppState;

/// Routes mounted at `/officers`.
///
/// ```text
/// GET    /                                      -> list_officers
/// POST   /                                      -> create_officer
/// GET    /{id}                                  -> get_officer
/// PUT    /{id}                                  -> update_officer
/// GET    /{id}/shifts                           -> list_officer_shifts
/// GET    /{id}/notifications                    -> list_notifications
/// POST   /{id}/notifications/{notification_id}/read -> mark_notification_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(officers::list_officers).post(officers::create_officer),
        )
        .route(
            "/{id}",
            get(officers::get_officer).put(officers::update_officer),
        )
        .route("/{id}/shifts", get(officers::list_officer_shifts))
        .route("/{id}/notifications", get(officers::list_notifications))
        .route(
            "/{id}/notifications/{notification_id}/read",
            post(officers::mark_notification_read),
        )
}
