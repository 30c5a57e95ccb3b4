pub mod health;
pub mod officers;
pub mod shifts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /officers                                        list, create
/// /officers/{id}                                   get, update
/// /officers/{id}/shifts                            assigned shifts
/// /officers/{id}/notifications                     notifications
/// /officers/{id}/notifications/{notification_id}/read   mark read
///
/// /shifts                                          list, create
/// /shifts/validate                                 dry-run validation
/// /shifts/{id}                                     get, update, delete
/// /shifts/{id}/status                              lifecycle transition
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/officers", officers::router())
        .nest("/shifts", shifts::router())
}
