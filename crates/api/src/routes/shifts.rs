//! Route definitions for the `/shifts` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::shifts;
use crate::state::AppState;

/// Routes mounted at `/shifts`.
///
/// ```text
/// GET    /               -> list_shifts
/// POST   /               -> create_shift
/// POST   /validate       -> validate_shift
/// GET    /{id}           -> get_shift
/// PUT    /{id}           -> update_shift
/// DELETE /{id}           -> delete_shift
/// PUT    /{id}/status    -> update_shift_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(shifts::list_shifts).post(shifts::create_shift))
        .route("/validate", post(shifts::validate_shift))
        .route(
            "/{id}",
            get(shifts::get_shift)
                .put(shifts::update_shift)
                .delete(shifts::delete_shift),
        )
        .route("/{id}/status", put(shifts::update_shift_status))
}
