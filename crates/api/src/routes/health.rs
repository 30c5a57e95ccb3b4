//! Liveness report for the scheduling service.
//!
//! Mounted at the root, outside `/api/v1`. The service is `degraded` when
//! shifts can no longer be written (database unreachable) or when officers
//! would silently miss notifications (worker gone).

use axum::extract::State;
use axum::{routing::get, Json, Router};
use civicwatch_events::NotificationQueue;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub notifications: QueueHealth,
}

/// Snapshot of the officer notification queue.
#[derive(Serialize)]
pub struct QueueHealth {
    /// `false` once the worker has stopped consuming.
    pub accepting: bool,
    pub pending: usize,
    pub capacity: usize,
}

impl QueueHealth {
    fn of(queue: &NotificationQueue) -> Self {
        Self {
            accepting: !queue.is_closed(),
            pending: queue.pending(),
            capacity: queue.capacity(),
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = civicwatch_db::health_check(&state.pool).await.is_ok();
    let notifications = QueueHealth::of(&state.notifications);

    if !notifications.accepting {
        tracing::warn!("Health check: notification worker is not consuming");
    }

    Json(HealthResponse {
        status: if db_healthy && notifications.accepting {
            "ok"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        notifications,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
