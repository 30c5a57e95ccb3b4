#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tower::ServiceExt;

use civicwatch_api::config::ServerConfig;
use civicwatch_api::router::build_app_router;
use civicwatch_api::state::AppState;
use civicwatch_core::scheduling::SchedulingPolicy;
use civicwatch_core::types::{DbId, Timestamp};
use civicwatch_db::models::officer::CreateOfficer;
use civicwatch_db::repositories::OfficerRepo;
use civicwatch_events::{NotificationQueue, NotificationTask};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        notification_queue_capacity: 64,
        scheduling: SchedulingPolicy::default(),
    }
}

/// Build the full application router plus the receiving end of its
/// notification queue, so tests can assert on queued tasks.
pub fn build_test_app_with_queue(pool: PgPool) -> (Router, mpsc::Receiver<NotificationTask>) {
    let config = test_config();
    let (notifications, receiver) = NotificationQueue::new(config.notification_queue_capacity);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifications,
    };

    (build_app_router(state, &config), receiver)
}

/// Build the full application router with the production middleware stack.
///
/// The notification receiver is dropped, so queued tasks are discarded.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_queue(pool).0
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// `hour:00` UTC two days from now, so validation never sees a past start.
pub fn at(hour: u32) -> Timestamp {
    (Utc::now() + Duration::days(2))
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_utc()
}

pub async fn new_officer(pool: &PgPool, badge: &str) -> DbId {
    OfficerRepo::create(
        pool,
        &CreateOfficer {
            badge_number: badge.to_string(),
            full_name: format!("Officer {badge}"),
            rank: Some("Sergeant".to_string()),
        },
    )
    .await
    .unwrap()
    .id
}

pub fn shift_body(start: Timestamp, end: Timestamp, officers: &[DbId]) -> serde_json::Value {
    serde_json::json!({
        "start_time": start.to_rfc3339(),
        "end_time": end.to_rfc3339(),
        "officer_ids": officers,
        "location": "Precinct 4",
    })
}
