//! HTTP-level integration tests for the `/shifts` endpoints.
//!
//! Cover the validator's rejections as seen over HTTP, lifecycle
//! transitions, and the notification tasks each write enqueues.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use civicwatch_events::NotificationKind;
use common::{
    at, body_json, build_test_app, build_test_app_with_queue, delete, get, new_officer,
    post_json, put_json, shift_body,
};
use civicwatch_db::models::status::ShiftStatus;
use civicwatch_db::repositories::ShiftRepo;
use serde_json::json;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Create a shift over HTTP and return its id.
async fn create(app: &axum::Router, body: serde_json::Value) -> i64 {
    let response = post_json(app.clone(), "/api/v1/shifts", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_shift_returns_201_and_queues_assignment(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let b = new_officer(&pool, "PD-2").await;
    let (app, mut queue) = build_test_app_with_queue(pool);

    let response = post_json(app, "/api/v1/shifts", shift_body(at(9), at(17), &[b, a])).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["officer_ids"], json!([a, b]));
    assert_eq!(json["data"]["status_id"], 1);
    assert_eq!(json["data"]["location"], "Precinct 4");

    let task = queue.try_recv().expect("a notification task should be queued");
    assert_eq!(task.kind, NotificationKind::ShiftAssigned);
    assert_eq!(task.officer_ids, vec![a, b]);
    assert_eq!(task.shift_id, json["data"]["id"].as_i64().unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_end_time_returns_400(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/shifts",
        json!({ "start_time": at(9).to_rfc3339(), "officer_ids": [a] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["reason"], "missing_time_bounds");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn past_start_returns_400(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);

    let start = Utc::now() - Duration::hours(2);
    let response = post_json(
        app,
        "/api/v1/shifts",
        shift_body(start, start + Duration::hours(4), &[a]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["reason"], "starts_in_past");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn over_long_shift_returns_400(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/shifts",
        shift_body(at(6), at(6) + Duration::hours(13), &[a]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["reason"], "duration_exceeded");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_officer_returns_400_listing_it(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/shifts",
        shift_body(at(9), at(17), &[a, 777777]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["reason"], "officers_not_found");
    assert!(json["error"].as_str().unwrap().contains("777777"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_officer_list_returns_400(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(app, "/api/v1/shifts", shift_body(at(9), at(17), &[])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["reason"], "no_officers_assigned");
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn overlap_is_reported_before_rest(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);
    let existing = create(&app, shift_body(at(9), at(17), &[a])).await;

    // 16:00-20:00 overlaps the 09:00-17:00 shift.
    let response = post_json(
        app.clone(),
        "/api/v1/shifts",
        shift_body(at(16), at(20), &[a]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SCHEDULE_CONFLICT");
    assert_eq!(json["reason"], "overlap");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains(&existing.to_string()));

    // 17:00-21:00 is adjacent, so only the rest period is violated.
    let response = post_json(app, "/api/v1/shifts", shift_body(at(17), at(21), &[a])).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["reason"], "insufficient_rest");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rest_period_boundary_is_inclusive(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);
    create(&app, shift_body(at(0), at(4), &[a])).await;

    // Exactly eight hours after the previous shift ends.
    let response = post_json(app, "/api/v1/shifts", shift_body(at(12), at(16), &[a])).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_officers_are_unaffected(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let b = new_officer(&pool, "PD-2").await;
    let app = build_test_app(pool);
    create(&app, shift_body(at(9), at(17), &[a])).await;

    let response = post_json(app, "/api/v1/shifts", shift_body(at(9), at(17), &[b])).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Dry-run validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn validate_reports_outcome_without_writing(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);
    let existing = create(&app, shift_body(at(9), at(17), &[a])).await;

    let response = post_json(
        app.clone(),
        "/api/v1/shifts/validate",
        shift_body(at(10), at(12), &[a]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], false);
    assert_eq!(json["data"]["reason"], "overlap");

    // The same window is fine when checked as an edit of the existing shift.
    let mut body = shift_body(at(10), at(12), &[a]);
    body["id"] = json!(existing);
    let json = body_json(post_json(app.clone(), "/api/v1/shifts/validate", body).await).await;
    assert_eq!(json["data"], json!({ "valid": true }));

    let json = body_json(get(app, "/api/v1/shifts").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_excludes_itself_and_notifies_old_and_new_officers(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let b = new_officer(&pool, "PD-2").await;
    let (app, mut queue) = build_test_app_with_queue(pool);
    let id = create(&app, shift_body(at(9), at(17), &[a])).await;
    queue.try_recv().unwrap();

    let response = put_json(
        app,
        &format!("/api/v1/shifts/{id}"),
        shift_body(at(10), at(18), &[b]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["officer_ids"], json!([b]));

    let task = queue.try_recv().unwrap();
    assert_eq!(task.kind, NotificationKind::ShiftUpdated);
    assert_eq!(task.officer_ids, vec![a, b]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_of_unknown_shift_returns_404(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);

    let response = put_json(
        app,
        "/api/v1/shifts/999999",
        shift_body(at(9), at(17), &[a]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_shift_cannot_be_edited(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);
    let id = create(&app, shift_body(at(9), at(17), &[a])).await;

    put_json(
        app.clone(),
        &format!("/api/v1/shifts/{id}/status"),
        json!({ "status_id": 5 }),
    )
    .await;

    let response = put_json(
        app,
        &format!("/api/v1/shifts/{id}"),
        shift_body(at(10), at(18), &[a]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelling_frees_the_window_and_notifies(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let (app, mut queue) = build_test_app_with_queue(pool);
    let id = create(&app, shift_body(at(9), at(17), &[a])).await;
    queue.try_recv().unwrap();

    let response = put_json(
        app.clone(),
        &format!("/api/v1/shifts/{id}/status"),
        json!({ "status_id": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status_id"], 5);

    let task = queue.try_recv().unwrap();
    assert_eq!(task.kind, NotificationKind::ShiftCancelled);
    assert_eq!(task.officer_ids, vec![a]);

    create(&app, shift_body(at(10), at(16), &[a])).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_transition_returns_400(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);
    let id = create(&app, shift_body(at(9), at(17), &[a])).await;

    // Pending -> Completed skips Approved and Active.
    let response = put_json(
        app,
        &format!("/api/v1/shifts/{id}/status"),
        json!({ "status_id": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("Pending"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_status_returns_400(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);
    let id = create(&app, shift_body(at(9), at(17), &[a])).await;

    let response = put_json(
        app,
        &format!("/api/v1/shifts/{id}/status"),
        json!({ "status_id": 42 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Read / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_rejects_inverted_window(pool: PgPool) {
    let app = build_test_app(pool);
    let uri = format!(
        "/api/v1/shifts?from={}&to={}",
        at(12).format("%Y-%m-%dT%H:%M:%SZ"),
        at(10).format("%Y-%m-%dT%H:%M:%SZ"),
    );

    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_window(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let b = new_officer(&pool, "PD-2").await;
    let app = build_test_app(pool);
    create(&app, shift_body(at(1), at(3), &[a])).await;
    let late = create(&app, shift_body(at(12), at(14), &[b])).await;

    let uri = format!(
        "/api/v1/shifts?from={}",
        at(10).format("%Y-%m-%dT%H:%M:%SZ")
    );
    let json = body_json(get(app, &uri).await).await;
    let shifts = json["data"].as_array().unwrap();
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0]["id"], late);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_then_get_returns_404(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);
    let id = create(&app, shift_body(at(9), at(17), &[a])).await;
    let uri = format!("/api/v1/shifts/{id}");

    assert_eq!(
        delete(app.clone(), &uri).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(get(app.clone(), &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete(app, &uri).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn officer_shift_view_lists_assignments(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool);
    let id = create(&app, shift_body(at(9), at(17), &[a])).await;

    let json = body_json(get(app, &format!("/api/v1/officers/{a}/shifts")).await).await;
    let shifts = json["data"].as_array().unwrap();
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0]["id"], id);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_conflicting_creates_admit_exactly_one(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool.clone());

    // Every pair overlaps or leaves less than the default rest period.
    let windows = [(9, 17), (10, 16), (16, 20), (18, 22)];
    let handles: Vec<_> = windows
        .into_iter()
        .map(|(start, end)| {
            let app = app.clone();
            tokio::spawn(async move {
                post_json(app, "/api/v1/shifts", shift_body(at(start), at(end), &[a])).await
            })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        let response = handle.await.unwrap();
        match response.status() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => {
                assert_eq!(body_json(response).await["code"], "SCHEDULE_CONFLICT");
                conflicts += 1;
            }
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!((created, conflicts), (1, 3));
    assert_eq!(ShiftRepo::list_for_officer(&pool, a).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn writes_succeed_on_a_single_connection_pool(
    pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let pool = pool_options
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect_with(connect_options)
        .await
        .unwrap();
    let a = new_officer(&pool, "PD-1").await;
    let b = new_officer(&pool, "PD-2").await;
    let app = build_test_app(pool);

    let id = create(&app, shift_body(at(9), at(17), &[a])).await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/shifts/{id}"),
        shift_body(at(10), at(18), &[a, b]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json(
        app,
        &format!("/api/v1/shifts/{id}/status"),
        json!({ "status_id": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_change_waits_for_a_concurrent_cancel(pool: PgPool) {
    let a = new_officer(&pool, "PD-1").await;
    let app = build_test_app(pool.clone());
    let id = create(&app, shift_body(at(9), at(17), &[a])).await;

    // Cancel in a transaction that stays open while the approval arrives.
    let mut cancel = pool.begin().await.unwrap();
    ShiftRepo::lock_status(&mut cancel, id).await.unwrap();
    ShiftRepo::set_status(&mut cancel, id, ShiftStatus::Cancelled.id())
        .await
        .unwrap();

    let approve = tokio::spawn(async move {
        put_json(
            app,
            &format!("/api/v1/shifts/{id}/status"),
            json!({ "status_id": 2 }),
        )
        .await
    });
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    cancel.commit().await.unwrap();

    let response = approve.await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Cancelled"));

    let shift = ShiftRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(shift.status_id, ShiftStatus::Cancelled.id());
    let blocking: bool =
        sqlx::query_scalar("SELECT bool_or(is_blocking) FROM shift_assignments WHERE shift_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!blocking);
}
