use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use civicwatch_api::config::{self, ServerConfig};
use civicwatch_api::router::build_app_router;
use civicwatch_api::state::AppState;
use civicwatch_events::{DbNotificationSink, NotificationQueue, NotificationWorker};

/// How long the notification worker gets to drain after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "civicwatch_api=debug,civicwatch_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(
        host = %config.host,
        port = %config.port,
        max_shift_duration = %config.scheduling.max_shift_duration,
        min_rest_period = %config.scheduling.min_rest_period,
        max_shifts_per_day = config.scheduling.max_shifts_per_day,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = config::database_url().expect("DATABASE_URL must be set");

    let pool = civicwatch_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    civicwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    civicwatch_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Notification worker ---
    let (notifications, receiver) = NotificationQueue::new(config.notification_queue_capacity);
    let worker_cancel = CancellationToken::new();
    let worker = NotificationWorker::new(DbNotificationSink::new(pool.clone()));
    let worker_handle = tokio::spawn(worker.run(receiver, worker_cancel.clone()));
    tracing::info!(
        capacity = config.notification_queue_capacity,
        "Notification worker started"
    );

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifications,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let graceful = shutdown.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { graceful.cancelled().await })
        .into_future();

    let drain_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    tokio::select! {
        result = server => result.expect("Server error"),
        () = async {
            shutdown.cancelled().await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "In-flight requests did not drain in time, forcing shutdown"
            );
        }
    }

    // --- Post-shutdown cleanup ---
    // The router (and every queue sender it held) is gone, so the worker
    // drains what is left and exits on its own.
    tracing::info!("Server stopped accepting connections, draining notifications");
    if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker_handle)
        .await
        .is_err()
    {
        tracing::warn!("Notification worker did not drain in time, cancelling");
        worker_cancel.cancel();
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
