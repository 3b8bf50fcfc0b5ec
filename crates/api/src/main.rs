use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use overlay_db::{MemoryRowStore, PgRowStore, RowStore};
use overlay_events::RealtimeHub;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use overlay_api::config::{ServerConfig, StoreBackend};
use overlay_api::router::build_app_router;
use overlay_api::state::AppState;
use overlay_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "overlay_api=debug,overlay_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = ?config.store_backend,
        "Loaded server configuration",
    );

    let cancel = CancellationToken::new();

    // --- Row store and change feed ---
    let (store, feed_handle): (Arc<dyn RowStore>, Option<JoinHandle<()>>) =
        match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .expect("DATABASE_URL must be set for the postgres backend");

                let pool = overlay_db::create_pool(database_url)
                    .await
                    .expect("Failed to connect to database");
                tracing::info!("Database connection pool created");

                overlay_db::health_check(&pool)
                    .await
                    .expect("Database health check failed");
                tracing::info!("Database health check passed");

                overlay_db::run_migrations(&pool)
                    .await
                    .expect("Failed to run database migrations");
                tracing::info!("Database migrations applied");

                let pg = PgRowStore::new(pool);
                let handle = pg.spawn_change_feed(cancel.child_token());
                tracing::info!("Change feed listener started");
                let store: Arc<dyn RowStore> = Arc::new(pg);
                (store, Some(handle))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory row store; settings are not persisted");
                let store: Arc<dyn RowStore> = Arc::new(MemoryRowStore::new());
                (store, None)
            }
        };

    // --- Realtime hub ---
    let hub = Arc::new(RealtimeHub::new());
    let hub_handle = {
        let hub = Arc::clone(&hub);
        let feed = store.subscribe_changes();
        let cancel = cancel.child_token();
        tokio::spawn(async move { hub.run(feed, cancel).await })
    };
    tracing::info!("Realtime hub started");

    // --- App state ---
    let state = AppState::new(store, hub, config.clone());
    let ws_manager = Arc::clone(&state.ws_manager);

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(
        Arc::clone(&ws_manager),
        Duration::from_secs(config.heartbeat_interval_secs),
        cancel.child_token(),
    );

    // --- Router ---
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

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    let _ = tokio::time::timeout(grace, hub_handle).await;
    if let Some(handle) = feed_handle {
        let _ = tokio::time::timeout(grace, handle).await;
    }
    tracing::info!("Realtime services shut down");

    let _ = tokio::time::timeout(grace, heartbeat_handle).await;
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
