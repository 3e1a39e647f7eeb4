use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upkeep_api::background;
use upkeep_api::config::{ServerConfig, StorageBackend};
use upkeep_api::router::build_app_router;
use upkeep_api::state::AppState;
use upkeep_db::Store;
use upkeep_events::EventBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upkeep_api=debug,upkeep_pm=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = config.storage.name(),
        "Loaded server configuration"
    );

    // --- Storage ---
    let store = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            let pool = upkeep_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            upkeep_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            upkeep_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Store::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; state will be lost on shutdown");
            Store::memory()
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Log every maintenance event; actual delivery transports subscribe the
    // same way.
    let mut event_rx = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            tracing::info!(
                event_type = %event.event_type,
                schedule_id = event.schedule_id,
                equipment_id = event.equipment_id,
                "Maintenance event emitted"
            );
        }
    });

    // --- Background sweeps ---
    let sweep_cancel = CancellationToken::new();
    tokio::spawn(background::overdue_sweep::run(
        store.clone(),
        config.overdue_sweep_interval_secs,
        sweep_cancel.clone(),
    ));
    tokio::spawn(background::notification_sweep::run(
        store.clone(),
        Arc::clone(&event_bus),
        config.notification_sweep_interval_secs,
        sweep_cancel.clone(),
    ));
    tracing::info!("Background sweeps started (overdue, notifications)");

    // --- App state & router ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        events: Arc::clone(&event_bus),
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Upkeep API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_cancel))
        .await
        .expect("Server error");
}

/// Resolve on Ctrl-C / SIGTERM, cancelling the background sweeps first.
async fn shutdown_signal(sweep_cancel: CancellationToken) {
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    sweep_cancel.cancel();
}
