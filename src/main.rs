//! SnapPrice Server
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use snapprice_api::AppState;
use snapprice_core::config::AppConfig;
use snapprice_core::error::AppError;
use snapprice_core::SystemClock;
use snapprice_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `SNAPPRICE_ENV` overlay and `SNAPPRICE__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SNAPPRICE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting SnapPrice");

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!(url = %config.database.url, "Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    snapprice_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Wire the security pipeline ───────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, db.clone(), Arc::new(SystemClock));

    // ── Step 3: First-run admin ──────────────────────────────────
    snapprice_api::bootstrap::ensure_admin(&state).await?;

    // ── Step 4: Background housekeeping ──────────────────────────
    let sweepers = state.spawn_housekeeping();
    tracing::info!(count = sweepers.len(), "Rate limiter sweepers started");

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app = snapprice_api::build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "SnapPrice server listening");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    for sweeper in sweepers {
        sweeper.abort();
    }
    db.close().await;

    tracing::info!("SnapPrice server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
