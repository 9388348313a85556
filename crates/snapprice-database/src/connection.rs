//! SQLite connection pool management.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use snapprice_core::config::DatabaseConfig;
use snapprice_core::error::AppError;

/// Wrapper around the sqlx SQLite connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    /// The underlying sqlx connection pool.
    pool: SqlitePool,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    ///
    /// File databases are created if missing and run in WAL mode. A private
    /// in-memory database lives only as long as its connection, so it is
    /// pinned to a single connection that is never recycled.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let memory = config.is_memory();
        info!(url = %config.url, memory, "Opening SQLite database");

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::store(format!("Invalid database URL: {e}"), e))?
            .create_if_missing(true)
            .foreign_keys(true);
        if !memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
            if let Some(dir) = options.get_filename().parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|e| {
                    AppError::store(format!("Failed to create {}: {e}", dir.display()), e)
                })?;
            }
        }

        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds));
        pool_options = if memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::store(format!("Failed to open database: {e}"), e))?;

        info!("Successfully opened SQLite database");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::store("Health check failed", e))
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
