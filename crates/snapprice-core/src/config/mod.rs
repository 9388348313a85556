//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so a partial file is valid.

pub mod app;
pub mod audit;
pub mod database;
pub mod logging;
pub mod rate_limit;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::{BootstrapConfig, ServerConfig};
pub use self::audit::AuditConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::rate_limit::RateLimitConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Session cookie and lifetime settings.
    pub session: SessionConfig,
    /// Rate limiter settings.
    pub rate_limit: RateLimitConfig,
    /// Audit trail retention settings.
    pub audit: AuditConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// First-run admin account.
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SNAPPRICE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SNAPPRICE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
