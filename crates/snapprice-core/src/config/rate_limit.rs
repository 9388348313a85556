//! Rate limiter configuration.

use serde::{Deserialize, Serialize};

/// Limits applied to login attempts and to the API as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window shared by both login limiters, in seconds.
    #[serde(default = "default_login_window")]
    pub login_window_seconds: u64,
    /// Login attempts per client IP per window.
    #[serde(default = "default_login_max_per_ip")]
    pub login_max_per_ip: u32,
    /// Login attempts per username+IP per window.
    #[serde(default = "default_login_max_per_user")]
    pub login_max_per_user: u32,
    /// Window of the general API limiter, in seconds.
    #[serde(default = "default_api_window")]
    pub api_window_seconds: u64,
    /// Requests per client IP per API window.
    #[serde(default = "default_api_max")]
    pub api_max: u32,
    /// Lower bound on the expired-counter sweep interval, in seconds.
    #[serde(default = "default_sweep_min_interval")]
    pub sweep_min_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_window_seconds: default_login_window(),
            login_max_per_ip: default_login_max_per_ip(),
            login_max_per_user: default_login_max_per_user(),
            api_window_seconds: default_api_window(),
            api_max: default_api_max(),
            sweep_min_interval_seconds: default_sweep_min_interval(),
        }
    }
}

fn default_login_window() -> u64 {
    10 * 60
}

fn default_login_max_per_ip() -> u32 {
    30
}

fn default_login_max_per_user() -> u32 {
    15
}

fn default_api_window() -> u64 {
    60
}

fn default_api_max() -> u32 {
    120
}

fn default_sweep_min_interval() -> u64 {
    10
}
