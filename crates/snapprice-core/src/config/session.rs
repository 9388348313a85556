//! Session cookie configuration.

use serde::{Deserialize, Serialize};

/// Session cookie and lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie lifetime in hours; the store derives record expiry from it.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    /// Mark the cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_hours: default_max_age_hours(),
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    /// Cookie lifetime in milliseconds.
    pub fn max_age_millis(&self) -> i64 {
        (self.max_age_hours as i64) * 60 * 60 * 1000
    }
}

fn default_cookie_name() -> String {
    "snapprice.sid".to_string()
}

fn default_max_age_hours() -> u64 {
    7 * 24
}
