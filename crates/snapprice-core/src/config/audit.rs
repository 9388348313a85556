//! Audit trail retention configuration.

use serde::{Deserialize, Serialize};

/// Retention caps for the audit log. A cap of `0` disables it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Maximum number of rows kept; oldest rows are purged first.
    #[serde(default = "default_max_rows")]
    pub max_rows: u64,
    /// Maximum entry age in days.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,
    /// Run a purge pass after every N-th write.
    #[serde(default = "default_purge_every")]
    pub purge_every: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            max_age_days: default_max_age_days(),
            purge_every: default_purge_every(),
        }
    }
}

fn default_max_rows() -> u64 {
    20_000
}

fn default_max_age_days() -> u64 {
    90
}

fn default_purge_every() -> u64 {
    25
}
