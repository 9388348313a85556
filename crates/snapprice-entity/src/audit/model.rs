//! Audit log entry entity model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::user::User;

/// An immutable audit log entry recording a security-relevant action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Monotonic row id; newest entries have the highest id.
    pub id: i64,
    /// When the action occurred, unix seconds.
    pub ts: i64,
    /// Acting user id, absent for anonymous actions.
    pub actor_user_id: Option<i64>,
    /// Acting username. Set for failed logins with an unknown username too.
    pub actor_username: Option<String>,
    /// Acting user's role at the time.
    pub actor_role: Option<String>,
    /// Dotted action name (e.g. `"auth.login"`).
    pub action: String,
    /// Type of the affected entity.
    pub entity_type: Option<String>,
    /// Id of the affected entity.
    pub entity_id: Option<String>,
    /// Client IP address.
    pub ip: Option<String>,
    /// Client User-Agent.
    pub user_agent: Option<String>,
    /// Whether the action succeeded.
    pub success: bool,
    /// Structured detail payload.
    #[sqlx(rename = "details_json")]
    pub details: Json<Value>,
}

/// An audit entry about to be written.
///
/// Built fluently at the call site:
///
/// ```
/// # use snapprice_entity::audit::NewAuditEntry;
/// let entry = NewAuditEntry::new("auth.login")
///     .actor_username("alice")
///     .failed()
///     .detail("reason", "invalid_credentials");
/// assert!(!entry.success);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditEntry {
    /// Acting user id.
    pub actor_user_id: Option<i64>,
    /// Acting username.
    pub actor_username: Option<String>,
    /// Acting role.
    pub actor_role: Option<String>,
    /// Dotted action name.
    pub action: String,
    /// Affected entity type.
    pub entity_type: Option<String>,
    /// Affected entity id.
    pub entity_id: Option<String>,
    /// Client IP.
    pub ip: Option<String>,
    /// Client User-Agent.
    pub user_agent: Option<String>,
    /// Outcome.
    pub success: bool,
    /// Detail object.
    pub details: Map<String, Value>,
}

impl NewAuditEntry {
    /// Start a successful, anonymous entry for `action`.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            actor_user_id: None,
            actor_username: None,
            actor_role: None,
            action: action.into(),
            entity_type: None,
            entity_id: None,
            ip: None,
            user_agent: None,
            success: true,
            details: Map::new(),
        }
    }

    /// Attribute the entry to `user`.
    pub fn actor(mut self, user: &User) -> Self {
        self.actor_user_id = Some(user.id);
        self.actor_username = Some(user.username.clone());
        self.actor_role = Some(user.role.as_str().to_string());
        self
    }

    /// Record only a claimed username (no resolved account).
    pub fn actor_username(mut self, username: impl Into<String>) -> Self {
        self.actor_username = Some(username.into());
        self
    }

    /// Set the affected entity.
    pub fn entity(mut self, entity_type: impl Into<String>, entity_id: impl ToString) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.to_string());
        self
    }

    /// Set client details.
    pub fn client(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.ip = ip;
        self.user_agent = user_agent;
        self
    }

    /// Mark the entry as a failure.
    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }

    /// Set the outcome explicitly.
    pub fn success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Add a detail field.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}
