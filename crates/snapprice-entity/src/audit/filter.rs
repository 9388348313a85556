//! Audit query filters.

use serde::{Deserialize, Serialize};

/// Optional predicates applied to an audit query. Unset fields match all rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Exact actor id.
    pub actor_user_id: Option<i64>,
    /// Actor username substring.
    pub actor_username: Option<String>,
    /// Exact actor role.
    pub actor_role: Option<String>,
    /// Action substring.
    pub action: Option<String>,
    /// Exact entity type.
    pub entity_type: Option<String>,
    /// Exact entity id.
    pub entity_id: Option<String>,
    /// Outcome.
    pub success: Option<bool>,
    /// Inclusive lower bound, unix seconds.
    pub since: Option<i64>,
    /// Inclusive upper bound, unix seconds.
    pub until: Option<i64>,
}

impl AuditFilter {
    /// Restrict to entries by one actor.
    pub fn for_actor(actor_user_id: i64) -> Self {
        Self {
            actor_user_id: Some(actor_user_id),
            ..Default::default()
        }
    }
}
