//! Response DTOs.
//!
//! Success bodies carry `ok: true` alongside their payload.

use serde::{Deserialize, Serialize};

use snapprice_entity::audit::AuditLogEntry;
use snapprice_entity::user::{User, UserRole};

/// Bare acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    /// Always true.
    pub ok: bool,
}

impl OkResponse {
    /// `{ "ok": true }`
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Role.
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// A single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse<T> {
    /// Always true.
    pub ok: bool,
    /// The user.
    pub user: T,
}

impl<T> UserResponse<T> {
    /// Wrap a user payload.
    pub fn new(user: T) -> Self {
        Self { ok: true, user }
    }
}

/// All users (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    /// Always true.
    pub ok: bool,
    /// Users ordered by id.
    pub users: Vec<User>,
}

/// A page of audit entries, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogsResponse {
    /// Always true.
    pub ok: bool,
    /// Entries.
    pub logs: Vec<AuditLogEntry>,
}

/// The session's CSRF token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfResponse {
    /// Token to send back in the `X-CSRF-Token` header.
    pub csrf_token: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// `connected` or `unavailable`.
    pub database: String,
}
