//! User entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A registered SnapPrice account.
///
/// `updated_at` doubles as the authorization fingerprint: every mutation of
/// the row bumps it, and sessions compare their cached copy against it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
    /// Disabled accounts cannot log in and lose any live session.
    pub disabled: bool,
    /// Creation time, unix milliseconds.
    pub created_at: i64,
    /// Last modification time, unix milliseconds.
    pub updated_at: i64,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        !self.disabled
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
}

/// A partial update of a user. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New role.
    pub role: Option<UserRole>,
    /// New disabled flag.
    pub disabled: Option<bool>,
    /// New pre-hashed password.
    pub password_hash: Option<String>,
}

impl UpdateUser {
    /// Whether applying this update to `user` would remove an enabled admin.
    pub fn removes_admin(&self, user: &User) -> bool {
        if !user.is_admin() || user.disabled {
            return false;
        }
        let demoted = self.role.is_some_and(|r| !r.is_admin());
        let disabled = self.disabled == Some(true);
        demoted || disabled
    }
}
