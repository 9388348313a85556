//! Persisted session payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::{User, UserRole};

/// Record lifetime used when the cookie declares neither `expires` nor a max age.
pub const DEFAULT_SESSION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Cookie metadata persisted alongside the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieMeta {
    /// Cookie lifetime in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_max_age: Option<i64>,
    /// Absolute cookie expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

/// The serialized state behind a session id.
///
/// An anonymous session only carries a CSRF token. Logging in binds a user
/// and caches the authorization fingerprint (`user_role`, `user_updated_at`)
/// the lifecycle guard compares against the live user row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// Cookie metadata.
    #[serde(default)]
    pub cookie: CookieMeta,
    /// Bound user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Role cached at binding time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<UserRole>,
    /// User `updated_at` cached at binding time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_updated_at: Option<i64>,
    /// Anti-forgery token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

impl SessionPayload {
    /// A fresh anonymous session whose cookie lives for `max_age_ms`.
    pub fn new(max_age_ms: i64, now: DateTime<Utc>) -> Self {
        let mut payload = Self {
            cookie: CookieMeta {
                original_max_age: Some(max_age_ms),
                expires: None,
            },
            ..Default::default()
        };
        payload.refresh_expiry(now);
        payload
    }

    /// Resolve the absolute record expiry in unix milliseconds.
    ///
    /// Prefers the cookie's `expires`, then `now + max age`, then the
    /// seven-day default.
    pub fn expiry_millis(&self, now_ms: i64) -> i64 {
        if let Some(expires) = self.cookie.expires {
            return expires.timestamp_millis();
        }
        match self.cookie.original_max_age {
            Some(max_age) => now_ms + max_age,
            None => now_ms + DEFAULT_SESSION_TTL_MS,
        }
    }

    /// Slide the cookie expiry forward from `now`.
    pub fn refresh_expiry(&mut self, now: DateTime<Utc>) {
        if let Some(max_age) = self.cookie.original_max_age {
            self.cookie.expires = Some(now + chrono::Duration::milliseconds(max_age));
        }
    }

    /// Bind the session to `user`, caching its authorization fingerprint.
    pub fn bind_user(&mut self, user: &User) {
        self.user_id = Some(user.id);
        self.user_role = Some(user.role);
        self.user_updated_at = Some(user.updated_at);
    }
}
