//! Session lifecycle manager: login and logout flows.

use std::sync::Arc;

use tracing::{info, warn};

use snapprice_core::error::AppError;
use snapprice_core::result::AppResult;
use snapprice_core::Clock;
use snapprice_entity::audit::NewAuditEntry;
use snapprice_entity::session::SessionPayload;
use snapprice_entity::user::User;

use crate::audit::AuditTrail;
use crate::context::RequestContext;
use crate::directory::UserDirectory;
use crate::password::PasswordHasher;

use super::store::SessionStore;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Credentials and intent submitted to the login endpoint.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    /// Submitted username, if any.
    pub username: Option<String>,
    /// Submitted password, if any.
    pub password: Option<String>,
    /// `"admin"` to enter the admin console; anything else means the app.
    pub login_as: Option<String>,
}

impl LoginRequest {
    fn wants_admin(&self) -> bool {
        self.login_as.as_deref() == Some("admin")
    }

    fn login_as_label(&self) -> &'static str {
        if self.wants_admin() { "admin" } else { "user" }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The authenticated user.
    pub user: User,
    /// The new session id.
    pub session_id: String,
}

/// Runs the login and logout flows.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    users: Arc<dyn UserDirectory>,
    hasher: PasswordHasher,
    audit: Arc<AuditTrail>,
    clock: Arc<dyn Clock>,
    session_max_age_ms: i64,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        store: Arc<dyn SessionStore>,
        users: Arc<dyn UserDirectory>,
        audit: Arc<AuditTrail>,
        clock: Arc<dyn Clock>,
        session_max_age_ms: i64,
    ) -> Self {
        Self {
            store,
            users,
            hasher: PasswordHasher::new(),
            audit,
            clock,
            session_max_age_ms,
        }
    }

    /// Performs the login flow:
    ///
    /// 1. Require both fields
    /// 2. Look up the account and reject disabled ones
    /// 3. Verify the password
    /// 4. Enforce `loginAs=admin`
    /// 5. Replace any prior session with a fresh id bound to the user
    ///
    /// Every outcome is audited as `auth.login`. No session is created on
    /// failure.
    pub async fn login(
        &self,
        request: &LoginRequest,
        prior_session: Option<&str>,
        ctx: &RequestContext,
    ) -> AppResult<LoginResult> {
        let login_as = request.login_as_label();
        let base = NewAuditEntry::new("auth.login")
            .client(ctx.ip.clone(), ctx.user_agent.clone())
            .detail("loginAs", login_as);

        let username = request
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let password = request.password.as_deref().filter(|p| !p.is_empty());
        let (Some(username), Some(password)) = (username, password) else {
            let mut entry = base.failed().detail("reason", "missing_username_or_password");
            if let Some(name) = username {
                entry = entry.actor_username(name);
            }
            self.audit.record(entry).await;
            return Err(AppError::validation("Missing username/password"));
        };

        let Some(user) = self.users.find_by_username(username).await? else {
            self.audit
                .record(
                    base.actor_username(username)
                        .failed()
                        .detail("reason", "invalid_credentials"),
                )
                .await;
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        };
        let base = base.actor(&user);

        if !user.can_login() {
            self.audit
                .record(base.failed().detail("reason", "account_disabled"))
                .await;
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        }

        if !self.hasher.verify_password(password, &user.password_hash)? {
            self.audit
                .record(base.failed().detail("reason", "invalid_credentials"))
                .await;
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
        }

        if request.wants_admin() && !user.is_admin() {
            self.audit
                .record(base.failed().detail("reason", "not_admin_account"))
                .await;
            return Err(AppError::forbidden("Not an admin account"));
        }

        let mut payload = SessionPayload::new(self.session_max_age_ms, self.clock.now());
        payload.bind_user(&user);
        payload.csrf_token = self.carry_csrf_token(prior_session).await;

        if let Some(prior) = prior_session {
            self.store.destroy(prior).await?;
        }
        let session_id = self.store.create(&payload).await?;

        self.audit.record(base).await;
        info!(user_id = user.id, role = %user.role, login_as, "Login successful");

        Ok(LoginResult { user, session_id })
    }

    /// Performs the logout flow: audit when a user was resolved, then
    /// destroy the session. A store failure is logged, not returned.
    pub async fn logout(&self, session_id: Option<&str>, user: Option<&User>, ctx: &RequestContext) {
        if let Some(user) = user {
            self.audit
                .record(
                    NewAuditEntry::new("auth.logout")
                        .actor(user)
                        .client(ctx.ip.clone(), ctx.user_agent.clone()),
                )
                .await;
        }
        if let Some(sid) = session_id {
            if let Err(e) = self.store.destroy(sid).await {
                warn!(error = %e, "Failed to destroy session on logout");
            }
        }
    }

    /// The CSRF token of the session being replaced, so the page that
    /// submitted the login keeps working.
    async fn carry_csrf_token(&self, prior_session: Option<&str>) -> Option<String> {
        let sid = prior_session?;
        match self.store.get(sid).await {
            Ok(payload) => payload.and_then(|p| p.csrf_token),
            Err(e) => {
                warn!(error = %e, "Could not read prior session; issuing login without CSRF token");
                None
            }
        }
    }
}
