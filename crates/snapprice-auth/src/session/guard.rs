//! Session lifecycle guard.
//!
//! Resolves the caller's session into an immutable [`ResolvedIdentity`] and
//! rotates the session id whenever the user's authorization fingerprint
//! (role, `updated_at`) drifted since the session cached it.

use std::sync::Arc;

use tracing::{info, warn};

use snapprice_core::error::AppError;
use snapprice_core::result::AppResult;
use snapprice_core::Clock;
use snapprice_entity::session::SessionPayload;
use snapprice_entity::user::User;

use crate::directory::UserDirectory;

use super::store::SessionStore;

const NOT_AUTHENTICATED: &str = "Not logged in";

/// Role requirement of a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any enabled user.
    AnyUser,
    /// Admins only.
    Admin,
}

/// The outcome of a successful session resolution.
///
/// Produced once per request and passed down unchanged.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    /// The current user record.
    pub user: User,
    /// The session id the client must use from now on.
    pub session_id: String,
    /// Whether the id changed during this resolution.
    pub rotated: bool,
    /// The session's CSRF token, if one was issued.
    pub csrf_token: Option<String>,
}

impl ResolvedIdentity {
    /// Check the identity against a role requirement.
    pub fn require(&self, access: Access) -> AppResult<()> {
        match access {
            Access::AnyUser => Ok(()),
            Access::Admin if self.user.is_admin() => Ok(()),
            Access::Admin => Err(AppError::forbidden("Admin only")),
        }
    }
}

/// Resolves and validates caller sessions.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl SessionGuard {
    /// Creates a new session guard.
    pub fn new(
        store: Arc<dyn SessionStore>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, users, clock }
    }

    /// Resolve the session of any enabled user.
    ///
    /// Store failures fail closed: the caller is treated as unauthenticated.
    pub async fn authenticate(&self, sid: Option<&str>) -> AppResult<ResolvedIdentity> {
        let sid = sid.ok_or_else(|| AppError::unauthenticated(NOT_AUTHENTICATED))?;

        let payload = match self.store.get(sid).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return Err(AppError::unauthenticated(NOT_AUTHENTICATED)),
            Err(e) => {
                warn!(error = %e, "Session lookup failed; treating caller as unauthenticated");
                return Err(AppError::unauthenticated(NOT_AUTHENTICATED));
            }
        };
        let user_id = payload
            .user_id
            .ok_or_else(|| AppError::unauthenticated(NOT_AUTHENTICATED))?;

        let user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) if user.can_login() => user,
            Ok(_) => return Err(AppError::unauthenticated(NOT_AUTHENTICATED)),
            Err(e) => {
                warn!(user_id, error = %e, "User lookup failed; treating caller as unauthenticated");
                return Err(AppError::unauthenticated(NOT_AUTHENTICATED));
            }
        };

        Ok(self.reconcile(sid, payload, user).await)
    }

    /// Resolve the session of an enabled admin.
    ///
    /// Rotation runs before the role check, so the decision is made on the
    /// current role and a demoted admin's stale session id is retired. The
    /// identity comes back alongside the verdict because a refused caller
    /// still has to receive the rotated id.
    pub async fn authenticate_admin(
        &self,
        sid: Option<&str>,
    ) -> AppResult<(ResolvedIdentity, AppResult<()>)> {
        self.authorize(sid, Access::Admin).await
    }

    /// Resolve the session and check it against `access`.
    pub async fn authorize(
        &self,
        sid: Option<&str>,
        access: Access,
    ) -> AppResult<(ResolvedIdentity, AppResult<()>)> {
        let identity = self.authenticate(sid).await?;
        let verdict = identity.require(access);
        Ok((identity, verdict))
    }

    /// Look up the session's user without refreshing or rotating anything.
    ///
    /// Any failure, and a disabled account, reads as "no user".
    pub async fn peek_user(&self, sid: Option<&str>) -> Option<User> {
        let payload = self.store.get(sid?).await.ok()??;
        self.users
            .find_by_id(payload.user_id?)
            .await
            .ok()?
            .filter(User::can_login)
    }

    /// Bring the session in line with the current user record.
    ///
    /// Never fails: a rotation error keeps the pre-rotation id and is not
    /// retried within this request.
    async fn reconcile(&self, sid: &str, payload: SessionPayload, user: User) -> ResolvedIdentity {
        let role_drift = payload.user_role.is_some_and(|cached| cached != user.role);
        let fingerprint_drift = payload
            .user_updated_at
            .is_some_and(|cached| cached != user.updated_at);

        let mut current = payload.clone();
        current.bind_user(&user);

        if role_drift || fingerprint_drift {
            current.refresh_expiry(self.clock.now());
            match self.store.regenerate(sid, &current).await {
                Ok(Some(new_sid)) => {
                    info!(
                        user_id = user.id,
                        role = %user.role,
                        role_drift,
                        "Rotated session after privilege change"
                    );
                    return ResolvedIdentity {
                        csrf_token: current.csrf_token,
                        user,
                        session_id: new_sid,
                        rotated: true,
                    };
                }
                Ok(None) => {
                    warn!(user_id = user.id, "Session vanished during rotation; keeping old id");
                }
                Err(e) => {
                    warn!(user_id = user.id, error = %e, "Session rotation failed; keeping old id");
                }
            }
            return ResolvedIdentity {
                csrf_token: payload.csrf_token,
                user,
                session_id: sid.to_string(),
                rotated: false,
            };
        }

        let write = if current != payload {
            self.store.set(sid, &current).await
        } else {
            self.store.touch(sid, &current).await
        };
        if let Err(e) = write {
            warn!(user_id = user.id, error = %e, "Session refresh failed; continuing");
        }

        ResolvedIdentity {
            csrf_token: current.csrf_token,
            user,
            session_id: sid.to_string(),
            rotated: false,
        }
    }
}
