//! CSRF token issuance and validation.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::warn;

use snapprice_core::error::AppError;
use snapprice_core::result::AppResult;
use snapprice_core::Clock;
use snapprice_entity::session::SessionPayload;

use crate::session::SessionStore;
use crate::token::generate_token;

/// Request header carrying the token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// A token handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// The session the token is bound to.
    pub session_id: String,
    /// The token itself.
    pub token: String,
    /// Whether a new anonymous session was created to hold it.
    pub session_created: bool,
}

/// Issues and checks per-session CSRF tokens.
#[derive(Debug, Clone)]
pub struct CsrfGuard {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    session_max_age_ms: i64,
}

impl CsrfGuard {
    /// Creates a new CSRF guard. New anonymous sessions live `session_max_age_ms`.
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, session_max_age_ms: i64) -> Self {
        Self {
            store,
            clock,
            session_max_age_ms,
        }
    }

    /// Whether `method` leaves server state untouched.
    pub fn is_safe_method(method: &str) -> bool {
        matches!(method, "GET" | "HEAD" | "OPTIONS")
    }

    /// Return the session's token, issuing one if needed.
    ///
    /// Without a live session a fresh anonymous session is created to hold
    /// the token.
    pub async fn ensure_token(&self, sid: Option<&str>) -> AppResult<IssuedToken> {
        if let Some(sid) = sid {
            if let Some(mut payload) = self.store.get(sid).await? {
                if let Some(token) = payload.csrf_token.clone() {
                    return Ok(IssuedToken {
                        session_id: sid.to_string(),
                        token,
                        session_created: false,
                    });
                }
                let token = generate_token();
                payload.csrf_token = Some(token.clone());
                self.store.set(sid, &payload).await?;
                return Ok(IssuedToken {
                    session_id: sid.to_string(),
                    token,
                    session_created: false,
                });
            }
        }

        let token = generate_token();
        let mut payload = SessionPayload::new(self.session_max_age_ms, self.clock.now());
        payload.csrf_token = Some(token.clone());
        let session_id = self.store.create(&payload).await?;
        Ok(IssuedToken {
            session_id,
            token,
            session_created: true,
        })
    }

    /// Check a request's token against its session.
    ///
    /// Safe methods always pass. Anything else needs a non-empty header
    /// equal to the session's stored token; a store failure rejects.
    pub async fn validate(&self, method: &str, sid: Option<&str>, header: Option<&str>) -> AppResult<()> {
        if Self::is_safe_method(method) {
            return Ok(());
        }

        let presented = header.filter(|t| !t.trim().is_empty());
        let (Some(presented), Some(sid)) = (presented, sid) else {
            return Err(AppError::csrf_rejected());
        };

        let stored = match self.store.get(sid).await {
            Ok(Some(payload)) => payload.csrf_token,
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Session lookup failed during CSRF check; rejecting");
                None
            }
        };

        match stored {
            Some(stored) if bool::from(stored.as_bytes().ct_eq(presented.as_bytes())) => Ok(()),
            _ => Err(AppError::csrf_rejected()),
        }
    }
}
