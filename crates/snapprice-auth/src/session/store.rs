//! Durable, TTL-bounded session storage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use snapprice_core::error::AppError;
use snapprice_core::result::AppResult;
use snapprice_core::Clock;
use snapprice_database::repositories::SessionRepository;
use snapprice_entity::session::SessionPayload;

use crate::token::generate_token;

/// Key/value storage of session payloads keyed by an opaque session id.
///
/// Records whose expiry has passed are absent to every read, whether or not
/// they have been physically deleted yet.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Load a live session.
    async fn get(&self, sid: &str) -> AppResult<Option<SessionPayload>>;

    /// Insert or replace a session. Expiry is derived from the payload.
    async fn set(&self, sid: &str, payload: &SessionPayload) -> AppResult<()>;

    /// Delete a session.
    async fn destroy(&self, sid: &str) -> AppResult<()>;

    /// Slide a live session's expiry forward, rewriting its payload.
    async fn touch(&self, sid: &str, payload: &SessionPayload) -> AppResult<()>;

    /// Store `payload` under a freshly generated id and return the id.
    async fn create(&self, payload: &SessionPayload) -> AppResult<String>;

    /// Atomically move a live session to a fresh id carrying `payload`.
    ///
    /// Returns `None` when `old_sid` is no longer live; nothing is written.
    async fn regenerate(&self, old_sid: &str, payload: &SessionPayload) -> AppResult<Option<String>>;
}

/// SQLite-backed [`SessionStore`].
///
/// Every mutating operation finishes with an opportunistic delete of all
/// expired rows, which keeps the table bounded without a scheduled task.
#[derive(Debug, Clone)]
pub struct SqlSessionStore {
    repo: SessionRepository,
    clock: Arc<dyn Clock>,
}

impl SqlSessionStore {
    /// Creates a new session store.
    pub fn new(repo: SessionRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    fn encode(payload: &SessionPayload) -> AppResult<String> {
        serde_json::to_string(payload).map_err(AppError::from)
    }

    /// Delete expired rows; failure only costs disk space, so it is logged
    /// and dropped.
    async fn prune(&self) {
        match self.repo.delete_expired(self.clock.now_millis()).await {
            Ok(0) => {}
            Ok(n) => debug!(removed = n, "Pruned expired sessions"),
            Err(e) => warn!(error = %e, "Session prune failed; will retry on next write"),
        }
    }
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn get(&self, sid: &str) -> AppResult<Option<SessionPayload>> {
        let Some(raw) = self.repo.find_live(sid, self.clock.now_millis()).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(AppError::from)
    }

    async fn set(&self, sid: &str, payload: &SessionPayload) -> AppResult<()> {
        let raw = Self::encode(payload)?;
        let expire = payload.expiry_millis(self.clock.now_millis());
        let result = self.repo.upsert(sid, &raw, expire).await;
        self.prune().await;
        result
    }

    async fn destroy(&self, sid: &str) -> AppResult<()> {
        let result = self.repo.delete(sid).await;
        self.prune().await;
        result
    }

    async fn touch(&self, sid: &str, payload: &SessionPayload) -> AppResult<()> {
        let now = self.clock.now();
        let mut payload = payload.clone();
        payload.refresh_expiry(now);
        let raw = Self::encode(&payload)?;
        let now_ms = now.timestamp_millis();
        let result = self
            .repo
            .refresh(sid, &raw, payload.expiry_millis(now_ms), now_ms)
            .await
            .map(|_| ());
        self.prune().await;
        result
    }

    async fn create(&self, payload: &SessionPayload) -> AppResult<String> {
        let sid = generate_token();
        self.set(&sid, payload).await?;
        Ok(sid)
    }

    async fn regenerate(&self, old_sid: &str, payload: &SessionPayload) -> AppResult<Option<String>> {
        let raw = Self::encode(payload)?;
        let now_ms = self.clock.now_millis();
        let new_sid = generate_token();
        let result = self
            .repo
            .replace(old_sid, &new_sid, &raw, payload.expiry_millis(now_ms), now_ms)
            .await
            .map(|moved| moved.then_some(new_sid));
        self.prune().await;
        result
    }
}
