//! Session row repository.
//!
//! Rows hold the serialized payload verbatim; interpretation lives in the
//! session store built on top of this repository.

use sqlx::SqlitePool;

use snapprice_core::error::AppError;
use snapprice_core::result::AppResult;

/// Repository for raw `sessions` rows.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the payload of a session that has not expired at `now_ms`.
    pub async fn find_live(&self, sid: &str, now_ms: i64) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT sess FROM sessions WHERE sid = ? AND expire > ?")
            .bind(sid)
            .bind(now_ms)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to load session", e))
    }

    /// Insert or replace a session row.
    pub async fn upsert(&self, sid: &str, sess: &str, expire_ms: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO sessions (sid, sess, expire) VALUES (?, ?, ?) \
             ON CONFLICT (sid) DO UPDATE SET sess = excluded.sess, expire = excluded.expire",
        )
        .bind(sid)
        .bind(sess)
        .bind(expire_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to save session", e))?;
        Ok(())
    }

    /// Rewrite a live session. Returns `false` when no live row exists, so a
    /// destroyed session is never brought back.
    pub async fn refresh(&self, sid: &str, sess: &str, expire_ms: i64, now_ms: i64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE sessions SET sess = ?, expire = ? WHERE sid = ? AND expire > ?")
            .bind(sess)
            .bind(expire_ms)
            .bind(sid)
            .bind(now_ms)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to touch session", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a session row.
    pub async fn delete(&self, sid: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE sid = ?")
            .bind(sid)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to delete session", e))?;
        Ok(())
    }

    /// Delete every row expired at `now_ms`. Returns the number removed.
    pub async fn delete_expired(&self, now_ms: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expire <= ?")
            .bind(now_ms)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to prune sessions", e))?;
        Ok(result.rows_affected())
    }

    /// Atomically move a live session to a new id with a new payload.
    ///
    /// The old row is deleted and the new one inserted in one transaction.
    /// Returns `false`, writing nothing, when the old session is no longer
    /// live (e.g. a concurrent logout won the race).
    pub async fn replace(
        &self,
        old_sid: &str,
        new_sid: &str,
        sess: &str,
        expire_ms: i64,
        now_ms: i64,
    ) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::store("Failed to begin transaction", e))?;

        let removed = sqlx::query("DELETE FROM sessions WHERE sid = ? AND expire > ?")
            .bind(old_sid)
            .bind(now_ms)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::store("Failed to delete session", e))?
            .rows_affected();
        if removed == 0 {
            return Ok(false);
        }

        sqlx::query("INSERT INTO sessions (sid, sess, expire) VALUES (?, ?, ?)")
            .bind(new_sid)
            .bind(sess)
            .bind(expire_ms)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::store("Failed to insert session", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::store("Failed to commit session rotation", e))?;
        Ok(true)
    }
}
