//! Audit log repository implementation.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use snapprice_core::error::AppError;
use snapprice_core::result::AppResult;
use snapprice_core::types::pagination::OffsetPage;
use snapprice_entity::audit::{AuditFilter, AuditLogEntry, NewAuditEntry};

const SECONDS_PER_DAY: i64 = 86_400;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an entry stamped with `ts` (unix seconds). Returns its id.
    pub async fn create(&self, entry: &NewAuditEntry, ts: i64) -> AppResult<i64> {
        let details = serde_json::Value::Object(entry.details.clone()).to_string();
        let result = sqlx::query(
            "INSERT INTO audit_logs (\
                ts, actor_user_id, actor_username, actor_role, action, \
                entity_type, entity_id, ip, user_agent, success, details_json\
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(ts)
        .bind(entry.actor_user_id)
        .bind(entry.actor_username.as_deref())
        .bind(entry.actor_role.as_deref())
        .bind(&entry.action)
        .bind(entry.entity_type.as_deref())
        .bind(entry.entity_id.as_deref())
        .bind(entry.ip.as_deref())
        .bind(entry.user_agent.as_deref())
        .bind(entry.success)
        .bind(details)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store("Failed to create audit entry", e))?;
        Ok(result.last_insert_rowid())
    }

    /// Total number of rows.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to count audit entries", e))
    }

    /// Enforce retention caps in one transaction. Returns rows deleted.
    ///
    /// Entries older than `max_age_days` are removed first, then the oldest
    /// rows beyond `max_rows`. A cap of `0` disables it.
    pub async fn purge(&self, now_secs: i64, max_age_days: u64, max_rows: u64) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::store("Failed to begin transaction", e))?;
        let mut deleted = 0;

        if max_age_days > 0 {
            let cutoff = now_secs - (max_age_days as i64) * SECONDS_PER_DAY;
            deleted += sqlx::query("DELETE FROM audit_logs WHERE ts < ?")
                .bind(cutoff)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::store("Failed to purge old audit entries", e))?
                .rows_affected();
        }

        if max_rows > 0 {
            // Id of the oldest row that survives the cap.
            let threshold: Option<i64> =
                sqlx::query_scalar("SELECT id FROM audit_logs ORDER BY id DESC LIMIT 1 OFFSET ?")
                    .bind((max_rows - 1) as i64)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| AppError::store("Failed to locate audit cap", e))?;
            if let Some(threshold) = threshold {
                deleted += sqlx::query("DELETE FROM audit_logs WHERE id < ?")
                    .bind(threshold)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| AppError::store("Failed to trim audit entries", e))?
                    .rows_affected();
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::store("Failed to commit audit purge", e))?;
        Ok(deleted)
    }

    /// Search the log, newest first.
    pub async fn search(&self, filter: &AuditFilter, page: OffsetPage) -> AppResult<Vec<AuditLogEntry>> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, ts, actor_user_id, actor_username, actor_role, action, \
             entity_type, entity_id, ip, user_agent, success, details_json \
             FROM audit_logs WHERE 1 = 1",
        );

        if let Some(id) = filter.actor_user_id {
            qb.push(" AND actor_user_id = ").push_bind(id);
        }
        if let Some(role) = non_empty(&filter.actor_role) {
            qb.push(" AND actor_role = ").push_bind(role.to_string());
        }
        if let Some(action) = non_empty(&filter.action) {
            qb.push(" AND action LIKE ")
                .push_bind(contains_pattern(action))
                .push(" ESCAPE '\\'");
        }
        if let Some(entity_type) = non_empty(&filter.entity_type) {
            qb.push(" AND entity_type = ").push_bind(entity_type.to_string());
        }
        if let Some(entity_id) = non_empty(&filter.entity_id) {
            qb.push(" AND entity_id = ").push_bind(entity_id.to_string());
        }
        if let Some(success) = filter.success {
            qb.push(" AND success = ").push_bind(success);
        }
        if let Some(since) = filter.since {
            qb.push(" AND ts >= ").push_bind(since);
        }
        if let Some(until) = filter.until {
            qb.push(" AND ts <= ").push_bind(until);
        }
        if let Some(username) = non_empty(&filter.actor_username) {
            qb.push(" AND actor_username LIKE ")
                .push_bind(contains_pattern(username))
                .push(" ESCAPE '\\'");
        }

        qb.push(" ORDER BY id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        qb.build_query_as::<AuditLogEntry>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to search audit log", e))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
