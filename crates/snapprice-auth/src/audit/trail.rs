//! Best-effort audit writer with sampled retention.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use snapprice_core::config::AuditConfig;
use snapprice_core::result::AppResult;
use snapprice_core::types::pagination::OffsetPage;
use snapprice_core::Clock;
use snapprice_database::repositories::AuditLogRepository;
use snapprice_entity::audit::{AuditFilter, AuditLogEntry, NewAuditEntry};

/// Writes and queries the audit log.
///
/// Retention runs inline after every `purge_every`-th successful write
/// rather than on a timer.
#[derive(Debug)]
pub struct AuditTrail {
    repo: AuditLogRepository,
    clock: Arc<dyn Clock>,
    config: AuditConfig,
    writes: AtomicU64,
}

impl AuditTrail {
    /// Creates a new audit trail.
    pub fn new(repo: AuditLogRepository, clock: Arc<dyn Clock>, config: AuditConfig) -> Self {
        Self {
            repo,
            clock,
            config,
            writes: AtomicU64::new(0),
        }
    }

    /// Record an entry, discarding any failure.
    ///
    /// Audit is never allowed to fail the request that produced it; the
    /// error is logged and dropped here so callers cannot forget to.
    pub async fn record(&self, entry: NewAuditEntry) {
        if let Err(e) = self.try_record(&entry).await {
            warn!(action = %entry.action, error = %e, "Audit write discarded");
        }
    }

    /// Record an entry, returning the write outcome. Returns the new row id.
    pub async fn try_record(&self, entry: &NewAuditEntry) -> AppResult<i64> {
        let id = self.repo.create(entry, self.clock.now_secs()).await?;

        let n = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if self.config.purge_every > 0 && n % self.config.purge_every == 0 {
            if let Err(e) = self.purge().await {
                warn!(error = %e, "Audit retention purge failed; will retry on a later write");
            }
        }
        Ok(id)
    }

    /// Apply the configured age and row caps now. Returns rows deleted.
    pub async fn purge(&self) -> AppResult<u64> {
        let deleted = self
            .repo
            .purge(
                self.clock.now_secs(),
                self.config.max_age_days,
                self.config.max_rows,
            )
            .await?;
        if deleted > 0 {
            debug!(deleted, "Purged audit entries");
        }
        Ok(deleted)
    }

    /// Query the log newest-first. `limit`/`offset` are clamped.
    pub async fn query(
        &self,
        filter: &AuditFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.repo
            .search(filter, OffsetPage::clamped(limit, offset))
            .await
    }
}
