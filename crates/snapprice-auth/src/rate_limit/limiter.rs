//! Fixed-window rate limiter.
//!
//! Each key gets `max` requests per window; the window starts at the key's
//! first request and ends `window` later. A client can therefore fit up to
//! `2 * max` requests across a window boundary.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use snapprice_core::error::AppError;
use snapprice_core::Clock;

use super::store::CounterStore;

/// Smallest accepted window.
const MIN_WINDOW_MS: i64 = 1000;

/// Limits of one limiter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    /// Requests allowed per window; at least 1.
    pub max: u32,
    /// Window length in milliseconds; at least one second.
    pub window_ms: i64,
}

impl RateLimitRule {
    /// A rule of `max` requests per `window`, clamped to the accepted range.
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max: max.max(1),
            window_ms: (window.as_millis() as i64).max(MIN_WINDOW_MS),
        }
    }
}

/// The verdict for one request, with the data for the advisory headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Configured maximum.
    pub limit: u32,
    /// Requests left in the window.
    pub remaining: u32,
    /// Window end, unix seconds rounded up.
    pub reset_secs: i64,
    /// Seconds until the window ends; at least 1.
    pub retry_after_secs: u64,
}

impl RateLimitDecision {
    /// Turn a rejection into an error.
    pub fn into_result(self) -> Result<Self, AppError> {
        if self.allowed {
            Ok(self)
        } else {
            Err(AppError::rate_limited(self.retry_after_secs))
        }
    }

    /// Whether `self` leaves less headroom than `other`.
    pub fn is_tighter_than(&self, other: &Self) -> bool {
        (self.allowed, self.remaining) < (other.allowed, other.remaining)
    }
}

/// A named limiter instance.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    name: &'static str,
    rule: RateLimitRule,
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter over its own counter store.
    pub fn new(
        name: &'static str,
        rule: RateLimitRule,
        store: Arc<dyn CounterStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name,
            rule,
            store,
            clock,
        }
    }

    /// Count a request against `key` and decide.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now_ms = self.clock.now_millis();
        let counter = self.store.hit(key, now_ms, self.rule.window_ms);
        let until_reset_ms = (counter.reset_at_ms - now_ms).max(0);

        let decision = RateLimitDecision {
            allowed: counter.count <= self.rule.max,
            limit: self.rule.max,
            remaining: self.rule.max.saturating_sub(counter.count),
            reset_secs: div_ceil(counter.reset_at_ms, 1000),
            retry_after_secs: div_ceil(until_reset_ms, 1000).max(1) as u64,
        };
        if !decision.allowed {
            debug!(limiter = self.name, key, count = counter.count, "Rate limit exceeded");
        }
        decision
    }

    /// Periodically drop expired counters.
    ///
    /// The task holds only a weak reference to the store and ends once the
    /// store is dropped. Runtime shutdown is never delayed by it.
    pub fn spawn_sweeper(&self, min_interval: Duration) -> JoinHandle<()> {
        let period = min_interval.max(Duration::from_millis(self.rule.window_ms as u64));
        let store: Weak<dyn CounterStore> = Arc::downgrade(&self.store);
        let clock = self.clock.clone();
        let name = self.name;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let removed = store.sweep(clock.now_millis());
                if removed > 0 {
                    debug!(limiter = name, removed, "Swept expired rate-limit counters");
                }
            }
        })
    }
}

fn div_ceil(value: i64, by: i64) -> i64 {
    (value + by - 1).div_euclid(by)
}
