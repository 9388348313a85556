//! Counter storage for rate limiters.

use dashmap::DashMap;

/// A request counter for one key within one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    /// Requests seen in the current window, including the latest.
    pub count: u32,
    /// When the window ends, unix milliseconds.
    pub reset_at_ms: i64,
}

/// Storage of per-key counters.
///
/// `hit` must be atomic per key: concurrent hits on the same key may never
/// observe the same count.
pub trait CounterStore: Send + Sync + std::fmt::Debug {
    /// Count one request against `key`, starting a new window of `window_ms`
    /// if the key has none or its window has ended.
    fn hit(&self, key: &str, now_ms: i64, window_ms: i64) -> Counter;

    /// Drop counters whose window has ended. Returns the number removed.
    fn sweep(&self, now_ms: i64) -> usize;

    /// Number of counters held.
    fn len(&self) -> usize;

    /// Whether no counters are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process [`CounterStore`] on a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: DashMap<String, Counter>,
}

impl MemoryCounterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    fn hit(&self, key: &str, now_ms: i64, window_ms: i64) -> Counter {
        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            count: 0,
            reset_at_ms: now_ms + window_ms,
        });
        if entry.reset_at_ms <= now_ms {
            *entry = Counter {
                count: 0,
                reset_at_ms: now_ms + window_ms,
            };
        }
        entry.count = entry.count.saturating_add(1);
        *entry
    }

    fn sweep(&self, now_ms: i64) -> usize {
        let before = self.counters.len();
        self.counters.retain(|_, counter| counter.reset_at_ms > now_ms);
        before.saturating_sub(self.counters.len())
    }

    fn len(&self) -> usize {
        self.counters.len()
    }
}
