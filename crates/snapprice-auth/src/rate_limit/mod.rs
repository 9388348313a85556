//! Fixed-window rate limiting.

pub mod limiter;
pub mod store;

pub use limiter::{RateLimitDecision, RateLimitRule, RateLimiter};
pub use store::{Counter, CounterStore, MemoryCounterStore};
