//! Axum middleware stack.

pub mod csrf;
pub mod logging;
pub mod rate_limit;
pub mod session;
