//! Shared value types.

pub mod clock;
pub mod pagination;
