//! Audit log entities.

pub mod filter;
pub mod model;

pub use filter::AuditFilter;
pub use model::{AuditLogEntry, NewAuditEntry};
