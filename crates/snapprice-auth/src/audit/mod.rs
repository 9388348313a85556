//! Append-only audit trail.

pub mod trail;

pub use trail::AuditTrail;
