//! Repository implementations for all SnapPrice entities.

pub mod audit;
pub mod session;
pub mod user;

pub use audit::AuditLogRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
