//! # snapprice-auth
//!
//! The request security pipeline for SnapPrice.
//!
//! ## Modules
//!
//! - `session`: persisted session store, lifecycle guard with
//!   privilege-drift rotation, and the login/logout manager
//! - `csrf`: per-session anti-forgery token issuance and validation
//! - `rate_limit`: fixed-window request counters with an injectable store
//! - `audit`: best-effort append-only audit trail with bounded retention
//! - `password`: Argon2id hashing and credential policy
//! - `directory`: the user lookup the guard and manager depend on

pub mod audit;
pub mod context;
pub mod csrf;
pub mod directory;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token;

pub use audit::AuditTrail;
pub use context::RequestContext;
pub use csrf::CsrfGuard;
pub use directory::UserDirectory;
pub use password::{CredentialPolicy, PasswordHasher};
pub use rate_limit::{CounterStore, MemoryCounterStore, RateLimitDecision, RateLimitRule, RateLimiter};
pub use session::{
    Access, ResolvedIdentity, SessionGuard, SessionManager, SessionStore, SqlSessionStore,
};
