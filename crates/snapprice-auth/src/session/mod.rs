//! Session persistence and lifecycle.

pub mod guard;
pub mod manager;
pub mod store;

pub use guard::{Access, ResolvedIdentity, SessionGuard};
pub use manager::{LoginRequest, LoginResult, SessionManager};
pub use store::{SessionStore, SqlSessionStore};
