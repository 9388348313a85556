//! Anti-forgery tokens bound to sessions.

pub mod guard;

pub use guard::{CSRF_HEADER, CsrfGuard, IssuedToken};
