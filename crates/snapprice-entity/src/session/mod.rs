//! Session state entities.

pub mod model;

pub use model::{CookieMeta, DEFAULT_SESSION_TTL_MS, SessionPayload};
