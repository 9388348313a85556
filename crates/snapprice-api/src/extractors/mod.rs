//! Custom Axum extractors.

pub mod client;
pub mod identity;
pub mod json;

pub use client::ClientInfo;
pub use identity::CurrentUser;
pub use json::ApiJson;
