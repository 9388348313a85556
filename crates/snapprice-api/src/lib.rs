//! # snapprice-api
//!
//! HTTP API layer for SnapPrice built on Axum.
//!
//! Provides the REST endpoints, the security middleware chain (rate limits,
//! CSRF, session resolution), extractors, DTOs, and error mapping.

pub mod app;
pub mod bootstrap;
pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
