//! HTTP handlers organized by domain.

pub mod admin;
pub mod audit;
pub mod auth;
pub mod csrf;
pub mod health;
