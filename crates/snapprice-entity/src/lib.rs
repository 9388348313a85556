//! # snapprice-entity
//!
//! Domain entity models for SnapPrice. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`; session state is stored as a JSON
//! payload and derives only the serde traits.

pub mod audit;
pub mod session;
pub mod user;
