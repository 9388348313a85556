//! # snapprice-database
//!
//! SQLite connection management, embedded migrations and concrete
//! repository implementations for users, sessions and audit logs.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
