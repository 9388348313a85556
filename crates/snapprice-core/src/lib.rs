//! # snapprice-core
//!
//! Core crate for SnapPrice. Contains the unified error system, the
//! configuration schema, and the clock abstraction every time-dependent
//! component is built on.
//!
//! This crate has **no** internal dependencies on other SnapPrice crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use types::clock::{Clock, ManualClock, SystemClock};
pub use types::pagination::OffsetPage;
