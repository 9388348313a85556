//! Admin handlers. Every route here sits behind `require_admin`.

pub mod audit;
pub mod users;
