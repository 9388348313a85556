//! Convenience result type alias for SnapPrice.

use crate::error::AppError;

/// A specialized `Result` type for SnapPrice operations.
pub type AppResult<T> = Result<T, AppError>;
