//! Offset pagination for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size.
pub const MAX_LIMIT: i64 = 200;
/// Maximum offset accepted from callers.
pub const MAX_OFFSET: i64 = 100_000;

/// A bounded `LIMIT`/`OFFSET` pair.
///
/// Construct with [`OffsetPage::clamped`] so query cost stays bounded no
/// matter what the caller sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetPage {
    /// Number of rows to return.
    pub limit: i64,
    /// Number of rows to skip.
    pub offset: i64,
}

impl OffsetPage {
    /// Clamp raw caller input into the accepted range.
    ///
    /// A zero limit counts as unset and falls back to [`DEFAULT_LIMIT`].
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit
                .filter(|&l| l != 0)
                .unwrap_or(DEFAULT_LIMIT)
                .clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0).clamp(0, MAX_OFFSET),
        }
    }
}

impl Default for OffsetPage {
    fn default() -> Self {
        Self::clamped(None, None)
    }
}
