//! Minimum requirements for new accounts and passwords.

use snapprice_core::error::AppError;

/// Minimum username length, after trimming.
pub const MIN_USERNAME_LEN: usize = 3;
/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validates usernames and passwords chosen by an admin.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialPolicy;

impl CredentialPolicy {
    /// Return the trimmed username if it is long enough.
    pub fn username<'a>(&self, username: &'a str) -> Result<&'a str, AppError> {
        let trimmed = username.trim();
        if trimmed.chars().count() < MIN_USERNAME_LEN {
            return Err(AppError::validation(format!(
                "Username must be at least {MIN_USERNAME_LEN} characters"
            )));
        }
        Ok(trimmed)
    }

    /// Check a new password's length.
    pub fn password(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}
