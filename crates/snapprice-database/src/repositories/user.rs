//! User repository implementation.

use sqlx::SqlitePool;

use snapprice_core::error::AppError;
use snapprice_core::result::AppResult;
use snapprice_entity::user::{CreateUser, UpdateUser, User};

/// Message returned when an update would leave no enabled admin.
pub const LAST_ADMIN_MESSAGE: &str = "Cannot disable/demote the last admin";

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to find user by id", e))
    }

    /// Find a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to find user by username", e))
    }

    /// List all users, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to list users", e))
    }

    /// Count enabled admin accounts.
    pub async fn count_enabled_admins(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin' AND disabled = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::store("Failed to count admins", e))
    }

    /// Create a new user.
    ///
    /// A duplicate username yields a conflict error.
    pub async fn create(&self, data: &CreateUser, now_ms: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, role, disabled, created_at, updated_at) \
             VALUES (?, ?, ?, 0, ?, ?) RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(now_ms)
        .bind(now_ms)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("Username already exists")
            }
            _ => AppError::store("Failed to create user", e),
        })
    }

    /// Apply a partial update.
    ///
    /// Runs in one transaction: the last-admin check and the write see the
    /// same snapshot, and a rejected update leaves the row untouched.
    /// `updated_at` always moves forward, even within the same millisecond,
    /// so live sessions observe the change. Returns `None` for an unknown id.
    pub async fn update(&self, id: i64, data: &UpdateUser, now_ms: i64) -> AppResult<Option<User>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::store("Failed to begin transaction", e))?;

        let current = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::store("Failed to load user", e))?;
        let Some(current) = current else {
            return Ok(None);
        };

        if data.removes_admin(&current) {
            let admins: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM users WHERE role = 'admin' AND disabled = 0",
            )
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::store("Failed to count admins", e))?;
            if admins <= 1 {
                return Err(AppError::validation(LAST_ADMIN_MESSAGE));
            }
        }

        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET \
                role = COALESCE(?, role), \
                disabled = COALESCE(?, disabled), \
                password_hash = COALESCE(?, password_hash), \
                updated_at = MAX(?, updated_at + 1) \
             WHERE id = ? RETURNING *",
        )
        .bind(data.role)
        .bind(data.disabled)
        .bind(data.password_hash.as_deref())
        .bind(now_ms)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::store("Failed to update user", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::store("Failed to commit user update", e))?;
        Ok(Some(updated))
    }
}
