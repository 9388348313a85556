//! User lookup consumed by the session components.

use async_trait::async_trait;

use snapprice_core::result::AppResult;
use snapprice_database::repositories::UserRepository;
use snapprice_entity::user::User;

/// Read access to user records.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Look a user up by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Look a user up by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        UserRepository::find_by_id(self, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        UserRepository::find_by_username(self, username).await
    }
}
