//! First-run admin account.

use tracing::{info, warn};

use snapprice_auth::CredentialPolicy;
use snapprice_core::result::AppResult;
use snapprice_entity::audit::NewAuditEntry;
use snapprice_entity::user::{CreateUser, User, UserRole};

use crate::state::AppState;

/// Create the configured admin when no enabled admin exists.
///
/// Returns the created user, or `None` when nothing needed doing.
pub async fn ensure_admin(state: &AppState) -> AppResult<Option<User>> {
    let bootstrap = &state.config.bootstrap;
    let (Some(username), Some(password)) = (
        bootstrap.admin_username.as_deref(),
        bootstrap.admin_password.as_deref(),
    ) else {
        return Ok(None);
    };

    if state.user_repo.count_enabled_admins().await? > 0 {
        return Ok(None);
    }

    let username = CredentialPolicy.username(username)?;
    CredentialPolicy.password(password)?;
    if state.user_repo.find_by_username(username).await?.is_some() {
        warn!(username, "Bootstrap admin name is taken by a non-admin account; skipping");
        return Ok(None);
    }

    let data = CreateUser {
        username: username.to_string(),
        password_hash: state.password_hasher.hash_password(password)?,
        role: UserRole::Admin,
    };
    let user = state.user_repo.create(&data, state.clock.now_millis()).await?;

    state
        .audit
        .record(
            NewAuditEntry::new("admin.bootstrap")
                .actor(&user)
                .entity("user", user.id),
        )
        .await;
    info!(user_id = user.id, username = %user.username, "Created bootstrap admin");
    Ok(Some(user))
}
