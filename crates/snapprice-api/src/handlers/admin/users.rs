//! Admin user management handlers.
//!
//! Every mutation bumps the target's `updated_at`, which is what makes the
//! session guard rotate that user's sessions on their next request.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};

use snapprice_auth::CredentialPolicy;
use snapprice_core::error::{AppError, ErrorKind};
use snapprice_core::result::AppResult;
use snapprice_entity::audit::NewAuditEntry;
use snapprice_entity::user::{CreateUser, UpdateUser, User, UserRole};

use crate::dto::request::{CreateUserRequest, UpdateUserRequest};
use crate::dto::response::{OkResponse, UserListResponse, UserResponse};
use crate::error::ApiError;
use crate::dto::request::validate_body;
use crate::extractors::{ApiJson, ClientInfo, CurrentUser};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users = state.user_repo.find_all().await?;
    Ok(Json(UserListResponse { ok: true, users }))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    current: CurrentUser,
    client: ClientInfo,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<Json<UserResponse<User>>, ApiError> {
    let base = NewAuditEntry::new("admin.user.create")
        .actor(&current.user)
        .client(Some(client.ip.clone()), client.user_agent.clone())
        .detail("username", req.username.trim())
        .detail("role", req.role.as_deref().unwrap_or("user"));

    match insert_user(&state, &req).await {
        Ok(user) => {
            state
                .audit
                .record(
                    base.entity("user", user.id)
                        .detail("role", user.role.as_str()),
                )
                .await;
            tracing::info!(admin_id = current.user.id, user_id = user.id, "User created");
            Ok(Json(UserResponse::new(user)))
        }
        Err(e) => {
            state
                .audit
                .record(base.failed().detail("error", failure_reason(&e)))
                .await;
            Err(e.into())
        }
    }
}

async fn insert_user(state: &AppState, req: &CreateUserRequest) -> AppResult<User> {
    let username = CredentialPolicy.username(&req.username)?;
    validate_body(req)?;
    // Anything other than a known role creates a regular user.
    let role = req
        .role
        .as_deref()
        .and_then(|role| UserRole::from_str(role).ok())
        .unwrap_or(UserRole::User);
    let password_hash = state.password_hasher.hash_password(&req.password)?;

    let data = CreateUser {
        username: username.to_string(),
        password_hash,
        role,
    };
    state
        .user_repo
        .create(&data, state.clock.now_millis())
        .await
        .map_err(|e| match e.kind {
            ErrorKind::Conflict => AppError::validation(e.message),
            _ => e,
        })
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    current: CurrentUser,
    client: ClientInfo,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let password = req.password.as_deref().filter(|p| !p.is_empty());
    let base = NewAuditEntry::new("admin.user.update")
        .actor(&current.user)
        .client(Some(client.ip.clone()), client.user_agent.clone())
        .entity("user", id.trim())
        .detail("role", req.role.clone())
        .detail("disabled", req.disabled)
        .detail("password_changed", password.is_some());

    match apply_update(&state, id.trim(), &req, password).await {
        Ok(user) => {
            state.audit.record(base).await;
            tracing::info!(admin_id = current.user.id, user_id = user.id, "User updated");
            Ok(Json(OkResponse::new()))
        }
        Err(e) => {
            state
                .audit
                .record(base.failed().detail("error", failure_reason(&e)))
                .await;
            Err(e.into())
        }
    }
}

async fn apply_update(
    state: &AppState,
    id: &str,
    req: &UpdateUserRequest,
    password: Option<&str>,
) -> AppResult<User> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::validation("Invalid user id"))?;
    // An unknown role leaves the current one in place.
    let role = req
        .role
        .as_deref()
        .and_then(|role| UserRole::from_str(role).ok());
    let password_hash = match password {
        Some(password) => {
            CredentialPolicy.password(password)?;
            Some(state.password_hasher.hash_password(password)?)
        }
        None => None,
    };

    let update = UpdateUser {
        role,
        disabled: req.disabled,
        password_hash,
    };
    state
        .user_repo
        .update(id, &update, state.clock.now_millis())
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// What an audit row records about a failed mutation.
fn failure_reason(err: &AppError) -> String {
    if err.kind.is_client_safe() {
        err.message.clone()
    } else {
        err.kind.to_string()
    }
}
