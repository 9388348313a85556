//! Auth handlers: login, logout, me.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use snapprice_auth::session::LoginRequest;

use crate::cookies;
use crate::dto::request::LoginBody;
use crate::dto::response::{OkResponse, UserResponse, UserSummary};
use crate::error::ApiError;
use crate::extractors::{ApiJson, ClientInfo, CurrentUser};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    client: ClientInfo,
    ApiJson(req): ApiJson<LoginBody>,
) -> Result<(CookieJar, Json<UserResponse<UserSummary>>), ApiError> {
    let prior = cookies::session_id(&jar, &state.config.session);
    let request: LoginRequest = req.into();
    let result = state
        .session_manager
        .login(&request, prior.as_deref(), &client.context())
        .await?;

    let jar = jar.add(cookies::session_cookie(&state.config.session, result.session_id));
    Ok((jar, Json(UserResponse::new(UserSummary::from(&result.user)))))
}

/// POST /api/auth/logout
///
/// Always succeeds; the cookie is cleared whether or not a session existed.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    client: ClientInfo,
) -> (CookieJar, Json<OkResponse>) {
    let sid = cookies::session_id(&jar, &state.config.session);
    let user = state.session_guard.peek_user(sid.as_deref()).await;
    state
        .session_manager
        .logout(sid.as_deref(), user.as_ref(), &client.context())
        .await;

    let jar = jar.remove(cookies::clear_session_cookie(&state.config.session));
    (jar, Json(OkResponse::new()))
}

/// GET /api/auth/me
pub async fn me(current: CurrentUser) -> Json<UserResponse<UserSummary>> {
    Json(UserResponse::new(UserSummary::from(&current.user)))
}
