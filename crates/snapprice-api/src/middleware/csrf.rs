//! CSRF validation middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use snapprice_auth::csrf::CSRF_HEADER;

use crate::cookies;
use crate::error::ApiError;
use crate::state::AppState;

/// Reject state-mutating requests that lack the session's CSRF token.
pub async fn csrf_protect(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let sid = cookies::session_id(&jar, &state.config.session);
    let token = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    match state
        .csrf
        .validate(request.method().as_str(), sid.as_deref(), token.as_deref())
        .await
    {
        Ok(()) => next.run(request).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}
