//! CSRF token issuance.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use crate::cookies;
use crate::dto::response::CsrfResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/csrf
///
/// Starts an anonymous session when the caller has none.
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<CsrfResponse>), ApiError> {
    let sid = cookies::session_id(&jar, &state.config.session);
    let issued = state.csrf.ensure_token(sid.as_deref()).await?;

    let jar = if issued.session_created {
        jar.add(cookies::session_cookie(&state.config.session, issued.session_id))
    } else {
        jar
    };
    Ok((jar, Json(CsrfResponse { csrf_token: issued.token })))
}
