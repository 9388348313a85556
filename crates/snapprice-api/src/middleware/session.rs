//! Session resolution middleware.
//!
//! Resolves the session cookie through the lifecycle guard, reissues the
//! cookie when the id was rotated, enforces the route's role requirement and
//! hands the identity to handlers as a request extension.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use snapprice_auth::Access;

use crate::cookies;
use crate::error::ApiError;
use crate::state::AppState;

/// Require any enabled user.
pub async fn require_user(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    resolve(state, jar, request, next, Access::AnyUser).await
}

/// Require an enabled admin.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    resolve(state, jar, request, next, Access::Admin).await
}

async fn resolve(
    state: AppState,
    jar: CookieJar,
    mut request: Request,
    next: Next,
    access: Access,
) -> Response {
    let sid = cookies::session_id(&jar, &state.config.session);
    let outcome = match access {
        Access::Admin => state.session_guard.authenticate_admin(sid.as_deref()).await,
        Access::AnyUser => state.session_guard.authorize(sid.as_deref(), access).await,
    };
    let (identity, verdict) = match outcome {
        Ok(outcome) => outcome,
        Err(e) => return ApiError::from(e).into_response(),
    };

    // A rotated id must reach the client even when the role check fails.
    let jar = if identity.rotated {
        jar.add(cookies::session_cookie(
            &state.config.session,
            identity.session_id.clone(),
        ))
    } else {
        jar
    };

    let response = match verdict {
        Ok(()) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    };
    (jar, response).into_response()
}
