//! Route definitions for the SnapPrice HTTP API.
//!
//! All routes are mounted under `/api`. Middleware order per request:
//! API limiter, then route limiters, then CSRF, then session resolution.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware::{csrf, rate_limit, session};
use crate::state::AppState;

/// Build the `/api` router with its security middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(public_routes())
        .merge(login_routes(&state))
        .merge(session_routes(&state))
        .merge(user_routes(&state))
        .merge(admin_routes(&state))
        .layer(from_fn_with_state(state.clone(), rate_limit::api_rate_limit));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Read-only endpoints that need no session.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/csrf", get(handlers::csrf::issue_token))
}

/// Login: limiters, then CSRF.
fn login_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route_layer(from_fn_with_state(state.clone(), csrf::csrf_protect))
        .route_layer(from_fn_with_state(state.clone(), rate_limit::login_rate_limit))
}

/// Logout works with or without a live session.
fn session_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route_layer(from_fn_with_state(state.clone(), csrf::csrf_protect))
}

/// Endpoints for any signed-in user.
fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/audit/mine", get(handlers::audit::my_activity))
        .route_layer(from_fn_with_state(state.clone(), session::require_user))
        .route_layer(from_fn_with_state(state.clone(), csrf::csrf_protect))
}

/// Admin console endpoints.
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/admin/users",
            get(handlers::admin::users::list_users).post(handlers::admin::users::create_user),
        )
        .route("/admin/users/{id}", put(handlers::admin::users::update_user))
        .route("/admin/audit", get(handlers::admin::audit::search))
        .route_layer(from_fn_with_state(state.clone(), session::require_admin))
        .route_layer(from_fn_with_state(state.clone(), csrf::csrf_protect))
}
