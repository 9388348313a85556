//! Rate limiting middleware.
//!
//! Every limited response carries `X-RateLimit-*` headers. When several
//! limiters see the same request the tightest decision is the one reported.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use snapprice_auth::RateLimitDecision;
use snapprice_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::client::client_ip;
use crate::state::AppState;

const LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Per-IP limiter in front of every API route.
pub async fn api_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let ip = request_ip(&state, &request);
    let decision = state.limiters.api.check(&format!("ip:{ip}"));
    run_if_allowed(decision, request, next).await
}

/// Login limiters: per IP, then per submitted username and IP.
///
/// The body is buffered to read the username and handed on intact.
pub async fn login_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let ip = request_ip(&state, &request);
    let by_ip = state.limiters.login_ip.check(&format!("ip:{ip}"));
    if !by_ip.allowed {
        return run_if_allowed(by_ip, request, next).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, state.config.server.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            let response = ApiError::from(AppError::payload_too_large("Request body too large")).into_response();
            return with_rate_limit_headers(response, by_ip);
        }
    };
    let username = login_username(&bytes);
    let by_user = state.limiters.login_user.check(&format!("user:{username}:{ip}"));
    let request = Request::from_parts(parts, Body::from(bytes));

    let response = run_if_allowed(by_user, request, next).await;
    with_rate_limit_headers(response, by_ip)
}

fn request_ip(state: &AppState, request: &Request) -> String {
    client_ip(request.headers(), request.extensions(), state.config.server.trust_proxy)
}

#[derive(Deserialize)]
struct LoginUsernameField {
    #[serde(default)]
    username: Option<serde_json::Value>,
}

/// The limiter key part for a login body: trimmed, lowercased, or `unknown`.
fn login_username(body: &[u8]) -> String {
    serde_json::from_slice::<LoginUsernameField>(body)
        .ok()
        .and_then(|field| field.username)
        .and_then(|value| value.as_str().map(|s| s.trim().to_lowercase()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn run_if_allowed(decision: RateLimitDecision, request: Request, next: Next) -> Response {
    let response = match decision.into_result() {
        Ok(_) => next.run(request).await,
        Err(e) => ApiError::from(e).into_response(),
    };
    with_rate_limit_headers(response, decision)
}

/// Write `decision` as the reported limit unless a tighter one is already there.
fn with_rate_limit_headers(mut response: Response, decision: RateLimitDecision) -> Response {
    let reported = response.extensions().get::<RateLimitDecision>().copied();
    if reported.is_some_and(|current| !decision.is_tighter_than(&current)) {
        return response;
    }

    let headers = response.headers_mut();
    headers.insert(LIMIT, HeaderValue::from(decision.limit));
    headers.insert(REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RESET, HeaderValue::from(decision.reset_secs));
    if decision.allowed {
        headers.remove(header::RETRY_AFTER);
    } else {
        headers.insert(header::RETRY_AFTER, HeaderValue::from(decision.retry_after_secs));
    }
    response.extensions_mut().insert(decision);
    response
}
