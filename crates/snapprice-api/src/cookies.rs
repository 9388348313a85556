//! Session cookie construction.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use snapprice_core::config::SessionConfig;

/// Create the session cookie carrying `session_id`.
pub fn session_cookie(config: &SessionConfig, session_id: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), session_id))
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::hours(config.max_age_hours as i64))
        .build()
}

/// Create the removal cookie for the session.
pub fn clear_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// The session id presented by the client, if any.
pub fn session_id(jar: &CookieJar, config: &SessionConfig) -> Option<String> {
    jar.get(&config.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
