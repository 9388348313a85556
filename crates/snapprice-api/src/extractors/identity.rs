//! `CurrentUser` extractor: the identity resolved by the session middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use snapprice_auth::ResolvedIdentity;
use snapprice_core::error::AppError;

use crate::error::ApiError;

/// The authenticated caller.
///
/// Only available on routes behind `require_user`/`require_admin`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub ResolvedIdentity);

impl std::ops::Deref for CurrentUser {
    type Target = ResolvedIdentity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedIdentity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthenticated("Not logged in").into())
    }
}
