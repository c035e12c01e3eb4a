use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Authenticated username, if a valid bearer token accompanied the
/// request. Never rejects: a missing or unverifiable token yields `None`
/// and route-level authorization decides what absence means, so public
/// routes stay public.
pub struct MaybePrincipal(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let principal = match token {
            Some(token) => match keys.verify(token) {
                Ok(claims) => Some(claims.sub),
                Err(_) => {
                    warn!("invalid token presented");
                    None
                }
            },
            None => None,
        };

        Ok(MaybePrincipal(principal))
    }
}

/// The logged-in username. Rejects with 401 when no valid token is
/// present.
pub struct Principal(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = match MaybePrincipal::from_request_parts(parts, state).await {
            Ok(MaybePrincipal(principal)) => principal,
            Err(never) => match never {},
        };
        principal.map(Principal).ok_or(ApiError::Unauthorized)
    }
}

/// Gate a `:username` route to the user themself.
pub fn ensure_correct_user(principal: &Principal, username: &str) -> Result<(), ApiError> {
    if principal.0 == username {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
