use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use axum_extra::extract::cookie::CookieJar;

use crate::routes::auth::claims::Claims;
use crate::state::AppState;
use crate::utils::jwt::decode_jwt;

#[derive(Debug, PartialEq)]
pub struct AuthSession(pub Claims);

fn session_claims(parts: &Parts, state: &AppState) -> Option<Claims> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get("auth_token")?;

    decode_jwt(
        token.value(),
        &state.jwt_keys,
        &state.config.jwt_issuer,
        &state.config.jwt_audience,
    )
    .ok()
    .map(|data| data.claims)
}

impl<S> FromRequestParts<S> for AuthSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        session_claims(parts, &app_state)
            .map(AuthSession)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Like [`AuthSession`] but never rejects: a missing or stale cookie resolves
/// to `None`. Used on routes that accept guests, e.g. booking creation.
#[derive(Debug, PartialEq)]
pub struct MaybeAuthSession(pub Option<Claims>);

impl<S> FromRequestParts<S> for MaybeAuthSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(MaybeAuthSession(session_claims(parts, &app_state)))
    }
}
