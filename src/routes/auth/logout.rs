use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration as TimeDuration;

use crate::responses::JsonResponse;
use crate::state::AppState;

pub async fn handle_logout(State(app_state): State<AppState>) -> impl IntoResponse {
    let expired_cookie = Cookie::build(("auth_token", ""))
        .path("/")
        .http_only(true)
        .secure(app_state.config.auth_cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::seconds(0));
    // Set the Set-Cookie header
    let mut headers = HeaderMap::new();
    let mut header_value = HeaderValue::from_str(&expired_cookie.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("auth_token=; Max-Age=0; Path=/"));
    header_value.set_sensitive(true);
    headers.insert(SET_COOKIE, header_value);

    (StatusCode::OK, headers, JsonResponse::success("Logged out"))
}
