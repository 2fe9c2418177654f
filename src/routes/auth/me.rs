use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

// GET /api/auth/me
pub async fn handle_me(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Response {
    match app_state.users.find_public_user_by_id(claims.id).await {
        Ok(Some(user)) => Json(json!({ "success": true, "user": user })).into_response(),
        Ok(None) => JsonResponse::unauthorized("User not found").into_response(),
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to load user for session");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
