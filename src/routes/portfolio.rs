use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};

use crate::models::portfolio::NewPortfolioImage;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;
use crate::utils::tier_limits::can_upload_more_photos;

// GET /api/artists/{artist_id}/portfolio
pub async fn list_portfolio(
    State(app_state): State<AppState>,
    Path(artist_id): Path<i64>,
) -> Response {
    match app_state.portfolio.list_images_for_artist(artist_id).await {
        Ok(images) => Json(json!({ "success": true, "images": images })).into_response(),
        Err(err) => {
            error!(?err, artist_id, "failed to list portfolio");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// POST /api/portfolio
//
// The free tier caps the portfolio; the count check and the insert are not
// atomic, which can briefly overshoot the cap under concurrent uploads.
// Acceptable for a vanity limit.
pub async fn add_portfolio_image(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Json(payload): Json<NewPortfolioImage>,
) -> Response {
    if let Err(msg) = payload.validate() {
        return JsonResponse::bad_request(msg).into_response();
    }

    let artist = match app_state.artists.find_artist_by_user_id(claims.id).await {
        Ok(Some(a)) => a,
        Ok(None) => return JsonResponse::not_found("Artist profile not found").into_response(),
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to load artist profile");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let count = match app_state.portfolio.count_images_for_artist(artist.id).await {
        Ok(count) => count,
        Err(err) => {
            error!(?err, artist_id = artist.id, "failed to count portfolio images");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    if !can_upload_more_photos(artist.subscription_tier, count) {
        return JsonResponse::forbidden_with_code("Portfolio photo limit reached", "upgrade-required")
            .into_response();
    }

    match app_state.portfolio.add_image(artist.id, &payload).await {
        Ok(image) => {
            info!(artist_id = artist.id, image_id = image.id, "portfolio image added");
            Json(json!({ "success": true, "image": image })).into_response()
        }
        Err(err) => {
            error!(?err, artist_id = artist.id, "failed to add portfolio image");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// DELETE /api/portfolio/{id}
pub async fn delete_portfolio_image(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(image_id): Path<i64>,
) -> Response {
    let artist = match app_state.artists.find_artist_by_user_id(claims.id).await {
        Ok(Some(a)) => a,
        Ok(None) => return JsonResponse::not_found("Artist profile not found").into_response(),
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to load artist profile");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    // Scoped to the caller's artist id; someone else's image reads as missing.
    match app_state.portfolio.delete_image(artist.id, image_id).await {
        Ok(true) => JsonResponse::success("Image deleted").into_response(),
        Ok(false) => JsonResponse::not_found("Image not found").into_response(),
        Err(err) => {
            error!(?err, artist_id = artist.id, image_id, "failed to delete portfolio image");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
