use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};

use crate::models::review::{NewReview, ReviewResponsePayload};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

// GET /api/artists/{artist_id}/reviews
pub async fn list_reviews(
    State(app_state): State<AppState>,
    Path(artist_id): Path<i64>,
) -> Response {
    match app_state.reviews.list_reviews_for_artist(artist_id).await {
        Ok(reviews) => Json(json!({ "success": true, "reviews": reviews })).into_response(),
        Err(err) => {
            error!(?err, artist_id, "failed to list reviews");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// POST /api/reviews
pub async fn create_review(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Json(payload): Json<NewReview>,
) -> Response {
    if let Err(msg) = payload.validate() {
        return JsonResponse::bad_request(msg).into_response();
    }

    match app_state.artists.find_artist_by_id(payload.artist_id).await {
        Ok(Some(artist)) if artist.is_approved => {}
        Ok(_) => return JsonResponse::not_found("Artist not found").into_response(),
        Err(err) => {
            error!(?err, artist_id = payload.artist_id, "failed to load artist");
            return JsonResponse::server_error("Database error").into_response();
        }
    }

    match app_state.reviews.create_review(claims.id, &payload).await {
        Ok(review) => {
            info!(review_id = review.id, artist_id = review.artist_id, "review created");
            Json(json!({ "success": true, "review": review })).into_response()
        }
        Err(err) => {
            error!(?err, artist_id = payload.artist_id, "failed to create review");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// POST /api/reviews/{id}/response
pub async fn respond_to_review(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(review_id): Path<i64>,
    Json(payload): Json<ReviewResponsePayload>,
) -> Response {
    let response = payload.response.trim();
    if response.is_empty() {
        return JsonResponse::bad_request("Response text is required").into_response();
    }

    let review = match app_state.reviews.find_review_by_id(review_id).await {
        Ok(Some(r)) => r,
        Ok(None) => return JsonResponse::not_found("Review not found").into_response(),
        Err(err) => {
            error!(?err, review_id, "failed to load review");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let artist = match app_state.artists.find_artist_by_user_id(claims.id).await {
        Ok(Some(a)) => a,
        Ok(None) => {
            return JsonResponse::forbidden("Only the reviewed artist can respond").into_response()
        }
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to load artist profile");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    if review.artist_id != artist.id {
        return JsonResponse::forbidden("Only the reviewed artist can respond").into_response();
    }
    if !artist.entitlements().can_respond_to_reviews {
        return JsonResponse::forbidden_with_code(
            "Responding to reviews requires premium",
            "upgrade-required",
        )
        .into_response();
    }

    match app_state.reviews.set_response(review_id, response).await {
        Ok(()) => {
            info!(review_id, artist_id = artist.id, "review response added");
            JsonResponse::success("Response added").into_response()
        }
        Err(err) => {
            error!(?err, review_id, "failed to save review response");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
