use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};

use crate::models::artist::{ArtistProfilePayload, ArtistSearchQuery, PublicArtistProfile};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

// GET /api/artists
//
// Featured (premium) artists sort first; contact and exact-location fields
// are redacted per tier before anything leaves the handler.
pub async fn list_artists(State(app_state): State<AppState>) -> Response {
    match app_state.artists.list_approved_artists().await {
        Ok(artists) => {
            let profiles: Vec<PublicArtistProfile> =
                artists.into_iter().map(PublicArtistProfile::from).collect();
            Json(json!({ "success": true, "artists": profiles })).into_response()
        }
        Err(err) => {
            error!(?err, "failed to list artists");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// GET /api/artists/search
pub async fn search_artists(
    State(app_state): State<AppState>,
    Query(query): Query<ArtistSearchQuery>,
) -> Response {
    match app_state.artists.search_artists(&query).await {
        Ok(artists) => {
            let profiles: Vec<PublicArtistProfile> =
                artists.into_iter().map(PublicArtistProfile::from).collect();
            Json(json!({ "success": true, "artists": profiles })).into_response()
        }
        Err(err) => {
            error!(?err, "artist search failed");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// GET /api/artists/{id}
pub async fn get_artist(State(app_state): State<AppState>, Path(id): Path<i64>) -> Response {
    match app_state.artists.find_artist_by_id(id).await {
        Ok(Some(artist)) if artist.is_approved => {
            Json(json!({ "success": true, "artist": PublicArtistProfile::from(artist) }))
                .into_response()
        }
        // Unapproved profiles look exactly like missing ones from outside.
        Ok(_) => JsonResponse::not_found("Artist not found").into_response(),
        Err(err) => {
            error!(?err, artist_id = id, "failed to load artist");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// POST /api/artists
//
// New profiles start unapproved and on the free tier.
pub async fn create_artist_profile(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Json(payload): Json<ArtistProfilePayload>,
) -> Response {
    if let Err(msg) = payload.validate() {
        return JsonResponse::bad_request(msg).into_response();
    }

    match app_state.artists.find_artist_by_user_id(claims.id).await {
        Ok(Some(_)) => {
            return JsonResponse::conflict("Artist profile already exists").into_response()
        }
        Ok(None) => {}
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to check for existing profile");
            return JsonResponse::server_error("Database error").into_response();
        }
    }

    match app_state.artists.create_artist(claims.id, &payload).await {
        Ok(artist) => {
            info!(artist_id = artist.id, user_id = claims.id, "artist profile created");
            Json(json!({ "success": true, "artist": artist })).into_response()
        }
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to create artist profile");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// PUT /api/artists/me
pub async fn update_artist_profile(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Json(payload): Json<ArtistProfilePayload>,
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

    match app_state
        .artists
        .update_artist_profile(artist.id, &payload)
        .await
    {
        Ok(updated) => Json(json!({ "success": true, "artist": updated })).into_response(),
        Err(err) => {
            error!(?err, artist_id = artist.id, "failed to update artist profile");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// GET /api/artists/{id}/analytics
pub async fn get_artist_analytics(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(id): Path<i64>,
) -> Response {
    let artist = match app_state.artists.find_artist_by_id(id).await {
        Ok(Some(a)) => a,
        Ok(None) => return JsonResponse::not_found("Artist not found").into_response(),
        Err(err) => {
            error!(?err, artist_id = id, "failed to load artist");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    if artist.user_id != claims.id {
        return JsonResponse::forbidden("Only the profile owner can view analytics")
            .into_response();
    }
    if !artist.entitlements().has_analytics {
        return JsonResponse::forbidden_with_code("Upgrade required", "upgrade-required")
            .into_response();
    }

    match app_state.artists.artist_analytics(id).await {
        Ok(analytics) => Json(json!({ "success": true, "analytics": analytics })).into_response(),
        Err(err) => {
            error!(?err, artist_id = id, "failed to load analytics");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
