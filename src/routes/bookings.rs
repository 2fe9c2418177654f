use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};

use crate::models::booking::{BookingStatusUpdate, NewBooking};
use crate::responses::JsonResponse;
use crate::routes::auth::session::{AuthSession, MaybeAuthSession};
use crate::state::AppState;
use crate::utils::booking_lifecycle::validate_transition;

// POST /api/bookings
//
// Guests can book without an account; a logged-in session just links the
// booking to the user.
pub async fn create_booking(
    State(app_state): State<AppState>,
    MaybeAuthSession(claims): MaybeAuthSession,
    Json(payload): Json<NewBooking>,
) -> Response {
    if let Err(msg) = payload.validate() {
        return JsonResponse::bad_request(msg).into_response();
    }

    let artist = match app_state.artists.find_artist_by_id(payload.artist_id).await {
        Ok(Some(a)) => a,
        // Unapproved profiles are not listed publicly; don't reveal them here.
        Ok(None) => return JsonResponse::not_found("Artist not found").into_response(),
        Err(err) => {
            error!(?err, artist_id = payload.artist_id, "failed to load artist");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    if !artist.is_approved {
        return JsonResponse::not_found("Artist not found").into_response();
    }
    if !artist.entitlements().can_accept_bookings {
        return JsonResponse::forbidden("This artist is not currently accepting bookings")
            .into_response();
    }

    let user_id = claims.map(|c| c.id);
    match app_state.bookings.create_booking(&payload, user_id).await {
        Ok(booking) => {
            info!(booking_id = booking.id, artist_id = artist.id, "booking created");
            Json(json!({ "success": true, "booking": booking })).into_response()
        }
        Err(err) => {
            error!(?err, artist_id = artist.id, "failed to create booking");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// GET /api/bookings/artist
pub async fn list_artist_bookings(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Response {
    let artist = match app_state.artists.find_artist_by_user_id(claims.id).await {
        Ok(Some(a)) => a,
        Ok(None) => return JsonResponse::not_found("Artist profile not found").into_response(),
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to load artist profile");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    match app_state.bookings.list_bookings_for_artist(artist.id).await {
        Ok(bookings) => Json(json!({ "success": true, "bookings": bookings })).into_response(),
        Err(err) => {
            error!(?err, artist_id = artist.id, "failed to list bookings");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// GET /api/bookings/mine
pub async fn list_my_bookings(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Response {
    match app_state.bookings.list_bookings_for_user(claims.id).await {
        Ok(bookings) => Json(json!({ "success": true, "bookings": bookings })).into_response(),
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to list bookings");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

// PATCH /api/bookings/{id}/status
//
// Manual transitions only walk the lifecycle graph; the paid-deposit path is
// the webhook's job and carries the deposit fields with it.
pub async fn update_booking_status(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(id): Path<i64>,
    Json(payload): Json<BookingStatusUpdate>,
) -> Response {
    let booking = match app_state.bookings.find_booking_by_id(id).await {
        Ok(Some(b)) => b,
        Ok(None) => return JsonResponse::not_found("Booking not found").into_response(),
        Err(err) => {
            error!(?err, booking_id = id, "failed to load booking");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let artist = match app_state.artists.find_artist_by_user_id(claims.id).await {
        Ok(Some(a)) => a,
        Ok(None) => {
            return JsonResponse::forbidden("Only the booked artist can update this booking")
                .into_response()
        }
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to load artist profile");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    if booking.artist_id != artist.id {
        return JsonResponse::forbidden("Only the booked artist can update this booking")
            .into_response();
    }

    if let Err(err) = validate_transition(booking.status, payload.status) {
        return JsonResponse::conflict(&err.to_string()).into_response();
    }

    if let Err(err) = app_state.bookings.update_status(id, payload.status).await {
        error!(?err, booking_id = id, "failed to update booking status");
        return JsonResponse::server_error("Database error").into_response();
    }

    info!(
        booking_id = id,
        from = %booking.status,
        to = %payload.status,
        "booking status updated"
    );
    Json(json!({ "success": true, "status": payload.status })).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use axum::extract::{Path, State as AxumState};
    use axum::http::StatusCode;
    use axum::Json;
    use time::OffsetDateTime;

    use super::{create_booking, list_artist_bookings, list_my_bookings, update_booking_status};
    use crate::config::{Config, StripeSettings};
    use crate::db::mock_db::MockDb;
    use crate::db::mock_webhook_event_log_repository::MockWebhookEventLogRepository;
    use crate::models::artist::{Artist, SubscriptionTier};
    use crate::models::booking::{Booking, BookingStatus, BookingStatusUpdate, NewBooking, SizeCategory};
    use crate::models::user::UserRole;
    use crate::routes::auth::claims::Claims;
    use crate::routes::auth::session::{AuthSession, MaybeAuthSession};
    use crate::services::smtp_mailer::MockMailer;
    use crate::services::stripe::MockStripeGateway;
    use crate::state::AppState;
    use crate::utils::jwt::JwtKeys;

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            database_url: "postgres://localhost/test".into(),
            frontend_origin: "http://localhost:5173".into(),
            auth_cookie_secure: true,
            jwt_issuer: "test-issuer".into(),
            jwt_audience: "test-audience".into(),
            stripe: StripeSettings {
                secret_key: "sk_test_123".into(),
                webhook_secret: "whsec_test_secret".into(),
                premium_monthly_price_id: "price_monthly".into(),
                premium_yearly_price_id: "price_yearly".into(),
            },
        })
    }

    fn test_state(db: Arc<MockDb>) -> AppState {
        AppState {
            users: db.clone(),
            artists: db.clone(),
            bookings: db.clone(),
            portfolio: db.clone(),
            reviews: db,
            event_log: Arc::new(MockWebhookEventLogRepository::default()),
            stripe: Arc::new(MockStripeGateway::new()),
            mailer: Arc::new(MockMailer::default()),
            config: test_config(),
            jwt_keys: Arc::new(
                JwtKeys::from_secret("0123456789abcdef0123456789abcdef").unwrap(),
            ),
        }
    }

    fn claims_for(user_id: i64) -> Claims {
        Claims {
            id: user_id,
            email: "user@example.com".into(),
            name: "Test User".into(),
            role: Some(UserRole::User),
            exp: (SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs()
                + 3600) as usize,
            iss: "test-issuer".into(),
            aud: "test-audience".into(),
        }
    }

    fn artist(id: i64, user_id: i64, tier: SubscriptionTier) -> Artist {
        Artist {
            id,
            user_id,
            shop_name: "Iron Anchor Tattoo".into(),
            bio: None,
            specialties: None,
            styles: None,
            years_experience: Some(8),
            address: None,
            city: Some("Portland".into()),
            state: Some("OR".into()),
            zip: None,
            phone: None,
            website: None,
            instagram: None,
            is_approved: true,
            average_rating: None,
            total_reviews: 0,
            subscription_tier: tier,
            stripe_subscription_id: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn booking_request(artist_id: i64) -> NewBooking {
        NewBooking {
            artist_id,
            customer_name: "Ada Lovelace".into(),
            customer_email: "ada@example.com".into(),
            customer_phone: "555-0199".into(),
            preferred_date: None,
            tattoo_description: "Fern wrapping the forearm".into(),
            placement: "Left forearm".into(),
            size: SizeCategory::Medium,
            budget: Some("300-500".into()),
            notes: None,
        }
    }

    fn booking(id: i64, artist_id: i64, user_id: Option<i64>, status: BookingStatus) -> Booking {
        Booking {
            id,
            artist_id,
            user_id,
            customer_name: "Ada Lovelace".into(),
            customer_email: "ada@example.com".into(),
            customer_phone: "555-0199".into(),
            preferred_date: None,
            tattoo_description: "Fern wrapping the forearm".into(),
            placement: "Left forearm".into(),
            size: SizeCategory::Medium,
            budget: None,
            notes: None,
            stripe_checkout_session_id: None,
            stripe_payment_intent_id: None,
            deposit_amount: None,
            deposit_paid: false,
            status,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn guest_can_book_premium_artist() {
        let db = Arc::new(MockDb::default().with_artist(artist(7, 107, SubscriptionTier::Premium)));
        let state = test_state(db.clone());

        let resp = create_booking(
            AxumState(state),
            MaybeAuthSession(None),
            Json(booking_request(7)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let bookings = db.bookings.lock().unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].user_id, None);
        assert_eq!(bookings[0].status, BookingStatus::Pending);
        assert!(!bookings[0].deposit_paid);
    }

    #[tokio::test]
    async fn logged_in_booking_is_linked_to_user() {
        let db = Arc::new(MockDb::default().with_artist(artist(7, 107, SubscriptionTier::Premium)));
        let state = test_state(db.clone());

        let resp = create_booking(
            AxumState(state),
            MaybeAuthSession(Some(claims_for(55))),
            Json(booking_request(7)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(db.bookings.lock().unwrap()[0].user_id, Some(55));
    }

    #[tokio::test]
    async fn invalid_contact_details_are_rejected() {
        let db = Arc::new(MockDb::default().with_artist(artist(7, 107, SubscriptionTier::Premium)));
        let state = test_state(db.clone());

        let mut payload = booking_request(7);
        payload.customer_name = "  ".into();
        let resp = create_booking(AxumState(state), MaybeAuthSession(None), Json(payload)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(db.bookings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn booking_unknown_artist_is_not_found() {
        let state = test_state(Arc::new(MockDb::default()));

        let resp = create_booking(
            AxumState(state),
            MaybeAuthSession(None),
            Json(booking_request(999)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn booking_unapproved_artist_is_not_found() {
        let mut a = artist(7, 107, SubscriptionTier::Premium);
        a.is_approved = false;
        let db = Arc::new(MockDb::default().with_artist(a));
        let state = test_state(db);

        let resp = create_booking(
            AxumState(state),
            MaybeAuthSession(None),
            Json(booking_request(7)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn free_tier_artist_cannot_take_bookings() {
        let db = Arc::new(MockDb::default().with_artist(artist(7, 107, SubscriptionTier::Free)));
        let state = test_state(db.clone());

        let resp = create_booking(
            AxumState(state),
            MaybeAuthSession(None),
            Json(booking_request(7)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(db.bookings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn artist_sees_only_their_bookings() {
        let db = Arc::new(
            MockDb::default()
                .with_artist(artist(7, 107, SubscriptionTier::Premium))
                .with_booking(booking(1, 7, None, BookingStatus::Pending))
                .with_booking(booking(2, 8, None, BookingStatus::Pending))
                .with_booking(booking(3, 7, None, BookingStatus::Confirmed)),
        );
        let state = test_state(db);

        let resp = list_artist_bookings(AxumState(state), AuthSession(claims_for(107))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let bookings = json["bookings"].as_array().unwrap();
        assert_eq!(bookings.len(), 2);
        assert!(bookings.iter().all(|b| b["artist_id"] == 7));
    }

    #[tokio::test]
    async fn listing_bookings_without_profile_is_not_found() {
        let state = test_state(Arc::new(MockDb::default()));

        let resp = list_artist_bookings(AxumState(state), AuthSession(claims_for(107))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn user_sees_only_their_bookings() {
        let db = Arc::new(
            MockDb::default()
                .with_booking(booking(1, 7, Some(55), BookingStatus::Pending))
                .with_booking(booking(2, 7, Some(56), BookingStatus::Pending))
                .with_booking(booking(3, 8, Some(55), BookingStatus::Completed)),
        );
        let state = test_state(db);

        let resp = list_my_bookings(AxumState(state), AuthSession(claims_for(55))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["bookings"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn owner_can_confirm_pending_booking() {
        let db = Arc::new(
            MockDb::default()
                .with_artist(artist(7, 107, SubscriptionTier::Premium))
                .with_booking(booking(1, 7, None, BookingStatus::Pending)),
        );
        let state = test_state(db.clone());

        let resp = update_booking_status(
            AxumState(state),
            AuthSession(claims_for(107)),
            Path(1),
            Json(BookingStatusUpdate {
                status: BookingStatus::Confirmed,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            db.status_updates.lock().unwrap().as_slice(),
            &[(1, BookingStatus::Confirmed)]
        );
        assert_eq!(
            db.bookings.lock().unwrap()[0].status,
            BookingStatus::Confirmed
        );
        // Manual confirmation never fabricates deposit state.
        assert!(!db.bookings.lock().unwrap()[0].deposit_paid);
    }

    #[tokio::test]
    async fn owner_can_complete_confirmed_booking() {
        let db = Arc::new(
            MockDb::default()
                .with_artist(artist(7, 107, SubscriptionTier::Premium))
                .with_booking(booking(1, 7, None, BookingStatus::Confirmed)),
        );
        let state = test_state(db.clone());

        let resp = update_booking_status(
            AxumState(state),
            AuthSession(claims_for(107)),
            Path(1),
            Json(BookingStatusUpdate {
                status: BookingStatus::Completed,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            db.bookings.lock().unwrap()[0].status,
            BookingStatus::Completed
        );
    }

    #[tokio::test]
    async fn skipping_confirmation_conflicts() {
        let db = Arc::new(
            MockDb::default()
                .with_artist(artist(7, 107, SubscriptionTier::Premium))
                .with_booking(booking(1, 7, None, BookingStatus::Pending)),
        );
        let state = test_state(db.clone());

        let resp = update_booking_status(
            AxumState(state),
            AuthSession(claims_for(107)),
            Path(1),
            Json(BookingStatusUpdate {
                status: BookingStatus::Completed,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("cannot change booking status"));
        assert!(db.status_updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn terminal_booking_cannot_be_reopened() {
        let db = Arc::new(
            MockDb::default()
                .with_artist(artist(7, 107, SubscriptionTier::Premium))
                .with_booking(booking(1, 7, None, BookingStatus::Cancelled)),
        );
        let state = test_state(db.clone());

        let resp = update_booking_status(
            AxumState(state),
            AuthSession(claims_for(107)),
            Path(1),
            Json(BookingStatusUpdate {
                status: BookingStatus::Confirmed,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(
            db.bookings.lock().unwrap()[0].status,
            BookingStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn other_artist_cannot_update_booking() {
        let db = Arc::new(
            MockDb::default()
                .with_artist(artist(7, 107, SubscriptionTier::Premium))
                .with_artist(artist(8, 108, SubscriptionTier::Premium))
                .with_booking(booking(1, 7, None, BookingStatus::Pending)),
        );
        let state = test_state(db.clone());

        let resp = update_booking_status(
            AxumState(state),
            AuthSession(claims_for(108)),
            Path(1),
            Json(BookingStatusUpdate {
                status: BookingStatus::Confirmed,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(db.status_updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn updating_unknown_booking_is_not_found() {
        let db = Arc::new(MockDb::default().with_artist(artist(7, 107, SubscriptionTier::Premium)));
        let state = test_state(db);

        let resp = update_booking_status(
            AxumState(state),
            AuthSession(claims_for(107)),
            Path(999),
            Json(BookingStatusUpdate {
                status: BookingStatus::Confirmed,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
