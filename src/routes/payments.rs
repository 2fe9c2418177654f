use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::models::artist::{SubscriptionTier, TierChange, TierChangeReason};
use crate::models::booking::BookingStatus;
use crate::models::product::{BillingInterval, BOOKING_DEPOSIT};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::services::stripe::{CheckoutMode, CreateCheckoutSessionRequest, InlineProduct};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositCheckoutPayload {
    pub booking_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionCheckoutPayload {
    pub interval: BillingInterval,
}

// POST /api/payments/checkout/deposit
//
// Guests book and pay without an account, so this endpoint is public; the
// booking id is the only handle the client holds.
pub async fn create_deposit_checkout(
    State(app_state): State<AppState>,
    Json(payload): Json<DepositCheckoutPayload>,
) -> Response {
    let booking = match app_state
        .bookings
        .find_booking_by_id(payload.booking_id)
        .await
    {
        Ok(Some(b)) => b,
        Ok(None) => return JsonResponse::not_found("Booking not found").into_response(),
        Err(err) => {
            error!(?err, booking_id = payload.booking_id, "failed to load booking");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    if booking.status != BookingStatus::Pending || booking.deposit_paid {
        return JsonResponse::conflict("Booking is not awaiting a deposit").into_response();
    }

    let request = CreateCheckoutSessionRequest {
        mode: CheckoutMode::Payment,
        success_url: app_state.config.payment_success_url(),
        cancel_url: app_state.config.payment_cancel_url(),
        customer_email: Some(booking.customer_email.clone()),
        product: Some(InlineProduct {
            name: BOOKING_DEPOSIT.name.to_string(),
            description: BOOKING_DEPOSIT.description.to_string(),
            amount: BOOKING_DEPOSIT.amount,
        }),
        price_id: None,
        metadata: Some(BTreeMap::from([(
            "bookingId".to_string(),
            booking.id.to_string(),
        )])),
    };

    let session = match app_state.stripe.create_checkout_session(request).await {
        Ok(s) => s,
        Err(err) => {
            error!(?err, booking_id = booking.id, "failed to create deposit checkout");
            return JsonResponse::server_error("Failed to create checkout session")
                .into_response();
        }
    };

    if let Err(err) = app_state
        .bookings
        .set_checkout_session(booking.id, &session.id)
        .await
    {
        error!(?err, booking_id = booking.id, session_id = %session.id, "failed to store checkout session");
        return JsonResponse::server_error("Database error").into_response();
    }

    info!(booking_id = booking.id, session_id = %session.id, "deposit checkout created");
    Json(json!({ "success": true, "sessionId": session.id, "url": session.url }))
        .into_response()
}

// POST /api/payments/checkout/subscription
pub async fn create_subscription_checkout(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Json(payload): Json<SubscriptionCheckoutPayload>,
) -> Response {
    let artist = match app_state.artists.find_artist_by_user_id(claims.id).await {
        Ok(Some(a)) => a,
        Ok(None) => return JsonResponse::not_found("Artist profile not found").into_response(),
        Err(err) => {
            error!(?err, user_id = claims.id, "failed to load artist profile");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    if artist.subscription_tier == SubscriptionTier::Premium {
        return JsonResponse::conflict("Artist is already on the premium plan").into_response();
    }

    let price_id = match payload.interval {
        BillingInterval::Monthly => app_state.config.stripe.premium_monthly_price_id.clone(),
        BillingInterval::Yearly => app_state.config.stripe.premium_yearly_price_id.clone(),
    };

    let request = CreateCheckoutSessionRequest {
        mode: CheckoutMode::Subscription,
        success_url: app_state.config.payment_success_url(),
        cancel_url: app_state.config.payment_cancel_url(),
        customer_email: Some(claims.email.clone()),
        product: None,
        price_id: Some(price_id),
        metadata: Some(BTreeMap::from([(
            "artistId".to_string(),
            artist.id.to_string(),
        )])),
    };

    let session = match app_state.stripe.create_checkout_session(request).await {
        Ok(s) => s,
        Err(err) => {
            error!(?err, artist_id = artist.id, "failed to create subscription checkout");
            return JsonResponse::server_error("Failed to create checkout session")
                .into_response();
        }
    };

    info!(
        artist_id = artist.id,
        interval = payload.interval.as_str(),
        session_id = %session.id,
        "subscription checkout created"
    );
    Json(json!({ "success": true, "sessionId": session.id, "url": session.url }))
        .into_response()
}

// POST /api/payments/subscription/cancel
//
// Downgrades immediately rather than waiting for the processor's deletion
// event; the event still arrives later and re-applies the same final state.
pub async fn cancel_subscription(
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

    let subscription_id = match artist.stripe_subscription_id.as_deref() {
        Some(id) => id,
        None => return JsonResponse::conflict("No active subscription").into_response(),
    };

    if let Err(err) = app_state.stripe.cancel_subscription(subscription_id).await {
        error!(?err, artist_id = artist.id, subscription_id, "failed to cancel subscription");
        return JsonResponse::server_error("Failed to cancel subscription").into_response();
    }

    let change = TierChange {
        artist_id: artist.id,
        tier: SubscriptionTier::Free,
        stripe_subscription_id: None,
        reason: TierChangeReason::CancelledByUser,
        event_id: None,
    };
    if let Err(err) = app_state.artists.update_subscription(&change).await {
        error!(?err, artist_id = artist.id, "failed to downgrade after cancellation");
        return JsonResponse::server_error("Database error").into_response();
    }

    info!(
        artist_id = artist.id,
        reason = change.reason.as_str(),
        "subscription cancelled"
    );
    JsonResponse::success("Subscription cancelled").into_response()
}
