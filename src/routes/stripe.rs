use axum::Json;
use axum::{extract::State, http::HeaderMap, response::IntoResponse};
use axum::{http::StatusCode, response::Response};
use serde_json::json;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::models::artist::{SubscriptionTier, TierChange, TierChangeReason};
use crate::models::booking::BookingStatus;
use crate::responses::JsonResponse;
use crate::services::stripe::signature::verify_signature;
use crate::state::AppState;

// Small helper: nested json lookup
fn jget<'a>(val: &'a serde_json::Value, path: &[&str]) -> Option<&'a serde_json::Value> {
    let mut cur = val;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

fn extract_str<'a>(val: &'a serde_json::Value, path: &[&str]) -> Option<&'a str> {
    jget(val, path)?.as_str()
}

fn extract_i64(val: &serde_json::Value, path: &[&str]) -> Option<i64> {
    jget(val, path)?.as_i64()
}

/// Correlation ids ride along as string metadata on the checkout session.
/// The metadata map is untrusted input; parse, never assume shape.
fn extract_metadata_id(event: &serde_json::Value, key: &str) -> Option<i64> {
    extract_str(event, &["data", "object", "metadata", key])?
        .trim()
        .parse::<i64>()
        .ok()
}

fn ack() -> Response {
    Json(json!({ "received": true })).into_response()
}

// POST /api/stripe/webhook
//
// Reconciles processor events into booking and subscription state. Delivery
// is at-least-once and unordered, so every mutation below sets a final value
// rather than toggling; replaying any event leaves the same end state.
pub async fn webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let sig = match headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok())
    {
        Some(s) => s,
        None => return JsonResponse::bad_request("Missing Stripe-Signature").into_response(),
    };

    // Verify against the raw bytes before parsing anything; re-encoding the
    // JSON could change the byte layout and break the signature.
    let now = OffsetDateTime::now_utc().unix_timestamp();
    if let Err(err) = verify_signature(&body, sig, &app_state.config.stripe.webhook_secret, now) {
        warn!(?err, "stripe webhook signature verification failed");
        return (StatusCode::BAD_REQUEST, "invalid webhook").into_response();
    }

    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(val) => val,
        Err(err) => {
            warn!(?err, "stripe webhook payload is not valid JSON");
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };

    let event_id = match event.get("id").and_then(|v| v.as_str()) {
        Some(id) => id,
        None => {
            warn!("stripe webhook payload missing event id");
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };
    let event_type = event.get("type").and_then(|v| v.as_str()).unwrap_or("");

    // Endpoint verification events from the processor dashboard; acknowledged
    // without touching persisted state.
    if event_id.starts_with("evt_test_") {
        info!(event_id, "acknowledging sandbox verification event");
        return Json(json!({ "verified": true })).into_response();
    }

    match app_state.event_log.has_processed_event(event_id).await {
        Ok(true) => {
            info!(event_id, event_type, "skipping already-processed event");
            return ack();
        }
        Ok(false) => {}
        Err(err) => {
            // The transitions below are idempotent, so losing the fast path
            // only costs a redundant update.
            warn!(?err, event_id, "event log lookup failed, processing anyway");
        }
    }

    match event_type {
        "checkout.session.completed" => {
            match extract_str(&event, &["data", "object", "mode"]) {
                Some("payment") => {
                    let booking_id = match extract_metadata_id(&event, "bookingId") {
                        Some(id) => id,
                        None => {
                            warn!(
                                event_id,
                                "checkout completion without usable bookingId metadata"
                            );
                            return ack();
                        }
                    };

                    let payment_intent =
                        extract_str(&event, &["data", "object", "payment_intent"]);
                    let amount_total = extract_i64(&event, &["data", "object", "amount_total"]);
                    let (payment_intent, amount_total) = match (payment_intent, amount_total) {
                        (Some(pi), Some(amount)) => (pi, amount),
                        _ => {
                            warn!(
                                event_id,
                                booking_id, "checkout completion missing payment fields"
                            );
                            return ack();
                        }
                    };

                    let booking = match app_state.bookings.find_booking_by_id(booking_id).await {
                        Ok(Some(b)) => b,
                        Ok(None) => {
                            // Permanent: retrying can never succeed, so ack.
                            warn!(
                                event_id,
                                booking_id, "checkout completion for unknown booking"
                            );
                            return ack();
                        }
                        Err(err) => {
                            error!(?err, event_id, booking_id, "failed to load booking");
                            return JsonResponse::server_error("Failed to process event")
                                .into_response();
                        }
                    };

                    match booking.status {
                        BookingStatus::Pending | BookingStatus::Confirmed => {
                            if let Err(err) = app_state
                                .bookings
                                .confirm_deposit(booking_id, payment_intent, amount_total)
                                .await
                            {
                                error!(
                                    ?err,
                                    event_id, booking_id, "failed to confirm booking deposit"
                                );
                                return JsonResponse::server_error("Failed to process event")
                                    .into_response();
                            }
                            info!(
                                event_id,
                                booking_id, amount_total, "booking deposit confirmed"
                            );

                            // Receipt is best-effort; a mail outage must not
                            // fail the webhook.
                            let shop_name = app_state
                                .artists
                                .find_artist_by_id(booking.artist_id)
                                .await
                                .ok()
                                .flatten()
                                .map(|a| a.shop_name)
                                .unwrap_or_else(|| "your artist".to_string());
                            if let Err(err) = app_state
                                .mailer
                                .send_deposit_receipt(
                                    &booking.customer_email,
                                    &booking.customer_name,
                                    &shop_name,
                                    amount_total,
                                )
                                .await
                            {
                                warn!(
                                    ?err,
                                    event_id, booking_id, "failed to send deposit receipt"
                                );
                            }
                        }
                        BookingStatus::Cancelled | BookingStatus::Completed => {
                            info!(
                                event_id,
                                booking_id,
                                status = %booking.status,
                                "ignoring payment for booking in terminal state"
                            );
                        }
                    }
                }
                Some("subscription") => {
                    let artist_id = match extract_metadata_id(&event, "artistId") {
                        Some(id) => id,
                        None => {
                            warn!(
                                event_id,
                                "subscription checkout without usable artistId metadata"
                            );
                            return ack();
                        }
                    };

                    let artist = match app_state.artists.find_artist_by_id(artist_id).await {
                        Ok(Some(a)) => a,
                        Ok(None) => {
                            warn!(
                                event_id,
                                artist_id, "subscription checkout for unknown artist"
                            );
                            return ack();
                        }
                        Err(err) => {
                            error!(?err, event_id, artist_id, "failed to load artist");
                            return JsonResponse::server_error("Failed to process event")
                                .into_response();
                        }
                    };

                    let subscription_id = extract_str(&event, &["data", "object", "subscription"]);
                    if subscription_id.is_none() {
                        // Upgrade anyway; without the stored id a later
                        // processor-side cancellation cannot be correlated.
                        warn!(
                            event_id,
                            artist_id, "subscription checkout without subscription id"
                        );
                    }
                    let change = TierChange {
                        artist_id,
                        tier: SubscriptionTier::Premium,
                        stripe_subscription_id: subscription_id.map(|s| s.to_string()),
                        reason: TierChangeReason::UpgradedByPayment,
                        event_id: Some(event_id.to_string()),
                    };
                    if let Err(err) = app_state.artists.update_subscription(&change).await {
                        error!(?err, event_id, artist_id, "failed to upgrade artist tier");
                        return JsonResponse::server_error("Failed to process event")
                            .into_response();
                    }
                    info!(
                        event_id,
                        artist_id,
                        reason = change.reason.as_str(),
                        "artist upgraded to premium"
                    );

                    match app_state.users.find_user_email_by_id(artist.user_id).await {
                        Ok(Some(email)) => {
                            if let Err(err) = app_state
                                .mailer
                                .send_subscription_receipt(&email, &artist.shop_name)
                                .await
                            {
                                warn!(
                                    ?err,
                                    event_id, artist_id, "failed to send subscription receipt"
                                );
                            }
                        }
                        Ok(None) => {
                            warn!(event_id, artist_id, "no email on file for upgraded artist");
                        }
                        Err(err) => {
                            warn!(?err, event_id, artist_id, "failed to look up artist email");
                        }
                    }
                }
                mode => {
                    warn!(event_id, ?mode, "checkout completion with unhandled mode");
                }
            }
        }
        "customer.subscription.deleted" => {
            let subscription_id = match extract_str(&event, &["data", "object", "id"]) {
                Some(id) => id,
                None => {
                    warn!(event_id, "subscription deletion without subscription id");
                    return ack();
                }
            };

            let artist = match app_state
                .artists
                .find_artist_by_subscription_id(subscription_id)
                .await
            {
                Ok(Some(a)) => a,
                Ok(None) => {
                    // Either never correlated or already downgraded; ack.
                    info!(
                        event_id,
                        subscription_id, "subscription deletion for unknown subscription"
                    );
                    return ack();
                }
                Err(err) => {
                    error!(
                        ?err,
                        event_id, subscription_id, "failed to resolve subscription"
                    );
                    return JsonResponse::server_error("Failed to process event").into_response();
                }
            };

            let change = TierChange {
                artist_id: artist.id,
                tier: SubscriptionTier::Free,
                stripe_subscription_id: None,
                reason: TierChangeReason::DowngradedByProcessor,
                event_id: Some(event_id.to_string()),
            };
            if let Err(err) = app_state.artists.update_subscription(&change).await {
                error!(
                    ?err,
                    event_id,
                    artist_id = artist.id,
                    "failed to downgrade artist tier"
                );
                return JsonResponse::server_error("Failed to process event").into_response();
            }
            info!(
                event_id,
                artist_id = artist.id,
                reason = change.reason.as_str(),
                "artist downgraded to free"
            );
        }
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "payment_intent.succeeded"
        | "payment_intent.payment_failed" => {
            // Observability only; the authoritative state change happens on
            // checkout.session.completed.
            info!(event_id, event_type, "observed billing event");
        }
        other => {
            info!(event_id, event_type = other, "ignoring unhandled event type");
        }
    }

    // Best-effort: the mutations above are idempotent, so a lost log entry
    // means a redundant update on redelivery, not corruption.
    if let Err(err) = app_state.event_log.record_event(event_id).await {
        warn!(?err, event_id, "failed to record processed event");
    }

    ack()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State as AxumState;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use serde_json::json;
    use time::OffsetDateTime;

    use super::webhook;
    use crate::config::{Config, StripeSettings};
    use crate::db::mock_db::MockDb;
    use crate::db::mock_webhook_event_log_repository::MockWebhookEventLogRepository;
    use crate::models::artist::{Artist, SubscriptionTier, TierChangeReason};
    use crate::models::booking::{Booking, BookingStatus, SizeCategory};
    use crate::models::user::{PublicUser, UserRole};
    use crate::services::smtp_mailer::MockMailer;
    use crate::services::stripe::signature::signature_header;
    use crate::services::stripe::MockStripeGateway;
    use crate::state::AppState;
    use crate::utils::jwt::JwtKeys;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            database_url: "postgres://localhost/test".into(),
            frontend_origin: "http://localhost:5173".into(),
            auth_cookie_secure: true,
            jwt_issuer: "test-issuer".into(),
            jwt_audience: "test-audience".into(),
            stripe: StripeSettings {
                secret_key: "sk_test_123".into(),
                webhook_secret: WEBHOOK_SECRET.into(),
                premium_monthly_price_id: "price_monthly".into(),
                premium_yearly_price_id: "price_yearly".into(),
            },
        })
    }

    fn test_state(
        db: Arc<MockDb>,
        event_log: Arc<MockWebhookEventLogRepository>,
        mailer: Arc<MockMailer>,
    ) -> AppState {
        AppState {
            users: db.clone(),
            artists: db.clone(),
            bookings: db.clone(),
            portfolio: db.clone(),
            reviews: db,
            event_log,
            stripe: Arc::new(MockStripeGateway::new()),
            mailer,
            config: test_config(),
            jwt_keys: Arc::new(
                JwtKeys::from_secret("0123456789abcdef0123456789abcdef").unwrap(),
            ),
        }
    }

    fn pending_booking(id: i64, artist_id: i64) -> Booking {
        Booking {
            id,
            artist_id,
            user_id: None,
            customer_name: "Ada Lovelace".into(),
            customer_email: "ada@example.com".into(),
            customer_phone: "555-0199".into(),
            preferred_date: None,
            tattoo_description: "Fern wrapping the forearm".into(),
            placement: "Left forearm".into(),
            size: SizeCategory::Medium,
            budget: None,
            notes: None,
            stripe_checkout_session_id: Some("cs_live_123".into()),
            stripe_payment_intent_id: None,
            deposit_amount: None,
            deposit_paid: false,
            status: BookingStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn artist(id: i64, tier: SubscriptionTier) -> Artist {
        Artist {
            id,
            user_id: id + 100,
            shop_name: "Iron Anchor Tattoo".into(),
            bio: None,
            specialties: None,
            styles: Some(vec!["traditional".into()]),
            years_experience: Some(8),
            address: Some("12 Harbor St".into()),
            city: Some("Portland".into()),
            state: Some("OR".into()),
            zip: Some("97201".into()),
            phone: Some("555-0100".into()),
            website: None,
            instagram: None,
            is_approved: true,
            average_rating: Some(4.8),
            total_reviews: 12,
            subscription_tier: tier,
            stripe_subscription_id: match tier {
                SubscriptionTier::Premium => Some("sub_123".into()),
                SubscriptionTier::Free => None,
            },
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn deposit_completed_event(event_id: &str, booking_id: &str) -> serde_json::Value {
        json!({
            "id": event_id,
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_live_123",
                "mode": "payment",
                "amount_total": 5000,
                "payment_intent": "pi_abc",
                "metadata": { "bookingId": booking_id }
            }}
        })
    }

    fn subscription_completed_event(event_id: &str, artist_id: &str) -> serde_json::Value {
        json!({
            "id": event_id,
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_live_456",
                "mode": "subscription",
                "subscription": "sub_123",
                "metadata": { "artistId": artist_id }
            }}
        })
    }

    fn signed_headers(payload: &str) -> HeaderMap {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let mut headers = HeaderMap::new();
        headers.insert(
            "Stripe-Signature",
            HeaderValue::from_str(&signature_header(payload, WEBHOOK_SECRET, now)).unwrap(),
        );
        headers
    }

    async fn deliver(state: &AppState, event: &serde_json::Value) -> axum::response::Response {
        let payload = serde_json::to_string(event).unwrap();
        let headers = signed_headers(&payload);
        webhook(
            AxumState(state.clone()),
            headers,
            axum::body::Bytes::from(payload),
        )
        .await
    }

    #[tokio::test]
    async fn payment_completion_confirms_pending_booking() {
        let db = Arc::new(MockDb::default().with_booking(pending_booking(42, 7)));
        let event_log = Arc::new(MockWebhookEventLogRepository::default());
        let mailer = Arc::new(MockMailer::default());
        let state = test_state(db.clone(), event_log.clone(), mailer.clone());

        let resp = deliver(&state, &deposit_completed_event("evt_100", "42")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let booking = db.bookings.lock().unwrap()[0].clone();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(booking.deposit_paid);
        assert_eq!(booking.deposit_amount, Some(5000));
        assert_eq!(booking.stripe_payment_intent_id.as_deref(), Some("pi_abc"));

        assert_eq!(
            db.confirm_deposit_calls.lock().unwrap().as_slice(),
            &[(42, "pi_abc".to_string(), 5000)]
        );
        assert!(event_log.recorded_events().contains(&"evt_100".to_string()));
    }

    #[tokio::test]
    async fn payment_completion_sends_deposit_receipt() {
        let db = Arc::new(
            MockDb::default()
                .with_booking(pending_booking(42, 7))
                .with_artist(artist(7, SubscriptionTier::Premium)),
        );
        let mailer = Arc::new(MockMailer::default());
        let state = test_state(
            db,
            Arc::new(MockWebhookEventLogRepository::default()),
            mailer.clone(),
        );

        let resp = deliver(&state, &deposit_completed_event("evt_100", "42")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let receipts = mailer.sent_deposit_receipts.lock().unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].to, "ada@example.com");
        assert_eq!(receipts[0].shop_name, "Iron Anchor Tattoo");
        assert_eq!(receipts[0].amount, 5000);
    }

    #[tokio::test]
    async fn receipt_failure_does_not_fail_the_webhook() {
        let db = Arc::new(MockDb::default().with_booking(pending_booking(42, 7)));
        let mailer = Arc::new(MockMailer {
            fail_send: true,
            ..MockMailer::default()
        });
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            mailer,
        );

        let resp = deliver(&state, &deposit_completed_event("evt_100", "42")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            db.bookings.lock().unwrap()[0].status,
            BookingStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn unknown_booking_is_acked_without_mutation() {
        let db = Arc::new(MockDb::default());
        let mailer = Arc::new(MockMailer::default());
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            mailer.clone(),
        );

        let resp = deliver(&state, &deposit_completed_event("evt_101", "9999")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(db.confirm_deposit_calls.lock().unwrap().is_empty());
        assert!(db.bookings.lock().unwrap().is_empty());
        assert!(mailer.sent_deposit_receipts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_booking_metadata_is_acked_without_mutation() {
        let db = Arc::new(MockDb::default().with_booking(pending_booking(42, 7)));
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let resp = deliver(&state, &deposit_completed_event("evt_102", "not-a-number")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(db.confirm_deposit_calls.lock().unwrap().is_empty());
        assert_eq!(
            db.bookings.lock().unwrap()[0].status,
            BookingStatus::Pending
        );
    }

    #[tokio::test]
    async fn missing_payment_fields_are_acked_without_mutation() {
        let db = Arc::new(MockDb::default().with_booking(pending_booking(42, 7)));
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let event = json!({
            "id": "evt_103",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_live_123",
                "mode": "payment",
                "metadata": { "bookingId": "42" }
            }}
        });
        let resp = deliver(&state, &event).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(db.confirm_deposit_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_booking_is_not_resurrected_by_late_payment() {
        let mut booking = pending_booking(42, 7);
        booking.status = BookingStatus::Cancelled;
        let db = Arc::new(MockDb::default().with_booking(booking));
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let resp = deliver(&state, &deposit_completed_event("evt_104", "42")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(db.confirm_deposit_calls.lock().unwrap().is_empty());
        assert_eq!(
            db.bookings.lock().unwrap()[0].status,
            BookingStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn duplicate_delivery_leaves_state_unchanged() {
        let db = Arc::new(MockDb::default().with_booking(pending_booking(42, 7)));
        let event_log = Arc::new(MockWebhookEventLogRepository::default());
        let mailer = Arc::new(MockMailer::default());
        let state = test_state(db.clone(), event_log.clone(), mailer.clone());

        let event = deposit_completed_event("evt_100", "42");
        let first = deliver(&state, &event).await;
        assert_eq!(first.status(), StatusCode::OK);
        let second = deliver(&state, &event).await;
        assert_eq!(second.status(), StatusCode::OK);

        // One mutation and one receipt; the redelivery hit the fast path.
        assert_eq!(db.confirm_deposit_calls.lock().unwrap().len(), 1);
        assert_eq!(mailer.sent_deposit_receipts.lock().unwrap().len(), 1);
        let booking = db.bookings.lock().unwrap()[0].clone();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.deposit_amount, Some(5000));
    }

    #[tokio::test]
    async fn reapplying_to_confirmed_booking_is_idempotent() {
        // Redelivery that missed the event log: the transition re-applies to
        // the same final state.
        let mut booking = pending_booking(42, 7);
        booking.status = BookingStatus::Confirmed;
        booking.deposit_paid = true;
        booking.deposit_amount = Some(5000);
        booking.stripe_payment_intent_id = Some("pi_abc".into());
        let db = Arc::new(MockDb::default().with_booking(booking));
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let resp = deliver(&state, &deposit_completed_event("evt_100", "42")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let after = db.bookings.lock().unwrap()[0].clone();
        assert_eq!(after.status, BookingStatus::Confirmed);
        assert!(after.deposit_paid);
        assert_eq!(after.deposit_amount, Some(5000));
        assert_eq!(after.stripe_payment_intent_id.as_deref(), Some("pi_abc"));
    }

    #[tokio::test]
    async fn missing_signature_header_is_rejected() {
        let db = Arc::new(MockDb::default());
        let event_log = Arc::new(MockWebhookEventLogRepository::default());
        let state = test_state(db, event_log.clone(), Arc::new(MockMailer::default()));

        let payload = serde_json::to_string(&deposit_completed_event("evt_100", "42")).unwrap();
        let resp = webhook(
            AxumState(state),
            HeaderMap::new(),
            axum::body::Bytes::from(payload),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(*event_log.checks.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn tampered_payload_is_rejected_before_any_state_access() {
        let db = Arc::new(MockDb::default().with_booking(pending_booking(42, 7)));
        let event_log = Arc::new(MockWebhookEventLogRepository::default());
        let state = test_state(db.clone(), event_log.clone(), Arc::new(MockMailer::default()));

        let payload = serde_json::to_string(&deposit_completed_event("evt_100", "42")).unwrap();
        let headers = signed_headers(&payload);
        let tampered = payload.replace("\"bookingId\":\"42\"", "\"bookingId\":\"43\"");
        let resp = webhook(
            AxumState(state),
            headers,
            axum::body::Bytes::from(tampered),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(*event_log.checks.lock().unwrap(), 0);
        assert!(db.confirm_deposit_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_signature_timestamp_is_rejected() {
        let state = test_state(
            Arc::new(MockDb::default()),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let payload = serde_json::to_string(&deposit_completed_event("evt_100", "42")).unwrap();
        let stale = OffsetDateTime::now_utc().unix_timestamp() - 3600;
        let mut headers = HeaderMap::new();
        headers.insert(
            "Stripe-Signature",
            HeaderValue::from_str(&signature_header(&payload, WEBHOOK_SECRET, stale)).unwrap(),
        );

        let resp = webhook(
            AxumState(state),
            headers,
            axum::body::Bytes::from(payload),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signed_garbage_body_is_rejected() {
        let state = test_state(
            Arc::new(MockDb::default()),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let payload = "not json at all";
        let headers = signed_headers(payload);
        let resp = webhook(
            AxumState(state),
            headers,
            axum::body::Bytes::from(payload),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sandbox_event_short_circuits_without_state_access() {
        let db = Arc::new(MockDb::default().with_booking(pending_booking(42, 7)));
        let event_log = Arc::new(MockWebhookEventLogRepository::default());
        let state = test_state(db.clone(), event_log.clone(), Arc::new(MockMailer::default()));

        let resp = deliver(&state, &deposit_completed_event("evt_test_1", "42")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["verified"], true);

        assert_eq!(*event_log.checks.lock().unwrap(), 0);
        assert_eq!(*event_log.inserts.lock().unwrap(), 0);
        assert!(db.confirm_deposit_calls.lock().unwrap().is_empty());
        assert_eq!(
            db.bookings.lock().unwrap()[0].status,
            BookingStatus::Pending
        );
    }

    #[tokio::test]
    async fn subscription_completion_upgrades_artist() {
        let a = artist(7, SubscriptionTier::Free);
        let db = Arc::new(MockDb::default().with_artist(a.clone()).with_user(PublicUser {
            id: a.user_id,
            email: "artist@example.com".into(),
            name: "Jo Ink".into(),
            role: UserRole::Artist,
        }));
        let event_log = Arc::new(MockWebhookEventLogRepository::default());
        let mailer = Arc::new(MockMailer::default());
        let state = test_state(db.clone(), event_log.clone(), mailer.clone());

        let resp = deliver(&state, &subscription_completed_event("evt_200", "7")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let artist = db.artists.lock().unwrap()[0].clone();
        assert_eq!(artist.subscription_tier, SubscriptionTier::Premium);
        assert_eq!(artist.stripe_subscription_id.as_deref(), Some("sub_123"));

        let ent = artist.entitlements();
        assert!(ent.can_accept_bookings);
        assert!(ent.has_analytics);

        let changes = db.tier_changes.lock().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].reason, TierChangeReason::UpgradedByPayment);
        assert_eq!(changes[0].event_id.as_deref(), Some("evt_200"));

        let receipts = mailer.sent_subscription_receipts.lock().unwrap();
        assert_eq!(
            receipts.as_slice(),
            &[(
                "artist@example.com".to_string(),
                "Iron Anchor Tattoo".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn subscription_completion_for_unknown_artist_is_acked() {
        let db = Arc::new(MockDb::default());
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let resp = deliver(&state, &subscription_completed_event("evt_201", "9999")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(db.tier_changes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn subscription_deletion_downgrades_artist() {
        let db = Arc::new(MockDb::default().with_artist(artist(7, SubscriptionTier::Premium)));
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let event = json!({
            "id": "evt_300",
            "type": "customer.subscription.deleted",
            "data": { "object": { "id": "sub_123" } }
        });
        let resp = deliver(&state, &event).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let artist = db.artists.lock().unwrap()[0].clone();
        assert_eq!(artist.subscription_tier, SubscriptionTier::Free);
        assert_eq!(artist.stripe_subscription_id, None);

        let changes = db.tier_changes.lock().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].reason, TierChangeReason::DowngradedByProcessor);
    }

    #[tokio::test]
    async fn subscription_deletion_for_unknown_subscription_is_acked() {
        let db = Arc::new(MockDb::default().with_artist(artist(7, SubscriptionTier::Free)));
        let state = test_state(
            db.clone(),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let event = json!({
            "id": "evt_301",
            "type": "customer.subscription.deleted",
            "data": { "object": { "id": "sub_unknown" } }
        });
        let resp = deliver(&state, &event).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(db.tier_changes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_returns_500_for_retry() {
        let db = Arc::new(MockDb::failing());
        let event_log = Arc::new(MockWebhookEventLogRepository::default());
        let state = test_state(db, event_log.clone(), Arc::new(MockMailer::default()));

        let resp = deliver(&state, &deposit_completed_event("evt_400", "42")).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Nothing recorded; the processor will redeliver.
        assert_eq!(*event_log.inserts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn observability_events_are_acked_without_mutation() {
        let db = Arc::new(MockDb::default().with_booking(pending_booking(42, 7)));
        let event_log = Arc::new(MockWebhookEventLogRepository::default());
        let state = test_state(db.clone(), event_log.clone(), Arc::new(MockMailer::default()));

        for event_type in [
            "payment_intent.succeeded",
            "payment_intent.payment_failed",
            "customer.subscription.created",
            "customer.subscription.updated",
        ] {
            let event = json!({
                "id": format!("evt_obs_{event_type}"),
                "type": event_type,
                "data": { "object": { "id": "pi_or_sub" } }
            });
            let resp = deliver(&state, &event).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        assert!(db.confirm_deposit_calls.lock().unwrap().is_empty());
        assert!(db.tier_changes.lock().unwrap().is_empty());
        assert_eq!(
            db.bookings.lock().unwrap()[0].status,
            BookingStatus::Pending
        );
        assert_eq!(*event_log.inserts.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn unhandled_event_type_is_acked() {
        let state = test_state(
            Arc::new(MockDb::default()),
            Arc::new(MockWebhookEventLogRepository::default()),
            Arc::new(MockMailer::default()),
        );

        let event = json!({
            "id": "evt_500",
            "type": "charge.refunded",
            "data": { "object": {} }
        });
        let resp = deliver(&state, &event).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["received"], true);
    }
}
