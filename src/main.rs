mod config;
mod db;
mod models;
mod responses;
mod routes;
mod services;
mod state;
pub mod utils;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::http::Method;
use axum::{
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Router,
};
use config::Config;
use db::postgres_artist_repository::PostgresArtistRepository;
use db::postgres_booking_repository::PostgresBookingRepository;
use db::postgres_portfolio_repository::PostgresPortfolioRepository;
use db::postgres_review_repository::PostgresReviewRepository;
use db::postgres_user_repository::PostgresUserRepository;
use db::postgres_webhook_event_log_repository::PostgresWebhookEventLogRepository;
use responses::JsonResponse;
use routes::auth::{handle_logout, handle_me};
use routes::{
    artists::{
        create_artist_profile, get_artist, get_artist_analytics, list_artists, search_artists,
        update_artist_profile,
    },
    bookings::{create_booking, list_artist_bookings, list_my_bookings, update_booking_status},
    entitlements::get_entitlements,
    payments::{cancel_subscription, create_deposit_checkout, create_subscription_checkout},
    portfolio::{add_portfolio_image, delete_portfolio_image, list_portfolio},
    reviews::{create_review, list_reviews, respond_to_review},
    stripe::webhook,
};
use sqlx::PgPool;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::db::{
    artist_repository::ArtistRepository, booking_repository::BookingRepository,
    portfolio_repository::PortfolioRepository, review_repository::ReviewRepository,
    user_repository::UserRepository, webhook_event_log_repository::WebhookEventLogRepository,
};
use crate::services::smtp_mailer::SmtpMailer;
use crate::services::stripe::{LiveStripeGateway, PaymentGateway};
use crate::state::AppState;
use crate::utils::jwt::JwtKeys;

#[cfg(feature = "tls")]
use axum_server::tls_rustls::RustlsConfig;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let rate_limit_ms: u64 = std::env::var("RATE_LIMITER_MILLISECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        // Default: 200ms/token (~5 req/sec)
        .unwrap_or(200);
    let rate_limit_burst: u32 = std::env::var("RATE_LIMITER_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        // Default: allow short bursts during client polling
        .unwrap_or(20);
    let global_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(rate_limit_ms)
            .burst_size(rate_limit_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .unwrap(),
    );

    let rate_limit_auth_s: u64 = std::env::var("RATE_LIMITER_AUTH_SECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1);
    let rate_limit_auth_burst: u32 = std::env::var("RATE_LIMITER_AUTH_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(10);
    // Stricter limiter for /api/auth/*
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(rate_limit_auth_s)
            .burst_size(rate_limit_auth_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .unwrap(),
    );

    // Background task to cleanup old IPs
    let global_limiter = global_governor_conf.limiter().clone();
    let auth_limiter = auth_governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = std::time::Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            global_limiter.retain_recent();
            auth_limiter.retain_recent();
        }
    });

    let config = Arc::new(Config::from_env());
    let jwt_keys = Arc::new(JwtKeys::from_env().expect("JWT_SECRET must be set and strong"));

    let pg_pool = establish_connection(&config.database_url).await;
    let user_repo = Arc::new(PostgresUserRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn UserRepository>;
    let artist_repo = Arc::new(PostgresArtistRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn ArtistRepository>;
    let booking_repo = Arc::new(PostgresBookingRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn BookingRepository>;
    let portfolio_repo = Arc::new(PostgresPortfolioRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn PortfolioRepository>;
    let review_repo = Arc::new(PostgresReviewRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn ReviewRepository>;
    let event_log_repo = Arc::new(PostgresWebhookEventLogRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn WebhookEventLogRepository>;

    // Initialize mailer
    let mailer = Arc::new(SmtpMailer::new().expect("Failed to initialize mailer"));
    let stripe_gateway =
        Arc::new(LiveStripeGateway::from_settings(&config.stripe)) as Arc<dyn PaymentGateway>;

    let state = AppState {
        users: user_repo,
        artists: artist_repo,
        bookings: booking_repo,
        portfolio: portfolio_repo,
        reviews: review_repo,
        event_log: event_log_repo,
        stripe: stripe_gateway,
        mailer,
        config: config.clone(),
        jwt_keys,
    };

    let cors = CorsLayer::new()
        .allow_origin(config.frontend_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/me", get(handle_me))
        .route("/logout", post(handle_logout))
        .layer(GovernorLayer {
            config: auth_governor_conf.clone(),
        });

    let artist_routes = Router::new()
        .route("/", get(list_artists).post(create_artist_profile))
        .route("/search", get(search_artists))
        .route("/me", put(update_artist_profile))
        .route("/{id}", get(get_artist))
        .route("/{id}/analytics", get(get_artist_analytics))
        .route("/{id}/portfolio", get(list_portfolio))
        .route("/{id}/reviews", get(list_reviews));

    let portfolio_routes = Router::new()
        .route("/", post(add_portfolio_image))
        .route("/{id}", delete(delete_portfolio_image));

    let review_routes = Router::new()
        .route("/", post(create_review))
        .route("/{id}/response", post(respond_to_review));

    let booking_routes = Router::new()
        .route("/", post(create_booking))
        .route("/artist", get(list_artist_bookings))
        .route("/mine", get(list_my_bookings))
        .route("/{id}/status", patch(update_booking_status));

    let payment_routes = Router::new()
        .route("/checkout/deposit", post(create_deposit_checkout))
        .route("/checkout/subscription", post(create_subscription_checkout))
        .route("/subscription/cancel", post(cancel_subscription));

    // Public webhook route (raw body, no auth)
    let stripe_routes = Router::new().route("/webhook", post(webhook));

    let app = Router::new()
        .route("/", get(root))
        .route("/api/entitlements/{tier}", get(get_entitlements))
        .nest("/api/auth", auth_routes)
        .nest("/api/artists", artist_routes)
        .nest("/api/portfolio", portfolio_routes)
        .nest("/api/reviews", review_routes)
        .nest("/api/bookings", booking_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/stripe", stripe_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer {
            config: global_governor_conf.clone(),
        })
        .layer(cors);

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));

    #[cfg(feature = "tls")]
    {
        // TLS: Only run this block when `--features tls` is used
        let tls_config = RustlsConfig::from_pem_file(
            std::env::var("DEV_CERT_LOCATION").unwrap(),
            std::env::var("DEV_KEY_LOCATION").unwrap(),
        )
        .await
        .expect("Failed to load TLS certs");

        println!("Running with TLS at https://{}", addr);
        let _ = axum_server::bind_rustls(addr, tls_config)
            .serve(make_service)
            .await;

        return; // Skip the fallback if TLS was used
    }

    let listener = TcpListener::bind(addr).await.unwrap();
    println!("Running without TLS at http://{}", addr);
    axum::serve(listener, make_service).await.unwrap();
}

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("Hello, InkMarket!").into_response()
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> PgPool {
    let pool = PgPool::connect(database_url)
        .await
        .expect("Failed to connect to the database");

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .expect("Failed to verify database connection");

    info!("✅ Successfully connected to the database");
    pool
}
