use crate::config::Config;
use crate::db::{
    artist_repository::ArtistRepository, booking_repository::BookingRepository,
    portfolio_repository::PortfolioRepository, review_repository::ReviewRepository,
    user_repository::UserRepository, webhook_event_log_repository::WebhookEventLogRepository,
};
use crate::services::smtp_mailer::Mailer;
use crate::services::stripe::PaymentGateway;
use crate::utils::jwt::JwtKeys;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub artists: Arc<dyn ArtistRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub portfolio: Arc<dyn PortfolioRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub event_log: Arc<dyn WebhookEventLogRepository>,
    pub stripe: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
    pub jwt_keys: Arc<JwtKeys>,
}
