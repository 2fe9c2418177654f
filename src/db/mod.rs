pub mod artist_repository;
pub mod booking_repository;
pub mod mock_db;
pub mod mock_webhook_event_log_repository;
pub mod portfolio_repository;
pub mod postgres_artist_repository;
pub mod postgres_booking_repository;
pub mod postgres_portfolio_repository;
pub mod postgres_review_repository;
pub mod postgres_user_repository;
pub mod postgres_webhook_event_log_repository;
pub mod review_repository;
pub mod user_repository;
pub mod webhook_event_log_repository;
