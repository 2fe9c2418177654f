use async_trait::async_trait;

use crate::models::booking::{Booking, BookingStatus, NewBooking};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(
        &self,
        booking: &NewBooking,
        user_id: Option<i64>,
    ) -> Result<Booking, sqlx::Error>;

    async fn find_booking_by_id(&self, id: i64) -> Result<Option<Booking>, sqlx::Error>;

    async fn list_bookings_for_artist(&self, artist_id: i64) -> Result<Vec<Booking>, sqlx::Error>;

    async fn list_bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, sqlx::Error>;

    /// Stores the checkout session reference created for this booking's deposit.
    async fn set_checkout_session(&self, id: i64, session_id: &str) -> Result<(), sqlx::Error>;

    /// Applies the paid-deposit confirmation as one statement: status,
    /// deposit_paid, deposit_amount and the payment reference move together.
    async fn confirm_deposit(
        &self,
        id: i64,
        payment_intent_id: &str,
        amount: i64,
    ) -> Result<(), sqlx::Error>;

    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<(), sqlx::Error>;
}
