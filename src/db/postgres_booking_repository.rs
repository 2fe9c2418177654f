use crate::db::booking_repository::BookingRepository;
use crate::models::booking::{Booking, BookingStatus, NewBooking};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

pub struct PostgresBookingRepository {
    pub pool: PgPool,
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn create_booking(
        &self,
        booking: &NewBooking,
        user_id: Option<i64>,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<Postgres, Booking>(
            r#"
            INSERT INTO bookings (
                artist_id, user_id, customer_name, customer_email, customer_phone,
                preferred_date, tattoo_description, placement, size, budget, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(booking.artist_id)
        .bind(user_id)
        .bind(booking.customer_name.trim())
        .bind(booking.customer_email.trim())
        .bind(booking.customer_phone.trim())
        .bind(booking.preferred_date)
        .bind(booking.tattoo_description.trim())
        .bind(booking.placement.trim())
        .bind(booking.size)
        .bind(booking.budget.as_deref())
        .bind(booking.notes.as_deref())
        .fetch_one(&self.pool)
        .await
    }

    async fn find_booking_by_id(&self, id: i64) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<Postgres, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_bookings_for_artist(&self, artist_id: i64) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<Postgres, Booking>(
            "SELECT * FROM bookings WHERE artist_id = $1 ORDER BY created_at DESC",
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<Postgres, Booking>(
            "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn set_checkout_session(&self, id: i64, session_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query::<Postgres>(
            "UPDATE bookings SET stripe_checkout_session_id = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn confirm_deposit(
        &self,
        id: i64,
        payment_intent_id: &str,
        amount: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query::<Postgres>(
            r#"
            UPDATE bookings
            SET status = 'confirmed',
                deposit_paid = TRUE,
                deposit_amount = $2,
                stripe_payment_intent_id = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(amount)
        .bind(payment_intent_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<(), sqlx::Error> {
        sqlx::query::<Postgres>("UPDATE bookings SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
