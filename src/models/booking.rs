use core::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use time::OffsetDateTime;

#[derive(sqlx::Type, Debug, Deserialize, Serialize, PartialEq, Eq, Copy, Clone)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")] // match your PostgreSQL type
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// No transition is defined out of a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "size_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Debug, FromRow, Serialize, Clone)]
pub struct Booking {
    pub id: i64,
    pub artist_id: i64,
    pub user_id: Option<i64>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub preferred_date: Option<OffsetDateTime>,
    pub tattoo_description: String,
    pub placement: String,
    pub size: SizeCategory,
    pub budget: Option<String>,
    pub notes: Option<String>,
    pub stripe_checkout_session_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub deposit_amount: Option<i64>,
    pub deposit_paid: bool,
    pub status: BookingStatus,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub artist_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub preferred_date: Option<OffsetDateTime>,
    pub tattoo_description: String,
    pub placement: String,
    pub size: SizeCategory,
    pub budget: Option<String>,
    pub notes: Option<String>,
}

impl NewBooking {
    /// Contact fields are required; the rest is free-form.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.customer_name.trim().is_empty() {
            return Err("Name is required");
        }
        let email = self.customer_email.trim();
        if email.is_empty() || !email.contains('@') || email.starts_with('@') || email.ends_with('@')
        {
            return Err("A valid email is required");
        }
        if self.customer_phone.trim().is_empty() {
            return Err("Phone number is required");
        }
        if self.tattoo_description.trim().is_empty() {
            return Err("Tattoo description is required");
        }
        if self.placement.trim().is_empty() {
            return Err("Placement is required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewBooking {
        NewBooking {
            artist_id: 1,
            customer_name: "Ada".into(),
            customer_email: "ada@example.com".into(),
            customer_phone: "555-0100".into(),
            preferred_date: None,
            tattoo_description: "Small fern on forearm".into(),
            placement: "forearm".into(),
            size: SizeCategory::Small,
            budget: None,
            notes: None,
        }
    }

    #[test]
    fn accepts_complete_request() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        let mut req = sample();
        req.customer_name = "   ".into();
        assert_eq!(req.validate(), Err("Name is required"));
    }

    #[test]
    fn rejects_malformed_email() {
        let mut req = sample();
        req.customer_email = "not-an-email".into();
        assert!(req.validate().is_err());
        req.customer_email = "@example.com".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
    }
}
