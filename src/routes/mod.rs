pub mod artists;
pub mod auth;
pub mod bookings;
pub mod entitlements;
pub mod payments;
pub mod portfolio;
pub mod reviews;
pub mod stripe;
