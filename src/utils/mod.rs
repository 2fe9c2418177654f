pub mod booking_lifecycle;
pub mod jwt;
pub mod tier_limits;
