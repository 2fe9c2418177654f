pub mod artist;
pub mod booking;
pub mod portfolio;
pub mod product;
pub mod review;
pub mod user;
