pub mod auth;
pub mod checkin;
