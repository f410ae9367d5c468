//! Domain core of the rollcall attendance service.
//!
//! - [`checkin`] -- statuses, duration bounds, and expiry math.
//! - [`session_code`] -- URL-safe session code generation.
//! - [`store`] -- the [`store::CheckinStore`] persistence capability.
//! - [`service`] -- session lifecycle, attendance recording, roster
//!   reconciliation, and the expiry sweep pass.
//! - [`memory_store`] -- an in-process store with the same constraints as
//!   the database schema.

pub mod checkin;
pub mod clock;
pub mod error;
pub mod memory_store;
pub mod roles;
pub mod service;
pub mod session_code;
pub mod store;
pub mod types;
