//! Row structs for the check-in tables.
//!
//! Status columns are stored as lowercase `TEXT` and parsed into the core
//! enums when a row is converted; a value outside the CHECK constraint is
//! surfaced as a decode error rather than silently mapped.

pub mod checkin_record;
pub mod checkin_session;
pub mod course;
pub mod enrollment;
pub mod user;
