//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod checkin_record_repo;
pub mod checkin_session_repo;
pub mod course_repo;
pub mod enrollment_repo;
pub mod user_repo;

pub use checkin_record_repo::CheckinRecordRepo;
pub use checkin_session_repo::CheckinSessionRepo;
pub use course_repo::CourseRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use user_repo::UserRepo;
