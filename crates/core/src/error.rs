use crate::types::DbId;

/// Message shared by every "unknown or closed session code" outcome, so a
/// caller cannot tell a missing session from an ended one.
pub const SESSION_UNAVAILABLE_MSG: &str = "Check-in session does not exist or has ended";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Lookup by session code found nothing usable (missing, ended or expired).
    #[error("{SESSION_UNAVAILABLE_MSG}")]
    SessionUnavailable,

    #[error("Student {student_id} is not enrolled in course {course_id}")]
    NotEnrolled { student_id: DbId, course_id: DbId },

    #[error("Check-in session {0} has already ended")]
    AlreadyEnded(DbId),

    #[error("Check-in session has expired")]
    Expired,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
