//! Persistence capability consumed by the check-in service.
//!
//! The store owns the only shared mutable state in the system. Every
//! implementation must provide:
//!
//! - atomic single-row updates, so the `Active -> Ended` guard in
//!   [`CheckinStore::end_session`] is evaluated in the same statement as
//!   the write;
//! - a hard uniqueness constraint on `(session_id, student_id)` for
//!   attendance records, reported as [`StoreError::UniqueViolation`];
//! - a hard uniqueness constraint on session codes.

use async_trait::async_trait;
use serde::Serialize;

use crate::checkin::{self, AttendanceStatus, SessionStatus};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Constraint guarding session code uniqueness.
pub const UQ_SESSION_CODE: &str = "uq_checkin_sessions_code";

/// Constraint guarding one attendance record per (session, student).
pub const UQ_RECORD_SESSION_STUDENT: &str = "uq_checkin_records_session_student";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A check-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: DbId,
    pub session_code: String,
    pub course_id: DbId,
    pub teacher_id: DbId,
    pub start_time: Timestamp,
    pub duration_mins: i32,
    pub status: SessionStatus,
}

impl Session {
    pub fn deadline(&self) -> Timestamp {
        checkin::session_deadline(self.start_time, self.duration_mins)
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        checkin::is_expired(self.start_time, self.duration_mins, now)
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Input for [`CheckinStore::insert_session`]. New sessions are always active.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_code: String,
    pub course_id: DbId,
    pub teacher_id: DbId,
    pub start_time: Timestamp,
    pub duration_mins: i32,
}

/// Parameters of a guarded `Active -> Ended` transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionTransition {
    /// When set, the update only matches sessions owned by this teacher.
    pub owner_id: Option<DbId>,
    /// When set, `duration_mins` is rewritten in the same update.
    pub duration_mins: Option<i32>,
}

/// One student's attendance outcome for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub session_id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub checkin_time: Timestamp,
    pub status: AttendanceStatus,
}

/// Input for [`CheckinStore::insert_record`] and [`CheckinStore::upsert_record`].
#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub session_id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub checkin_time: Timestamp,
    pub status: AttendanceStatus,
}

/// An enrolled student, as needed for the attendance report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub student_id: DbId,
    pub student_name: String,
}

/// A session joined with its course and teacher names, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOverview {
    pub id: DbId,
    pub session_code: String,
    pub course_id: DbId,
    pub course_name: Option<String>,
    pub teacher_id: DbId,
    pub teacher_name: Option<String>,
    pub start_time: Timestamp,
    pub duration_mins: i32,
    pub status: SessionStatus,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint: c } if c == constraint)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CheckinStore: Send + Sync {
    /// Insert a new active session.
    async fn insert_session(&self, input: &NewSession) -> Result<Session, StoreError>;

    async fn find_session(&self, id: DbId) -> Result<Option<Session>, StoreError>;

    async fn find_session_by_code(&self, code: &str) -> Result<Option<Session>, StoreError>;

    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> Result<Vec<Session>, StoreError>;

    /// Sessions newest first, optionally restricted to one teacher.
    async fn list_session_overviews(
        &self,
        teacher_id: Option<DbId>,
    ) -> Result<Vec<SessionOverview>, StoreError>;

    /// Move a session from `active` to `ended` in a single guarded update.
    ///
    /// Returns `false` when nothing matched: the session is missing, already
    /// ended, or not owned by `transition.owner_id`.
    async fn end_session(
        &self,
        id: DbId,
        transition: &SessionTransition,
    ) -> Result<bool, StoreError>;

    async fn is_enrolled(&self, student_id: DbId, course_id: DbId) -> Result<bool, StoreError>;

    /// Every student enrolled in the course.
    async fn list_roster(&self, course_id: DbId) -> Result<Vec<RosterEntry>, StoreError>;

    /// Insert a record in its own unit of work. A second record for the same
    /// (session, student) fails with [`StoreError::UniqueViolation`] on
    /// [`UQ_RECORD_SESSION_STUDENT`].
    async fn insert_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError>;

    /// Insert a record, or update `status` and `checkin_time` of the existing
    /// one for the same (session, student).
    async fn upsert_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError>;

    async fn list_records(&self, session_id: DbId) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn course_name(&self, course_id: DbId) -> Result<Option<String>, StoreError>;

    async fn user_name(&self, user_id: DbId) -> Result<Option<String>, StoreError>;
}
