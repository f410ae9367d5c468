//! Check-in session rows.

use rollcall_core::checkin::SessionStatus;
use rollcall_core::store::{Session, SessionOverview};
use rollcall_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full row from the `checkin_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct CheckinSessionRow {
    pub id: DbId,
    pub session_code: String,
    pub course_id: DbId,
    pub teacher_id: DbId,
    pub start_time: Timestamp,
    pub duration_mins: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<CheckinSessionRow> for Session {
    type Error = String;

    fn try_from(row: CheckinSessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            id: row.id,
            session_code: row.session_code,
            course_id: row.course_id,
            teacher_id: row.teacher_id,
            start_time: row.start_time,
            duration_mins: row.duration_mins,
            status: row.status.parse::<SessionStatus>()?,
        })
    }
}

/// Session joined with its course and teacher names.
#[derive(Debug, Clone, FromRow)]
pub struct SessionOverviewRow {
    pub id: DbId,
    pub session_code: String,
    pub course_id: DbId,
    pub course_name: Option<String>,
    pub teacher_id: DbId,
    pub teacher_name: Option<String>,
    pub start_time: Timestamp,
    pub duration_mins: i32,
    pub status: String,
}

impl TryFrom<SessionOverviewRow> for SessionOverview {
    type Error = String;

    fn try_from(row: SessionOverviewRow) -> Result<Self, Self::Error> {
        Ok(SessionOverview {
            id: row.id,
            session_code: row.session_code,
            course_id: row.course_id,
            course_name: row.course_name,
            teacher_id: row.teacher_id,
            teacher_name: row.teacher_name,
            start_time: row.start_time,
            duration_mins: row.duration_mins,
            status: row.status.parse::<SessionStatus>()?,
        })
    }
}
