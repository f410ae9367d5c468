//! Attendance record rows.

use rollcall_core::checkin::AttendanceStatus;
use rollcall_core::store::AttendanceRecord;
use rollcall_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full row from the `checkin_records` table.
#[derive(Debug, Clone, FromRow)]
pub struct CheckinRecordRow {
    pub id: DbId,
    pub session_id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub checkin_time: Timestamp,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<CheckinRecordRow> for AttendanceRecord {
    type Error = String;

    fn try_from(row: CheckinRecordRow) -> Result<Self, Self::Error> {
        Ok(AttendanceRecord {
            id: row.id,
            session_id: row.session_id,
            student_id: row.student_id,
            course_id: row.course_id,
            checkin_time: row.checkin_time,
            status: row.status.parse::<AttendanceStatus>()?,
        })
    }
}
