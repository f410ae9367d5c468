use std::collections::HashMap;

use serde::Serialize;

use super::CheckinService;
use crate::checkin::AttendanceStatus;
use crate::error::CoreError;
use crate::store::{AttendanceRecord, RosterEntry};
use crate::types::{DbId, Timestamp};

/// One row of a session's attendance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceReportEntry {
    pub student_id: DbId,
    pub student_name: String,
    /// `None` for students with no record (reported absent).
    pub checkin_time: Option<Timestamp>,
    pub status: AttendanceStatus,
}

/// Merge a course roster with a session's attendance records.
///
/// The output holds exactly one row per roster entry. Students without a
/// record are reported absent; records for students outside the roster are
/// dropped. Rows are ordered by student name, then id.
pub fn reconcile(
    roster: Vec<RosterEntry>,
    records: Vec<AttendanceRecord>,
) -> Vec<AttendanceReportEntry> {
    let mut by_student: HashMap<DbId, AttendanceRecord> = records
        .into_iter()
        .map(|r| (r.student_id, r))
        .collect();

    let mut report: Vec<AttendanceReportEntry> = roster
        .into_iter()
        .map(|entry| match by_student.remove(&entry.student_id) {
            Some(record) => AttendanceReportEntry {
                student_id: entry.student_id,
                student_name: entry.student_name,
                checkin_time: Some(record.checkin_time),
                status: record.status,
            },
            None => AttendanceReportEntry {
                student_id: entry.student_id,
                student_name: entry.student_name,
                checkin_time: None,
                status: AttendanceStatus::Absent,
            },
        })
        .collect();

    report.sort_by(|a, b| {
        a.student_name
            .cmp(&b.student_name)
            .then(a.student_id.cmp(&b.student_id))
    });
    report
}

impl CheckinService {
    /// Attendance of every student enrolled in the session's course.
    pub async fn build_attendance_report(
        &self,
        session_id: DbId,
    ) -> Result<Vec<AttendanceReportEntry>, CoreError> {
        let session = self.get_session(session_id).await?;
        let roster = self.store.list_roster(session.course_id).await?;
        let records = self.store.list_records(session.id).await?;
        Ok(reconcile(roster, records))
    }
}
