use super::CheckinService;
use crate::checkin::AttendanceStatus;
use crate::error::CoreError;
use crate::store::{AttendanceRecord, NewAttendanceRecord, UQ_RECORD_SESSION_STUDENT};
use crate::types::DbId;

impl CheckinService {
    /// Record a student's own check-in against an open session.
    ///
    /// Gates, in order: the code must name an active session; the session
    /// must not be past its deadline (an expired session is ended here as a
    /// side effect); the student must be enrolled in the session's course.
    /// The insert itself is arbitrated by the store's uniqueness constraint,
    /// so of several concurrent identical requests exactly one succeeds and
    /// the rest fail with [`CoreError::Conflict`].
    pub async fn record_checkin(
        &self,
        session_code: &str,
        student_id: DbId,
    ) -> Result<AttendanceRecord, CoreError> {
        let session = self.find_open_session(session_code).await?;

        if self.expire_if_due(&session).await {
            return Err(CoreError::Expired);
        }

        self.require_enrollment(student_id, session.course_id)
            .await?;

        let input = NewAttendanceRecord {
            session_id: session.id,
            student_id,
            course_id: session.course_id,
            checkin_time: self.clock.now(),
            status: AttendanceStatus::Present,
        };

        match self.store.insert_record(&input).await {
            Ok(record) => {
                tracing::info!(
                    session_id = session.id,
                    student_id,
                    record_id = record.id,
                    "Student checked in"
                );
                Ok(record)
            }
            Err(e) if e.is_unique_violation(UQ_RECORD_SESSION_STUDENT) => {
                tracing::debug!(session_id = session.id, student_id, "Duplicate check-in rejected");
                Err(CoreError::Conflict(
                    "You have already checked in to this session".into(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Teacher correction of a student's attendance for a session.
    ///
    /// Creates the record when none exists, otherwise overwrites its status
    /// and check-in time. Works on ended sessions too.
    pub async fn manual_checkin(
        &self,
        session_id: DbId,
        student_id: DbId,
        status: &str,
    ) -> Result<AttendanceRecord, CoreError> {
        let status: AttendanceStatus = status.parse().map_err(CoreError::Validation)?;

        let session = self.get_session(session_id).await?;
        self.require_enrollment(student_id, session.course_id)
            .await?;

        let input = NewAttendanceRecord {
            session_id: session.id,
            student_id,
            course_id: session.course_id,
            checkin_time: self.clock.now(),
            status,
        };
        let record = self.store.upsert_record(&input).await?;

        tracing::info!(
            session_id,
            student_id,
            status = %status,
            record_id = record.id,
            "Attendance corrected"
        );
        Ok(record)
    }

    async fn require_enrollment(&self, student_id: DbId, course_id: DbId) -> Result<(), CoreError> {
        if self.store.is_enrolled(student_id, course_id).await? {
            Ok(())
        } else {
            Err(CoreError::NotEnrolled {
                student_id,
                course_id,
            })
        }
    }
}
