//! Repository for the `checkin_records` table.

use rollcall_core::store::NewAttendanceRecord;
use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::checkin_record::CheckinRecordRow;

const COLUMNS: &str = "id, session_id, student_id, course_id, checkin_time, status, \
                        created_at, updated_at";

pub struct CheckinRecordRepo;

impl CheckinRecordRepo {
    /// Insert a record inside its own transaction.
    ///
    /// A second record for the same (session, student) fails with a unique
    /// violation on `uq_checkin_records_session_student`; the transaction is
    /// rolled back when dropped.
    pub async fn create(
        pool: &PgPool,
        input: &NewAttendanceRecord,
    ) -> Result<CheckinRecordRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO checkin_records (session_id, student_id, course_id, checkin_time, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CheckinRecordRow>(&query)
            .bind(input.session_id)
            .bind(input.student_id)
            .bind(input.course_id)
            .bind(input.checkin_time)
            .bind(input.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Insert a record, or overwrite status and check-in time of the
    /// existing one for the same (session, student).
    pub async fn upsert(
        pool: &PgPool,
        input: &NewAttendanceRecord,
    ) -> Result<CheckinRecordRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO checkin_records (session_id, student_id, course_id, checkin_time, status) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_checkin_records_session_student DO UPDATE \
             SET status = EXCLUDED.status, \
                 checkin_time = EXCLUDED.checkin_time \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CheckinRecordRow>(&query)
            .bind(input.session_id)
            .bind(input.student_id)
            .bind(input.course_id)
            .bind(input.checkin_time)
            .bind(input.status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    pub async fn list_by_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<CheckinRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM checkin_records
             WHERE session_id = $1
             ORDER BY checkin_time ASC, id ASC"
        );
        sqlx::query_as::<_, CheckinRecordRow>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}
