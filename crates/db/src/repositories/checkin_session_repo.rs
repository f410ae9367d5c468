//! Repository for the `checkin_sessions` table.

use rollcall_core::checkin::SessionStatus;
use rollcall_core::store::NewSession;
use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::checkin_session::{CheckinSessionRow, SessionOverviewRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_code, course_id, teacher_id, start_time, duration_mins, \
                        status, created_at, updated_at";

pub struct CheckinSessionRepo;

impl CheckinSessionRepo {
    /// Insert a new active session, returning the created row.
    ///
    /// Fails with a unique violation on `uq_checkin_sessions_code` when the
    /// code is already taken.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<CheckinSessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO checkin_sessions (session_code, course_id, teacher_id, start_time, duration_mins, status)
             VALUES ($1, $2, $3, $4, $5, 'active')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CheckinSessionRow>(&query)
            .bind(&input.session_code)
            .bind(input.course_id)
            .bind(input.teacher_id)
            .bind(input.start_time)
            .bind(input.duration_mins)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CheckinSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM checkin_sessions WHERE id = $1");
        sqlx::query_as::<_, CheckinSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        session_code: &str,
    ) -> Result<Option<CheckinSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM checkin_sessions WHERE session_code = $1");
        sqlx::query_as::<_, CheckinSessionRow>(&query)
            .bind(session_code)
            .fetch_optional(pool)
            .await
    }

    /// All sessions in the given status, oldest first.
    pub async fn list_by_status(
        pool: &PgPool,
        status: SessionStatus,
    ) -> Result<Vec<CheckinSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM checkin_sessions
             WHERE status = $1
             ORDER BY start_time ASC, id ASC"
        );
        sqlx::query_as::<_, CheckinSessionRow>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    /// Sessions with course and teacher names, newest first.
    ///
    /// When `teacher_id` is `Some`, only that teacher's sessions are returned.
    pub async fn list_overviews(
        pool: &PgPool,
        teacher_id: Option<DbId>,
    ) -> Result<Vec<SessionOverviewRow>, sqlx::Error> {
        sqlx::query_as::<_, SessionOverviewRow>(
            "SELECT s.id, s.session_code, s.course_id, c.name AS course_name,
                    s.teacher_id, u.name AS teacher_name,
                    s.start_time, s.duration_mins, s.status
             FROM checkin_sessions s
             LEFT JOIN courses c ON c.id = s.course_id
             LEFT JOIN users u ON u.id = s.teacher_id
             WHERE ($1::BIGINT IS NULL OR s.teacher_id = $1)
             ORDER BY s.start_time DESC, s.id DESC",
        )
        .bind(teacher_id)
        .fetch_all(pool)
        .await
    }

    /// Move an active session to `ended` in one guarded statement.
    ///
    /// The `status = 'active'` predicate is part of the UPDATE, so of several
    /// concurrent callers exactly one sees a row affected. `owner_id`
    /// restricts the update to one teacher's sessions; `duration_mins`, when
    /// given, overwrites the stored duration. Returns `true` if the row was
    /// updated.
    pub async fn end_active(
        pool: &PgPool,
        id: DbId,
        owner_id: Option<DbId>,
        duration_mins: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE checkin_sessions
             SET status = 'ended', duration_mins = COALESCE($3, duration_mins)
             WHERE id = $1
               AND status = 'active'
               AND ($2::BIGINT IS NULL OR teacher_id = $2)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(duration_mins)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
