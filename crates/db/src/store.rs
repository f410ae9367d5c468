//! PostgreSQL implementation of [`CheckinStore`].

use async_trait::async_trait;
use rollcall_core::checkin::SessionStatus;
use rollcall_core::store::{
    AttendanceRecord, CheckinStore, NewAttendanceRecord, NewSession, RosterEntry, Session,
    SessionOverview, SessionTransition, StoreError,
};
use rollcall_core::types::DbId;

use crate::repositories::{
    CheckinRecordRepo, CheckinSessionRepo, CourseRepo, EnrollmentRepo, UserRepo,
};
use crate::DbPool;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// [`CheckinStore`] backed by the repositories in this crate.
#[derive(Clone)]
pub struct PgCheckinStore {
    pool: DbPool,
}

impl PgCheckinStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Translate a sqlx error, keeping the constraint name of unique violations
/// so the service can tell which invariant was hit.
fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            if let Some(constraint) = db_err.constraint() {
                return StoreError::UniqueViolation {
                    constraint: constraint.to_string(),
                };
            }
        }
    }
    StoreError::Backend(err.to_string())
}

fn convert<R, T>(row: R) -> Result<T, StoreError>
where
    T: TryFrom<R, Error = String>,
{
    T::try_from(row).map_err(StoreError::Backend)
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = String>,
{
    rows.into_iter().map(convert).collect()
}

#[async_trait]
impl CheckinStore for PgCheckinStore {
    async fn insert_session(&self, input: &NewSession) -> Result<Session, StoreError> {
        let row = CheckinSessionRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?;
        convert(row)
    }

    async fn find_session(&self, id: DbId) -> Result<Option<Session>, StoreError> {
        CheckinSessionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(convert)
            .transpose()
    }

    async fn find_session_by_code(&self, code: &str) -> Result<Option<Session>, StoreError> {
        CheckinSessionRepo::find_by_code(&self.pool, code)
            .await
            .map_err(store_error)?
            .map(convert)
            .transpose()
    }

    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> Result<Vec<Session>, StoreError> {
        let rows = CheckinSessionRepo::list_by_status(&self.pool, status)
            .await
            .map_err(store_error)?;
        convert_all(rows)
    }

    async fn list_session_overviews(
        &self,
        teacher_id: Option<DbId>,
    ) -> Result<Vec<SessionOverview>, StoreError> {
        let rows = CheckinSessionRepo::list_overviews(&self.pool, teacher_id)
            .await
            .map_err(store_error)?;
        convert_all(rows)
    }

    async fn end_session(
        &self,
        id: DbId,
        transition: &SessionTransition,
    ) -> Result<bool, StoreError> {
        CheckinSessionRepo::end_active(
            &self.pool,
            id,
            transition.owner_id,
            transition.duration_mins,
        )
        .await
        .map_err(store_error)
    }

    async fn is_enrolled(&self, student_id: DbId, course_id: DbId) -> Result<bool, StoreError> {
        EnrollmentRepo::is_enrolled(&self.pool, student_id, course_id)
            .await
            .map_err(store_error)
    }

    async fn list_roster(&self, course_id: DbId) -> Result<Vec<RosterEntry>, StoreError> {
        let rows = EnrollmentRepo::list_roster(&self.pool, course_id)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(RosterEntry::from).collect())
    }

    async fn insert_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError> {
        let row = CheckinRecordRepo::create(&self.pool, input)
            .await
            .map_err(store_error)?;
        convert(row)
    }

    async fn upsert_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError> {
        let row = CheckinRecordRepo::upsert(&self.pool, input)
            .await
            .map_err(store_error)?;
        convert(row)
    }

    async fn list_records(&self, session_id: DbId) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = CheckinRecordRepo::list_by_session(&self.pool, session_id)
            .await
            .map_err(store_error)?;
        convert_all(rows)
    }

    async fn course_name(&self, course_id: DbId) -> Result<Option<String>, StoreError> {
        CourseRepo::find_name(&self.pool, course_id)
            .await
            .map_err(store_error)
    }

    async fn user_name(&self, user_id: DbId) -> Result<Option<String>, StoreError> {
        UserRepo::find_name(&self.pool, user_id)
            .await
            .map_err(store_error)
    }
}
