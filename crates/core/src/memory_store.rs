//! In-process [`CheckinStore`] backed by a mutex-guarded table set.
//!
//! Enforces the same uniqueness constraints as the Postgres schema, so the
//! race-sensitive paths of the service can be exercised without a database.
//! Also supports fault injection for sweeper and error-path tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::checkin::SessionStatus;
use crate::roles::Role;
use crate::store::{
    AttendanceRecord, CheckinStore, NewAttendanceRecord, NewSession, RosterEntry, Session,
    SessionOverview, SessionTransition, StoreError, UQ_RECORD_SESSION_STUDENT, UQ_SESSION_CODE,
};
use crate::types::DbId;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<DbId, (String, Role)>,
    courses: HashMap<DbId, String>,
    enrollments: HashSet<(DbId, DbId)>,
    sessions: BTreeMap<DbId, Session>,
    records: BTreeMap<(DbId, DbId), AttendanceRecord>,
    next_session_id: DbId,
    next_record_id: DbId,
    failing_end_sessions: HashSet<DbId>,
    unavailable: bool,
}

impl Tables {
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Backend("store unavailable".into()));
        }
        Ok(())
    }
}

/// Mutex-guarded in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_user(&self, id: DbId, name: &str, role: Role) {
        self.lock().users.insert(id, (name.to_string(), role));
    }

    pub fn add_course(&self, id: DbId, name: &str) {
        self.lock().courses.insert(id, name.to_string());
    }

    pub fn enroll(&self, student_id: DbId, course_id: DbId) {
        self.lock().enrollments.insert((student_id, course_id));
    }

    pub fn unenroll(&self, student_id: DbId, course_id: DbId) {
        self.lock().enrollments.remove(&(student_id, course_id));
    }

    /// Make every `end_session` call for this session fail with a backend error.
    pub fn fail_end_session(&self, session_id: DbId) {
        self.lock().failing_end_sessions.insert(session_id);
    }

    /// Make every operation fail with a backend error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Number of stored attendance records, across all sessions.
    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }
}

#[async_trait]
impl CheckinStore for MemoryStore {
    async fn insert_session(&self, input: &NewSession) -> Result<Session, StoreError> {
        let mut t = self.lock();
        t.check_available()?;
        if t
            .sessions
            .values()
            .any(|s| s.session_code == input.session_code)
        {
            return Err(StoreError::UniqueViolation {
                constraint: UQ_SESSION_CODE.to_string(),
            });
        }
        t.next_session_id += 1;
        let session = Session {
            id: t.next_session_id,
            session_code: input.session_code.clone(),
            course_id: input.course_id,
            teacher_id: input.teacher_id,
            start_time: input.start_time,
            duration_mins: input.duration_mins,
            status: SessionStatus::Active,
        };
        t.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: DbId) -> Result<Option<Session>, StoreError> {
        let t = self.lock();
        t.check_available()?;
        Ok(t.sessions.get(&id).cloned())
    }

    async fn find_session_by_code(&self, code: &str) -> Result<Option<Session>, StoreError> {
        let t = self.lock();
        t.check_available()?;
        Ok(t.sessions.values().find(|s| s.session_code == code).cloned())
    }

    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> Result<Vec<Session>, StoreError> {
        let t = self.lock();
        t.check_available()?;
        Ok(t
            .sessions
            .values()
            .filter(|s| s.status == status)
            .cloned()
            .collect())
    }

    async fn list_session_overviews(
        &self,
        teacher_id: Option<DbId>,
    ) -> Result<Vec<SessionOverview>, StoreError> {
        let t = self.lock();
        t.check_available()?;
        let mut out: Vec<SessionOverview> = t
            .sessions
            .values()
            .filter(|s| teacher_id.map_or(true, |tid| s.teacher_id == tid))
            .map(|s| SessionOverview {
                id: s.id,
                session_code: s.session_code.clone(),
                course_id: s.course_id,
                course_name: t.courses.get(&s.course_id).cloned(),
                teacher_id: s.teacher_id,
                teacher_name: t.users.get(&s.teacher_id).map(|(name, _)| name.clone()),
                start_time: s.start_time,
                duration_mins: s.duration_mins,
                status: s.status,
            })
            .collect();
        out.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn end_session(
        &self,
        id: DbId,
        transition: &SessionTransition,
    ) -> Result<bool, StoreError> {
        let mut t = self.lock();
        t.check_available()?;
        if t.failing_end_sessions.contains(&id) {
            return Err(StoreError::Backend(format!("injected failure ending session {id}")));
        }
        let Some(session) = t.sessions.get_mut(&id) else {
            return Ok(false);
        };
        if session.status != SessionStatus::Active {
            return Ok(false);
        }
        if transition.owner_id.is_some_and(|owner| owner != session.teacher_id) {
            return Ok(false);
        }
        session.status = SessionStatus::Ended;
        if let Some(duration) = transition.duration_mins {
            session.duration_mins = duration;
        }
        Ok(true)
    }

    async fn is_enrolled(&self, student_id: DbId, course_id: DbId) -> Result<bool, StoreError> {
        let t = self.lock();
        t.check_available()?;
        Ok(t.enrollments.contains(&(student_id, course_id)))
    }

    async fn list_roster(&self, course_id: DbId) -> Result<Vec<RosterEntry>, StoreError> {
        let t = self.lock();
        t.check_available()?;
        let mut roster: Vec<RosterEntry> = t
            .enrollments
            .iter()
            .filter(|(_, cid)| *cid == course_id)
            .map(|(sid, _)| RosterEntry {
                student_id: *sid,
                student_name: t
                    .users
                    .get(sid)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default(),
            })
            .collect();
        roster.sort_by_key(|r| r.student_id);
        Ok(roster)
    }

    async fn insert_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError> {
        let mut t = self.lock();
        t.check_available()?;
        let key = (input.session_id, input.student_id);
        if t.records.contains_key(&key) {
            return Err(StoreError::UniqueViolation {
                constraint: UQ_RECORD_SESSION_STUDENT.to_string(),
            });
        }
        t.next_record_id += 1;
        let record = AttendanceRecord {
            id: t.next_record_id,
            session_id: input.session_id,
            student_id: input.student_id,
            course_id: input.course_id,
            checkin_time: input.checkin_time,
            status: input.status,
        };
        t.records.insert(key, record.clone());
        Ok(record)
    }

    async fn upsert_record(
        &self,
        input: &NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError> {
        let mut t = self.lock();
        t.check_available()?;
        let key = (input.session_id, input.student_id);
        if let Some(existing) = t.records.get_mut(&key) {
            existing.status = input.status;
            existing.checkin_time = input.checkin_time;
            return Ok(existing.clone());
        }
        t.next_record_id += 1;
        let record = AttendanceRecord {
            id: t.next_record_id,
            session_id: input.session_id,
            student_id: input.student_id,
            course_id: input.course_id,
            checkin_time: input.checkin_time,
            status: input.status,
        };
        t.records.insert(key, record.clone());
        Ok(record)
    }

    async fn list_records(&self, session_id: DbId) -> Result<Vec<AttendanceRecord>, StoreError> {
        let t = self.lock();
        t.check_available()?;
        Ok(t
            .records
            .values()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn course_name(&self, course_id: DbId) -> Result<Option<String>, StoreError> {
        let t = self.lock();
        t.check_available()?;
        Ok(t.courses.get(&course_id).cloned())
    }

    async fn user_name(&self, user_id: DbId) -> Result<Option<String>, StoreError> {
        let t = self.lock();
        t.check_available()?;
        Ok(t.users.get(&user_id).map(|(name, _)| name.clone()))
    }
}
