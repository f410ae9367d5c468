use serde::Serialize;

use super::CheckinService;
use crate::checkin::{self, EndReason};
use crate::error::CoreError;
use crate::roles::Actor;
use crate::session_code::{generate_session_code, MAX_CODE_ATTEMPTS};
use crate::store::{NewSession, Session, SessionOverview, SessionTransition, UQ_SESSION_CODE};
use crate::types::{DbId, Timestamp};

/// Public view of an open session, shown on the student check-in page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionDisplayInfo {
    pub session_code: String,
    pub course_name: String,
    pub teacher_name: String,
    pub start_time: Timestamp,
    pub duration_mins: i32,
    pub deadline: Timestamp,
}

impl CheckinService {
    /// Open a new check-in session for a course.
    ///
    /// Retries with a fresh code when the generated one collides with an
    /// existing session, up to [`MAX_CODE_ATTEMPTS`] times.
    pub async fn create_session(
        &self,
        teacher_id: DbId,
        course_id: DbId,
        duration_mins: i32,
    ) -> Result<Session, CoreError> {
        checkin::validate_duration(duration_mins).map_err(CoreError::Validation)?;

        if self.store.course_name(course_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Course",
                id: course_id,
            });
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let now = self.clock.now();
            let input = NewSession {
                session_code: generate_session_code(now),
                course_id,
                teacher_id,
                start_time: now,
                duration_mins,
            };

            match self.store.insert_session(&input).await {
                Ok(session) => {
                    tracing::info!(
                        session_id = session.id,
                        session_code = %session.session_code,
                        course_id,
                        teacher_id,
                        duration_mins,
                        "Check-in session created"
                    );
                    return Ok(session);
                }
                Err(e) if e.is_unique_violation(UQ_SESSION_CODE) => {
                    tracing::warn!(attempt, "Session code collision, regenerating");
                }
                Err(e) => {
                    return Err(CoreError::Internal(format!("Session creation failed: {e}")));
                }
            }
        }

        Err(CoreError::Internal(format!(
            "Session creation failed: no unique code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    /// Whether the session is past its deadline at the service clock's now.
    pub fn compute_expiry(&self, session: &Session) -> bool {
        session.is_expired_at(self.clock.now())
    }

    pub async fn get_session(&self, session_id: DbId) -> Result<Session, CoreError> {
        self.store
            .find_session(session_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CheckinSession",
                id: session_id,
            })
    }

    /// Look up a session on behalf of a teacher.
    ///
    /// With `owner_id` set, a session created by someone else is reported
    /// as not found, the same as a missing one.
    pub async fn get_owned_session(
        &self,
        session_id: DbId,
        owner_id: Option<DbId>,
    ) -> Result<Session, CoreError> {
        self.store
            .find_session(session_id)
            .await?
            .filter(|s| owner_id.map_or(true, |owner| s.teacher_id == owner))
            .ok_or(CoreError::NotFound {
                entity: "CheckinSession",
                id: session_id,
            })
    }

    /// End a session.
    ///
    /// `owner_id` restricts the transition to sessions created by that
    /// teacher; pass `None` for admins and for system-initiated ends. A
    /// session outside the owner filter is reported as not found.
    ///
    /// [`EndReason::ManualOverride`] also rewrites `duration_mins` to the
    /// whole minutes actually elapsed. Returns the session as ended.
    pub async fn end_session(
        &self,
        session_id: DbId,
        reason: EndReason,
        owner_id: Option<DbId>,
    ) -> Result<Session, CoreError> {
        let mut session = self.get_owned_session(session_id, owner_id).await?;

        if !session.is_active() {
            return Err(CoreError::AlreadyEnded(session_id));
        }

        let duration_mins = match reason {
            EndReason::ManualOverride => Some(checkin::elapsed_minutes(
                session.start_time,
                self.clock.now(),
            )),
            EndReason::NaturalExpiry | EndReason::ExplicitEnd => None,
        };

        let transition = SessionTransition {
            owner_id,
            duration_mins,
        };
        self.transition_to_ended(&session, reason, transition).await?;

        session.status = checkin::SessionStatus::Ended;
        if let Some(d) = duration_mins {
            session.duration_mins = d;
        }
        Ok(session)
    }

    /// Course and teacher names for an open, unexpired session.
    ///
    /// Unknown, ended and expired codes all fail with the same
    /// [`CoreError::SessionUnavailable`].
    pub async fn session_display_info(
        &self,
        session_code: &str,
    ) -> Result<SessionDisplayInfo, CoreError> {
        let session = self.find_open_session(session_code).await?;

        if self.expire_if_due(&session).await {
            return Err(CoreError::SessionUnavailable);
        }

        let course_name = self.store.course_name(session.course_id).await?;
        let teacher_name = self.store.user_name(session.teacher_id).await?;
        if course_name.is_none() || teacher_name.is_none() {
            tracing::warn!(
                session_id = session.id,
                course_id = session.course_id,
                teacher_id = session.teacher_id,
                "Session references a missing course or teacher"
            );
        }

        Ok(SessionDisplayInfo {
            deadline: session.deadline(),
            session_code: session.session_code,
            course_name: course_name.unwrap_or_default(),
            teacher_name: teacher_name.unwrap_or_default(),
            start_time: session.start_time,
            duration_mins: session.duration_mins,
        })
    }

    /// Sessions visible to the actor, newest first.
    ///
    /// A session past its deadline is listed as ended even if the sweeper
    /// has not closed it yet. The stored row is left for the sweeper.
    pub async fn list_sessions(&self, actor: &Actor) -> Result<Vec<SessionOverview>, CoreError> {
        let now = self.clock.now();
        let mut sessions = self
            .store
            .list_session_overviews(actor.owner_filter())
            .await?;
        for overview in &mut sessions {
            if overview.status == checkin::SessionStatus::Active
                && checkin::is_expired(overview.start_time, overview.duration_mins, now)
            {
                overview.status = checkin::SessionStatus::Ended;
            }
        }
        Ok(sessions)
    }
}
