//! The check-in service: session lifecycle, attendance recording, roster
//! reconciliation, and the expiry sweep pass.
//!
//! All state lives behind a [`CheckinStore`]; the service itself holds no
//! caches and is cheap to share across request handlers via `Arc`.

mod lifecycle;
mod recorder;
mod roster;
mod sweep;

use std::sync::Arc;

use crate::checkin::EndReason;
use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::session_code;
use crate::store::{CheckinStore, Session, SessionTransition};

pub use lifecycle::SessionDisplayInfo;
pub use roster::{reconcile, AttendanceReportEntry};
pub use sweep::SweepReport;

/// Entry point for every check-in operation.
#[derive(Clone)]
pub struct CheckinService {
    store: Arc<dyn CheckinStore>,
    clock: Arc<dyn Clock>,
}

impl CheckinService {
    pub fn new(store: Arc<dyn CheckinStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Build a service that reads wall-clock time.
    pub fn with_system_clock(store: Arc<dyn CheckinStore>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    /// The active session behind a client-supplied code.
    ///
    /// Malformed codes are rejected without a store round-trip. Unknown and
    /// ended sessions fail the same way.
    async fn find_open_session(&self, session_code: &str) -> Result<Session, CoreError> {
        if !session_code::is_well_formed(session_code) {
            return Err(CoreError::SessionUnavailable);
        }
        self.store
            .find_session_by_code(session_code)
            .await?
            .filter(Session::is_active)
            .ok_or(CoreError::SessionUnavailable)
    }

    /// The single `Active -> Ended` transition shared by every end path.
    ///
    /// The status guard is evaluated by the store inside the update itself;
    /// an update that matches nothing means another path won the race.
    async fn transition_to_ended(
        &self,
        session: &Session,
        reason: EndReason,
        transition: SessionTransition,
    ) -> Result<(), CoreError> {
        let updated = self.store.end_session(session.id, &transition).await?;
        if !updated {
            return Err(CoreError::AlreadyEnded(session.id));
        }
        tracing::info!(
            session_id = session.id,
            session_code = %session.session_code,
            reason = %reason,
            duration_mins = transition.duration_mins.unwrap_or(session.duration_mins),
            "Check-in session ended"
        );
        Ok(())
    }

    /// Read-path expiry: end the session if it is past its deadline.
    ///
    /// Returns `true` when the session is expired, whether or not this call
    /// performed the transition. Storage errors during the transition are
    /// logged and swallowed so the caller can still report the expiry.
    async fn expire_if_due(&self, session: &Session) -> bool {
        if !session.is_expired_at(self.clock.now()) {
            return false;
        }
        match self
            .transition_to_ended(session, EndReason::NaturalExpiry, SessionTransition::default())
            .await
        {
            Ok(()) | Err(CoreError::AlreadyEnded(_)) => {}
            Err(e) => {
                tracing::error!(
                    session_id = session.id,
                    error = %e,
                    "Failed to end expired session on read"
                );
            }
        }
        true
    }
}
