use super::CheckinService;
use crate::checkin::{EndReason, SessionStatus};
use crate::error::CoreError;
use crate::store::SessionTransition;

/// Outcome counters for one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Active sessions examined.
    pub scanned: usize,
    /// Sessions this pass moved to `Ended`.
    pub ended: usize,
    /// Expired sessions another path ended first.
    pub skipped: usize,
    /// Expired sessions whose transition failed; retried next pass.
    pub failed: usize,
}

impl CheckinService {
    /// End every active session that is past its deadline.
    ///
    /// A failure on one session is logged and counted; it never stops the
    /// rest of the batch. Only a failure to list active sessions is
    /// returned as an error.
    pub async fn sweep_expired_sessions(&self) -> Result<SweepReport, CoreError> {
        let sessions = self
            .store
            .list_sessions_by_status(SessionStatus::Active)
            .await?;
        let now = self.clock.now();

        let mut report = SweepReport {
            scanned: sessions.len(),
            ..SweepReport::default()
        };

        for session in sessions.iter().filter(|s| s.is_expired_at(now)) {
            match self
                .transition_to_ended(session, EndReason::NaturalExpiry, SessionTransition::default())
                .await
            {
                Ok(()) => report.ended += 1,
                Err(CoreError::AlreadyEnded(_)) => {
                    tracing::debug!(session_id = session.id, "Session already ended elsewhere");
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(
                        session_id = session.id,
                        session_code = %session.session_code,
                        error = %e,
                        "Failed to end expired session"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
