//! Periodic expiry sweep for check-in sessions.
//!
//! Ends every active session whose deadline has passed, whether or not
//! anyone reads it again. Runs on a fixed interval using
//! `tokio::time::interval`; a failed pass is logged and retried on the next
//! tick.

use std::sync::Arc;
use std::time::Duration;

use rollcall_core::service::CheckinService;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run the expiry sweep loop until `cancel` is triggered.
///
/// The first pass runs immediately so sessions that expired while the
/// server was down are closed at startup.
pub async fn run(service: Arc<CheckinService>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Session expiry sweeper started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session expiry sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                match service.sweep_expired_sessions().await {
                    Ok(report) => {
                        if report.ended > 0 || report.failed > 0 {
                            tracing::info!(
                                scanned = report.scanned,
                                ended = report.ended,
                                skipped = report.skipped,
                                failed = report.failed,
                                "Session expiry sweep finished"
                            );
                        } else {
                            tracing::debug!(scanned = report.scanned, "Session expiry sweep: nothing to end");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session expiry sweep failed");
                    }
                }
            }
        }
    }
}

/// A running sweeper task.
pub struct SweeperHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Spawn [`run`] on the current runtime.
    pub fn spawn(service: Arc<CheckinService>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(service, interval, cancel.clone()));
        Self { cancel, handle }
    }

    /// Signal the sweeper to stop and wait for the loop to exit.
    ///
    /// A pass already in flight completes first.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Session expiry sweeper task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rollcall_core::checkin::SessionStatus;
    use rollcall_core::clock::ManualClock;
    use rollcall_core::memory_store::MemoryStore;
    use rollcall_core::roles::Role;
    use rollcall_core::store::CheckinStore;

    use super::*;

    fn setup() -> (Arc<CheckinService>, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        store.add_user(3, "Ada Teacher", Role::Teacher);
        store.add_course(7, "Systems Programming");
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        ));
        let service = Arc::new(CheckinService::new(store.clone(), clock.clone()));
        (service, store, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_ends_expired_sessions_without_reads() {
        let (service, store, clock) = setup();
        let short = service.create_session(3, 7, 1).await.unwrap();
        let long = service.create_session(3, 7, 30).await.unwrap();

        let sweeper = SweeperHandle::spawn(Arc::clone(&service), Duration::from_secs(60));

        clock.advance(chrono::Duration::minutes(2));
        // Let the paused runtime fire the next tick.
        tokio::time::sleep(Duration::from_secs(61)).await;

        let short = store.find_session(short.id).await.unwrap().unwrap();
        let long = store.find_session(long.id).await.unwrap().unwrap();
        assert_eq!(short.status, SessionStatus::Ended);
        assert_eq!(long.status, SessionStatus::Active);

        sweeper.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_survives_failed_passes() {
        let (service, store, clock) = setup();
        let session = service.create_session(3, 7, 1).await.unwrap();
        store.set_unavailable(true);

        let sweeper = SweeperHandle::spawn(Arc::clone(&service), Duration::from_secs(60));
        clock.advance(chrono::Duration::minutes(5));
        tokio::time::sleep(Duration::from_secs(61)).await;

        // Store comes back; the next tick finishes the job.
        store.set_unavailable(false);
        tokio::time::sleep(Duration::from_secs(60)).await;

        let session = store.find_session(session.id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Ended);

        sweeper.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_returns_promptly() {
        let (service, _store, _clock) = setup();
        let sweeper = SweeperHandle::spawn(service, Duration::from_secs(3600));
        tokio::time::timeout(Duration::from_secs(1), sweeper.stop())
            .await
            .expect("sweeper should stop on cancellation");
    }
}
