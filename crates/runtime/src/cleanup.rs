//! Retention of rejected referrals: a rejected referral whose `date` is at
//! least [`REJECTED_RETENTION_HOURS`] old is deleted, either by the
//! background [`CleanupTask`] or on demand.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::{log_referral_details, ReferralStore};
use crate::{ReferralFilter, ReferralStatus, Result};

pub const REJECTED_RETENTION_HOURS: i64 = 24;
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - chrono::Duration::hours(REJECTED_RETENTION_HOURS)
}

/// The one retention predicate shared by the scheduled and on-demand paths.
pub fn stale_rejected(now: DateTime<Utc>) -> ReferralFilter {
    ReferralFilter::all()
        .with_status(ReferralStatus::Rejected)
        .created_at_or_before(retention_cutoff(now))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub deleted_count: u64,
    pub found_referrals: u64,
    pub cutoff_date: DateTime<Utc>,
}

pub async fn cleanup_rejected<S: ReferralStore>(store: &S, now: DateTime<Utc>) -> Result<CleanupReport> {
    let cutoff_date = retention_cutoff(now);
    let filter = stale_rejected(now);
    tracing::debug!("[cleanup_rejected] looking for rejected referrals created at or before {}", cutoff_date);

    let found_referrals = store.count_referrals(&filter).await?;
    if found_referrals > 0 && tracing::enabled!(tracing::Level::DEBUG) {
        let doomed = store.find_referrals(&filter).await?;
        log_referral_details(store, "cleanup_rejected", &doomed, |r| r.job_seeker).await?;
    }
    let deleted_count = store.delete_referrals(&filter).await?;

    tracing::info!(
        "[cleanup_rejected] deleted {} of {} rejected referrals older than {}h",
        deleted_count, found_referrals, REJECTED_RETENTION_HOURS
    );
    Ok(CleanupReport {
        deleted_count,
        found_referrals,
        cutoff_date,
    })
}

/// Background cleanup loop. Runs one pass immediately, then once per
/// interval, until [`CleanupTask::shutdown`] is called or the task is dropped.
pub struct CleanupTask {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    pub fn spawn<S: ReferralStore>(store: S, every: Duration) -> Self {
        let every = every.max(Duration::from_secs(1));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        // failures wait for the next tick
                        if let Err(e) = cleanup_rejected(&store, Utc::now()).await {
                            tracing::error!("[CleanupTask] cleanup pass failed: {}", e);
                        }
                    }
                }
            }
            tracing::info!("[CleanupTask] stopped");
        });

        tracing::info!("[CleanupTask] scheduled every {}s", every.as_secs());
        Self {
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.handle.await {
            tracing::warn!("[CleanupTask] task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_cutoff_is_a_full_retention_window_back() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        assert_eq!(retention_cutoff(now), Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_predicate_targets_only_rejected_referrals() {
        let now = Utc::now();
        let filter = stale_rejected(now);
        assert_eq!(filter.status, Some(ReferralStatus::Rejected));
        assert_eq!(filter.created_at_or_before, Some(retention_cutoff(now)));
        assert_eq!(filter.employer, None);
        assert_eq!(filter.job_seeker, None);
    }
}
