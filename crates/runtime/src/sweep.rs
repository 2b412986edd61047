use std::collections::HashMap;

use bson::oid::ObjectId;
use serde::Serialize;

use crate::store::ReferralStore;
use crate::{ReferralFilter, Result};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub scanned: u64,
    pub deleted_count: u64,
}

/// Deletes every referral whose job no longer exists. Full scan; each
/// distinct job is looked up once per pass.
pub async fn sweep_orphaned<S: ReferralStore>(store: &S) -> Result<SweepReport> {
    let referrals = store.find_referrals(&ReferralFilter::all()).await?;
    let mut job_exists: HashMap<ObjectId, bool> = HashMap::new();
    let mut deleted_count = 0;

    for referral in &referrals {
        let exists = match job_exists.get(&referral.job) {
            Some(exists) => *exists,
            None => {
                let exists = store.find_job(&referral.job).await?.is_some();
                job_exists.insert(referral.job, exists);
                exists
            }
        };

        if !exists {
            deleted_count += store.delete_referral(&referral.id).await?;
            tracing::debug!("[sweep_orphaned] removed referral {} for deleted job {}", referral.id, referral.job);
        }
    }

    tracing::info!(
        "[sweep_orphaned] removed {} of {} referrals with deleted jobs",
        deleted_count, referrals.len()
    );
    Ok(SweepReport {
        scanned: referrals.len() as u64,
        deleted_count,
    })
}
