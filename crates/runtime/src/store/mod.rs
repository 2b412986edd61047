mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use bson::oid::ObjectId;

use crate::view::describe;
use crate::{Job, Referral, ReferralFilter, ReferralStatus, Result, User};

/// Persistence seam for the referral lifecycle. Each call is a single store
/// round trip; nothing spans calls in a transaction.
#[async_trait::async_trait]
pub trait ReferralStore: Clone + Send + Sync + 'static {
    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>>;
    async fn find_job(&self, id: &ObjectId) -> Result<Option<Job>>;

    /// Inserts a new referral. A second referral for the same (job, employer)
    /// pair is rejected with `Conflict` by the store itself.
    async fn insert_referral(&self, referral: Referral) -> Result<Referral>;
    async fn find_referral(&self, id: &ObjectId) -> Result<Option<Referral>>;
    /// Matching referrals, newest first.
    async fn find_referrals(&self, filter: &ReferralFilter) -> Result<Vec<Referral>>;
    async fn count_referrals(&self, filter: &ReferralFilter) -> Result<u64>;
    /// Sets the status and returns the updated referral, or `None` if it is gone.
    async fn set_referral_status(&self, id: &ObjectId, status: ReferralStatus) -> Result<Option<Referral>>;
    async fn delete_referral(&self, id: &ObjectId) -> Result<u64>;
    async fn delete_referrals(&self, filter: &ReferralFilter) -> Result<u64>;
}

pub(crate) const DUPLICATE_REFERRAL: &str = "You have already sent a referral for this job";

/// Debug-logs each referral with its job and the party picked by `counterpart`.
pub(crate) async fn log_referral_details<S, F>(store: &S, op: &str, referrals: &[Referral], counterpart: F) -> Result<()>
where
    S: ReferralStore,
    F: Fn(&Referral) -> ObjectId,
{
    for referral in referrals {
        let job = store.find_job(&referral.job).await?;
        let party = store.find_user(&counterpart(referral)).await?;
        tracing::debug!("[{}] - {}", op, describe(referral, job.as_ref(), party.as_ref()));
    }
    Ok(())
}
