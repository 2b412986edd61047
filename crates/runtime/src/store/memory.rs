use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::Mutex;

use super::{ReferralStore, DUPLICATE_REFERRAL};
use crate::{Job, Referral, ReferralError, ReferralFilter, ReferralStatus, Result, User};

#[derive(Default)]
struct MemoryState {
    users: HashMap<ObjectId, User>,
    jobs: HashMap<ObjectId, Job>,
    referrals: HashMap<ObjectId, Referral>,
}

/// In-process store with the same uniqueness rule as the Mongo collection.
/// Users and jobs are seeded directly since their lifecycles live elsewhere.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) -> User {
        self.state.lock().await.users.insert(user.id, user.clone());
        user
    }

    pub async fn insert_job(&self, job: Job) -> Job {
        self.state.lock().await.jobs.insert(job.id, job.clone());
        job
    }

    pub async fn remove_user(&self, id: &ObjectId) -> bool {
        self.state.lock().await.users.remove(id).is_some()
    }

    /// Removes the job only; dependent referrals are left dangling.
    pub async fn remove_job(&self, id: &ObjectId) -> bool {
        self.state.lock().await.jobs.remove(id).is_some()
    }

    /// Writes a referral as-is, bypassing the uniqueness check.
    pub async fn put_referral(&self, referral: Referral) {
        self.state.lock().await.referrals.insert(referral.id, referral);
    }

    pub async fn referral_count(&self) -> usize {
        self.state.lock().await.referrals.len()
    }
}

#[async_trait]
impl ReferralStore for MemoryStore {
    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn find_job(&self, id: &ObjectId) -> Result<Option<Job>> {
        Ok(self.state.lock().await.jobs.get(id).cloned())
    }

    async fn insert_referral(&self, referral: Referral) -> Result<Referral> {
        let mut state = self.state.lock().await;
        let duplicate = state.referrals.values()
            .any(|r| r.job == referral.job && r.employer == referral.employer);
        if duplicate {
            return Err(ReferralError::Conflict(DUPLICATE_REFERRAL.to_string()));
        }

        state.referrals.insert(referral.id, referral.clone());
        Ok(referral)
    }

    async fn find_referral(&self, id: &ObjectId) -> Result<Option<Referral>> {
        Ok(self.state.lock().await.referrals.get(id).cloned())
    }

    async fn find_referrals(&self, filter: &ReferralFilter) -> Result<Vec<Referral>> {
        let state = self.state.lock().await;
        let mut referrals: Vec<Referral> = state.referrals.values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        referrals.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(referrals)
    }

    async fn count_referrals(&self, filter: &ReferralFilter) -> Result<u64> {
        let state = self.state.lock().await;
        Ok(state.referrals.values().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn set_referral_status(&self, id: &ObjectId, status: ReferralStatus) -> Result<Option<Referral>> {
        let mut state = self.state.lock().await;
        Ok(state.referrals.get_mut(id).map(|referral| {
            referral.status = status;
            referral.clone()
        }))
    }

    async fn delete_referral(&self, id: &ObjectId) -> Result<u64> {
        Ok(self.state.lock().await.referrals.remove(id).map_or(0, |_| 1))
    }

    async fn delete_referrals(&self, filter: &ReferralFilter) -> Result<u64> {
        let mut state = self.state.lock().await;
        let before = state.referrals.len();
        state.referrals.retain(|_, r| !filter.matches(r));
        Ok((before - state.referrals.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserRole;

    #[tokio::test]
    async fn test_duplicate_pair_is_rejected_by_the_store() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let seeker = store.insert_user(User::new("Sam", "sam@example.com", UserRole::Jobseeker)).await;
        let employer = store.insert_user(User::new("Erin", "erin@example.com", UserRole::Employer)).await;
        let job = store.insert_job(Job::new(seeker.id, "Acme", "Engineer")).await;

        store.insert_referral(Referral::new(&job, &employer)).await?;
        let err = store.insert_referral(Referral::new(&job, &employer)).await.unwrap_err();
        assert!(matches!(err, ReferralError::Conflict(_)));
        assert_eq!(store.referral_count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let seeker = User::new("Sam", "sam@example.com", UserRole::Jobseeker);
        let employer = User::new("Erin", "erin@example.com", UserRole::Employer);

        let mut older = Referral::new(&Job::new(seeker.id, "Acme", "Engineer"), &employer);
        older.date = older.date - chrono::Duration::hours(2);
        let newer = Referral::new(&Job::new(seeker.id, "Globex", "Analyst"), &employer);
        store.put_referral(older.clone()).await;
        store.put_referral(newer.clone()).await;

        let listed = store.find_referrals(&ReferralFilter::sent_by(employer.id)).await?;
        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer.id, older.id]);
        Ok(())
    }
}
