use async_trait::async_trait;
use bson::oid::ObjectId;

use referral_database::{doc, is_duplicate_key, Database, Document, MongoDbObject};

use super::{ReferralStore, DUPLICATE_REFERRAL};
use crate::{Job, Referral, ReferralError, ReferralFilter, ReferralStatus, Result, User};

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// The unique `(job, employer)` index is the only unique constraint on the
/// collection, so any duplicate-key rejection is a repeated referral.
fn conflict_on_duplicate(err: ReferralError) -> ReferralError {
    match err {
        ReferralError::Database(e) if is_duplicate_key(&e) => {
            ReferralError::Conflict(DUPLICATE_REFERRAL.to_string())
        }
        other => other,
    }
}

fn filter_document(filter: &ReferralFilter) -> Document {
    let mut query = Document::new();
    if let Some(employer) = filter.employer {
        query.insert("employer", employer);
    }
    if let Some(job_seeker) = filter.job_seeker {
        query.insert("jobSeeker", job_seeker);
    }
    if let Some(status) = filter.status {
        query.insert("status", status.as_str());
    }
    if let Some(cutoff) = filter.created_at_or_before {
        query.insert("date", doc! { "$lte": bson::DateTime::from_chrono(cutoff) });
    }
    query
}

#[async_trait]
impl ReferralStore for MongoStore {
    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>> {
        User::select_one_by_index(&self.db, id).await
    }

    async fn find_job(&self, id: &ObjectId) -> Result<Option<Job>> {
        Job::select_one_by_index(&self.db, id).await
    }

    async fn insert_referral(&self, referral: Referral) -> Result<Referral> {
        referral.insert(&self.db).await.map_err(conflict_on_duplicate)
    }

    async fn find_referral(&self, id: &ObjectId) -> Result<Option<Referral>> {
        Referral::select_one_by_index(&self.db, id).await
    }

    async fn find_referrals(&self, filter: &ReferralFilter) -> Result<Vec<Referral>> {
        Referral::select_many(
            &self.db,
            filter_document(filter),
            Some(doc! { "date": -1, "_id": -1 }),
            None,
            None,
        ).await
    }

    async fn count_referrals(&self, filter: &ReferralFilter) -> Result<u64> {
        Referral::total_count(&self.db, filter_document(filter)).await
    }

    async fn set_referral_status(&self, id: &ObjectId, status: ReferralStatus) -> Result<Option<Referral>> {
        Referral::find_one_and_update(
            &self.db,
            doc! { "_id": *id },
            doc! { "$set": { "status": status.as_str() } },
        ).await
    }

    async fn delete_referral(&self, id: &ObjectId) -> Result<u64> {
        Referral::delete_one_by_index(&self.db, id).await
    }

    async fn delete_referrals(&self, filter: &ReferralFilter) -> Result<u64> {
        Referral::delete_many(&self.db, filter_document(filter)).await
    }
}
