use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cleanup::{cleanup_rejected, CleanupReport};
use crate::error::Traced;
use crate::store::{log_referral_details, ReferralStore};
use crate::sweep::{sweep_orphaned, SweepReport};
use crate::view::{MissingReference, Populated, ReceivedReferral, ReferralDetail, SentReferral};
use crate::{Referral, ReferralError, ReferralFilter, ReferralStatus, Result, User, UserRole};

const REFERRAL_NOT_FOUND: &str = "Referral not found";

/// Validates an externally supplied identifier before it reaches the store,
/// so a malformed id is a bad request rather than a missing record.
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| ReferralError::invalid(format!("Invalid {} ID format", what)))
}

fn require_role(actor: &User, role: UserRole, msg: &str) -> Result<()> {
    if actor.is(role) {
        Ok(())
    } else {
        Err(ReferralError::role_mismatch(msg))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub deleted_count: u64,
    pub user_name: String,
}

/// Create/read/update/delete and listing of referrals, with the role and
/// party checks each operation requires.
#[derive(Clone)]
pub struct ReferralManager<S> {
    store: S,
}

impl<S: ReferralStore> ReferralManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the acting user behind an authenticated identity.
    pub async fn resolve_actor(&self, user_id: &ObjectId) -> Result<User> {
        self.store.find_user(user_id).await
            .traced("resolve_actor", user_id)?
            .ok_or_else(|| ReferralError::not_authorized("User no longer exists"))
    }

    pub async fn create(&self, actor: &User, job_id: Option<&str>) -> Result<Referral> {
        require_role(actor, UserRole::Employer, "Only employers can create referrals")?;

        let raw = job_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ReferralError::invalid("Job ID is required"))?;
        let job_id = parse_object_id(raw, "job")?;

        let job = self.store.find_job(&job_id).await
            .traced("create_referral", &job_id)?
            .ok_or_else(|| ReferralError::not_found("Job not found"))?;

        let referral = self.store.insert_referral(Referral::new(&job, actor)).await
            .traced("create_referral", &job_id)?;

        tracing::info!(
            "[ReferralManager::create] {} referred job {} to {}",
            actor.id, job.id, referral.job_seeker
        );
        Ok(referral)
    }

    /// Fetches one referral for either of its two parties. A referral whose
    /// job or parties have been deleted is no longer accessible.
    pub async fn get(&self, actor: &User, id: &str) -> Result<ReferralDetail> {
        let id = parse_object_id(id, "referral")?;
        let referral = self.store.find_referral(&id).await
            .traced("get_referral", &id)?
            .ok_or_else(|| ReferralError::not_found(REFERRAL_NOT_FOUND))?;

        if !referral.involves(&actor.id) {
            return Err(ReferralError::not_authorized("Not authorized to view this referral"));
        }

        let job = self.store.find_job(&referral.job).await.traced("get_referral", &id)?;
        let employer = self.store.find_user(&referral.employer).await.traced("get_referral", &id)?;
        let job_seeker = self.store.find_user(&referral.job_seeker).await.traced("get_referral", &id)?;

        match (job, employer, job_seeker) {
            (Some(job), Some(employer), Some(job_seeker)) => {
                Ok(ReferralDetail::new(&referral, &job, &employer, &job_seeker))
            }
            _ => {
                tracing::warn!("[ReferralManager::get] referral {} references deleted records", id);
                Err(ReferralError::not_found(REFERRAL_NOT_FOUND))
            }
        }
    }

    /// Referrals the employer has sent, newest first.
    pub async fn list_sent(&self, actor: &User) -> Result<Vec<Populated<SentReferral>>> {
        require_role(actor, UserRole::Employer, "Only employers can view sent referrals")?;

        let referrals = self.store.find_referrals(&ReferralFilter::sent_by(actor.id)).await
            .traced("list_sent", &actor.id)?;

        let mut entries = Vec::with_capacity(referrals.len());
        for referral in referrals {
            let job = self.store.find_job(&referral.job).await.traced("list_sent", &referral.id)?;
            let job_seeker = self.store.find_user(&referral.job_seeker).await.traced("list_sent", &referral.id)?;

            entries.push(match (job, job_seeker) {
                (Some(job), Some(job_seeker)) => {
                    Populated::Resolved(SentReferral::new(&referral, &job, &job_seeker))
                }
                (None, _) => stale(&referral, MissingReference::Job(referral.job)),
                (_, None) => stale(&referral, MissingReference::User(referral.job_seeker)),
            });
        }
        Ok(entries)
    }

    /// Referrals addressed to the job seeker, newest first.
    pub async fn list_received(&self, actor: &User) -> Result<Vec<Populated<ReceivedReferral>>> {
        require_role(actor, UserRole::Jobseeker, "Only job seekers can view received referrals")?;

        let referrals = self.store.find_referrals(&ReferralFilter::received_by(actor.id)).await
            .traced("list_received", &actor.id)?;

        let mut entries = Vec::with_capacity(referrals.len());
        for referral in referrals {
            let job = self.store.find_job(&referral.job).await.traced("list_received", &referral.id)?;
            let employer = self.store.find_user(&referral.employer).await.traced("list_received", &referral.id)?;

            entries.push(match (job, employer) {
                (Some(job), Some(employer)) => {
                    Populated::Resolved(ReceivedReferral::new(&referral, &job, &employer))
                }
                (None, _) => stale(&referral, MissingReference::Job(referral.job)),
                (_, None) => stale(&referral, MissingReference::User(referral.employer)),
            });
        }
        Ok(entries)
    }

    /// Only the addressed job seeker may answer a referral.
    pub async fn update_status(&self, actor: &User, id: &str, status: Option<&str>) -> Result<Referral> {
        let id = parse_object_id(id, "referral")?;
        let next: ReferralStatus = status.unwrap_or_default().parse()?;

        let referral = self.store.find_referral(&id).await
            .traced("update_referral_status", &id)?
            .ok_or_else(|| ReferralError::not_found(REFERRAL_NOT_FOUND))?;

        if referral.job_seeker != actor.id {
            return Err(ReferralError::not_authorized("Not authorized"));
        }

        let next = referral.status.transition_to(next)?;
        let updated = self.store.set_referral_status(&id, next).await
            .traced("update_referral_status", &id)?
            .ok_or_else(|| ReferralError::not_found(REFERRAL_NOT_FOUND))?;

        tracing::info!(
            "[ReferralManager::update_status] referral {} {} -> {}",
            id, referral.status, updated.status
        );
        Ok(updated)
    }

    /// Only the employer who sent a referral may withdraw it.
    pub async fn delete(&self, actor: &User, id: &str) -> Result<()> {
        let id = parse_object_id(id, "referral")?;
        let referral = self.store.find_referral(&id).await
            .traced("delete_referral", &id)?
            .ok_or_else(|| ReferralError::not_found(REFERRAL_NOT_FOUND))?;

        if referral.employer != actor.id {
            tracing::debug!(
                "[ReferralManager::delete] {} is not the employer {} of referral {}",
                actor.id, referral.employer, id
            );
            return Err(ReferralError::not_authorized("Not authorized to delete this referral"));
        }

        self.store.delete_referral(&id).await.traced("delete_referral", &id)?;
        tracing::info!("[ReferralManager::delete] referral {} removed by {}", id, actor.id);
        Ok(())
    }

    /// Removes every referral addressed to the job seeker, whatever its status.
    pub async fn clear_all(&self, actor: &User) -> Result<ClearReport> {
        require_role(actor, UserRole::Jobseeker, "Only job seekers can clear their referrals")?;

        let filter = ReferralFilter::received_by(actor.id);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let pending_removal = self.store.find_referrals(&filter).await
                .traced("clear_referrals", &actor.id)?;
            log_referral_details(&self.store, "ReferralManager::clear_all", &pending_removal, |r| r.employer)
                .await
                .traced("clear_referrals", &actor.id)?;
        }

        let deleted_count = self.store.delete_referrals(&filter).await
            .traced("clear_referrals", &actor.id)?;
        tracing::info!(
            "[ReferralManager::clear_all] cleared {} referrals for {} ({})",
            deleted_count, actor.name, actor.id
        );

        Ok(ClearReport {
            deleted_count,
            user_name: actor.name.clone(),
        })
    }

    pub async fn cleanup_rejected(&self, now: DateTime<Utc>) -> Result<CleanupReport> {
        cleanup_rejected(&self.store, now).await.traced("cleanup_rejected", &now)
    }

    pub async fn sweep_orphaned(&self) -> Result<SweepReport> {
        sweep_orphaned(&self.store).await.traced("sweep_orphaned", &"referrals")
    }
}

fn stale<T>(referral: &Referral, missing: MissingReference) -> Populated<T> {
    tracing::warn!("[ReferralManager] referral {} has a dangling reference: {:?}", referral.id, missing);
    Populated::Stale {
        referral: referral.id,
        missing,
    }
}
