//! Referral projections returned to callers, with referenced documents
//! resolved. Field names follow the JSON shape clients already consume.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Job, Referral, ReferralStatus, User};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub company: String,
    pub position: String,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_hex(),
            company: job.company.clone(),
            position: job.position.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub skills: Vec<String>,
    pub description: String,
    pub job_id: Option<String>,
    pub job_url: Option<String>,
}

impl From<&Job> for JobDetail {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_hex(),
            company: job.company.clone(),
            position: job.position.clone(),
            location: job.location.clone(),
            skills: job.skills.clone(),
            description: job.description.clone(),
            job_id: job.job_id.clone(),
            job_url: job.job_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub years_of_experience: Option<i32>,
    pub current_company: Option<String>,
    pub linkedin_profile: Option<String>,
}

impl From<&User> for EmployerProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
            years_of_experience: user.years_of_experience,
            current_company: user.current_company.clone(),
            linkedin_profile: user.linkedin_profile.clone(),
        }
    }
}

/// A referral with its references left as ids.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralView {
    #[serde(rename = "_id")]
    pub id: String,
    pub job: String,
    pub employer: String,
    pub job_seeker: String,
    pub status: ReferralStatus,
    pub date: DateTime<Utc>,
}

impl From<&Referral> for ReferralView {
    fn from(referral: &Referral) -> Self {
        Self {
            id: referral.id.to_hex(),
            job: referral.job.to_hex(),
            employer: referral.employer.to_hex(),
            job_seeker: referral.job_seeker.to_hex(),
            status: referral.status,
            date: referral.date,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentReferral {
    #[serde(rename = "_id")]
    pub id: String,
    pub job: JobSummary,
    pub employer: String,
    pub job_seeker: UserSummary,
    pub status: ReferralStatus,
    pub date: DateTime<Utc>,
}

impl SentReferral {
    pub fn new(referral: &Referral, job: &Job, job_seeker: &User) -> Self {
        Self {
            id: referral.id.to_hex(),
            job: job.into(),
            employer: referral.employer.to_hex(),
            job_seeker: job_seeker.into(),
            status: referral.status,
            date: referral.date,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedReferral {
    #[serde(rename = "_id")]
    pub id: String,
    pub job: JobSummary,
    pub employer: EmployerProfile,
    pub job_seeker: String,
    pub status: ReferralStatus,
    pub date: DateTime<Utc>,
}

impl ReceivedReferral {
    pub fn new(referral: &Referral, job: &Job, employer: &User) -> Self {
        Self {
            id: referral.id.to_hex(),
            job: job.into(),
            employer: employer.into(),
            job_seeker: referral.job_seeker.to_hex(),
            status: referral.status,
            date: referral.date,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub job: JobDetail,
    pub employer: EmployerProfile,
    pub job_seeker: UserSummary,
    pub status: ReferralStatus,
    pub date: DateTime<Utc>,
}

impl ReferralDetail {
    pub fn new(referral: &Referral, job: &Job, employer: &User, job_seeker: &User) -> Self {
        Self {
            id: referral.id.to_hex(),
            job: job.into(),
            employer: employer.into(),
            job_seeker: job_seeker.into(),
            status: referral.status,
            date: referral.date,
        }
    }
}

/// One log line for a referral, naming the other party and the job.
/// Deleted records are shown by id.
pub fn describe(referral: &Referral, job: Option<&Job>, counterpart: Option<&User>) -> String {
    let job = job.map_or_else(
        || format!("deleted job {}", referral.job),
        |job| format!("{} at {}", job.position, job.company),
    );
    let who = counterpart.map_or_else(|| "deleted user".to_string(), |user| user.name.clone());
    format!(
        "{}: {} ({}, {})",
        who, job, referral.status, referral.date.format("%Y-%m-%d %H:%M UTC")
    )
}

/// Which reference of a referral no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReference {
    Job(ObjectId),
    User(ObjectId),
}

/// A listed referral: either fully resolved, or kept as a marker that the
/// record exists but points at deleted data.
#[derive(Debug, Clone, PartialEq)]
pub enum Populated<T> {
    Resolved(T),
    Stale {
        referral: ObjectId,
        missing: MissingReference,
    },
}

impl<T> Populated<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Populated::Stale { .. })
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Populated::Resolved(value) => Some(value),
            Populated::Stale { .. } => None,
        }
    }
}

/// Splits a listing into its resolved entries and the number of stale ones.
pub fn split_stale<T>(entries: Vec<Populated<T>>) -> (Vec<T>, usize) {
    let total = entries.len();
    let resolved: Vec<T> = entries.into_iter().filter_map(Populated::resolved).collect();
    let stale = total - resolved.len();
    (resolved, stale)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{ReferralStatus, UserRole};

    #[test]
    fn test_describe_names_party_and_job() {
        let seeker = User::new("Sam Seeker", "sam@example.com", UserRole::Jobseeker);
        let employer = User::new("Erin Employer", "erin@example.com", UserRole::Employer);
        let job = Job::new(seeker.id, "Acme", "Backend Engineer");

        let mut referral = Referral::new(&job, &employer);
        referral.status = ReferralStatus::Rejected;
        referral.date = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        assert_eq!(
            describe(&referral, Some(&job), Some(&seeker)),
            "Sam Seeker: Backend Engineer at Acme (rejected, 2024-03-01 09:30 UTC)"
        );
        assert_eq!(
            describe(&referral, None, None),
            format!("deleted user: deleted job {} (rejected, 2024-03-01 09:30 UTC)", job.id)
        );
    }
}
