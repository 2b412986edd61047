use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use referral_database::{doc, IndexModel, IndexOptions, MongoDbObject};

use crate::{Job, ReferralError, User};

pub const JOB_EMPLOYER_INDEX: &str = "job_employer_unique";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ReferralStatus {
    pub const ALL: [ReferralStatus; 3] = [
        ReferralStatus::Pending,
        ReferralStatus::Accepted,
        ReferralStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Accepted => "accepted",
            ReferralStatus::Rejected => "rejected",
        }
    }

    /// Every edge between the three states is currently allowed, including
    /// re-opening an answered referral. Tighten the edges here and nowhere else.
    pub fn can_transition_to(&self, _next: ReferralStatus) -> bool {
        true
    }

    pub fn transition_to(self, next: ReferralStatus) -> Result<ReferralStatus, ReferralError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ReferralError::invalid(format!(
                "Cannot move referral from {} to {}", self, next
            )))
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferralStatus {
    type Err = ReferralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReferralStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ReferralError::invalid("Invalid status"))
    }
}

/// An employer's referral offer for one job, addressed to the job's owner.
/// Only `status` changes after creation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub job: ObjectId,
    pub employer: ObjectId,
    pub job_seeker: ObjectId,
    #[serde(default)]
    pub status: ReferralStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
}

impl Referral {
    /// The addressee is always the job's owner; it is never chosen by the employer.
    pub fn new(job: &Job, employer: &User) -> Self {
        Self {
            id: ObjectId::new(),
            job: job.id,
            employer: employer.id,
            job_seeker: job.user,
            status: ReferralStatus::Pending,
            date: Utc::now(),
        }
    }

    pub fn involves(&self, user_id: &ObjectId) -> bool {
        self.employer == *user_id || self.job_seeker == *user_id
    }
}

impl MongoDbObject for Referral {
    const COLLECTION_NAME: &'static str = "referrals";
    type Error = ReferralError;

    fn get_id(&self) -> ObjectId {
        self.id
    }

    fn indexes() -> Vec<IndexModel> {
        vec![
            IndexModel::builder()
                .keys(doc! { "job": 1, "employer": 1 })
                .options(IndexOptions::builder()
                    .unique(true)
                    .name(JOB_EMPLOYER_INDEX.to_string())
                    .build())
                .build(),
            IndexModel::builder().keys(doc! { "employer": 1, "date": -1 }).build(),
            IndexModel::builder().keys(doc! { "jobSeeker": 1, "date": -1 }).build(),
            IndexModel::builder().keys(doc! { "status": 1, "date": 1 }).build(),
        ]
    }
}

/// Typed selection over referrals, evaluated by every store implementation.
/// Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferralFilter {
    pub employer: Option<ObjectId>,
    pub job_seeker: Option<ObjectId>,
    pub status: Option<ReferralStatus>,
    pub created_at_or_before: Option<DateTime<Utc>>,
}

impl ReferralFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn sent_by(employer: ObjectId) -> Self {
        Self { employer: Some(employer), ..Self::default() }
    }

    pub fn received_by(job_seeker: ObjectId) -> Self {
        Self { job_seeker: Some(job_seeker), ..Self::default() }
    }

    pub fn with_status(mut self, status: ReferralStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn created_at_or_before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.created_at_or_before = Some(cutoff);
        self
    }

    pub fn matches(&self, referral: &Referral) -> bool {
        self.employer.map_or(true, |id| referral.employer == id)
            && self.job_seeker.map_or(true, |id| referral.job_seeker == id)
            && self.status.map_or(true, |status| referral.status == status)
            && self.created_at_or_before.map_or(true, |cutoff| referral.date <= cutoff)
    }
}
