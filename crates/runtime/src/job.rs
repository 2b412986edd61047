use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use referral_database::MongoDbObject;

use crate::ReferralError;

/// A job posting. `user` is the job seeker the posting belongs to and the
/// implicit addressee of every referral made against it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,

    pub company: String,
    pub position: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub job_id: Option<String>,
    pub job_url: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
}

impl Job {
    pub fn new(owner: ObjectId, company: &str, position: &str) -> Self {
        Self {
            id: ObjectId::new(),
            user: owner,
            company: company.to_string(),
            position: position.to_string(),
            location: String::new(),
            skills: Vec::new(),
            description: String::new(),
            job_id: None,
            job_url: None,
            date: Utc::now(),
        }
    }
}

impl MongoDbObject for Job {
    const COLLECTION_NAME: &'static str = "jobs";
    type Error = ReferralError;

    fn get_id(&self) -> ObjectId {
        self.id
    }
}
