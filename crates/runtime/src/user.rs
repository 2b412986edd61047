use std::fmt;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use referral_database::MongoDbObject;

use crate::ReferralError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employer,
    Jobseeker,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employer => "employer",
            UserRole::Jobseeker => "jobseeker",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered account. The role is fixed at registration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub role: UserRole,

    pub current_company: Option<String>,
    pub years_of_experience: Option<i32>,
    pub linkedin_profile: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, role: UserRole) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            current_company: None,
            years_of_experience: None,
            linkedin_profile: None,
            date: Utc::now(),
        }
    }

    pub fn is(&self, role: UserRole) -> bool {
        self.role == role
    }
}

impl MongoDbObject for User {
    const COLLECTION_NAME: &'static str = "users";
    type Error = ReferralError;

    fn get_id(&self) -> ObjectId {
        self.id
    }
}
