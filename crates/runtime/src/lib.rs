mod error;
mod job;
mod manager;
mod referral;
mod user;

pub mod cleanup;
pub mod store;
pub mod sweep;
pub mod view;

pub use error::{ReferralError, Result};
pub use job::Job;
pub use manager::{parse_object_id, ClearReport, ReferralManager};
pub use referral::{Referral, ReferralFilter, ReferralStatus, JOB_EMPLOYER_INDEX};
pub use user::{User, UserRole};

pub use cleanup::{CleanupReport, CleanupTask, CLEANUP_INTERVAL, REJECTED_RETENTION_HOURS};
pub use store::{MemoryStore, MongoStore, ReferralStore};
pub use sweep::SweepReport;

pub use bson::oid::ObjectId;
