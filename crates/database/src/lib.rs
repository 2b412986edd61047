mod db;
mod db_object;
mod env;

pub use db::{connect, is_duplicate_key};
pub use db_object::MongoDbObject;
pub use env::MongoDbEnv;

pub use bson::{doc, oid::ObjectId, Document};
pub use referral_common::EnvVars;
#[doc(hidden)]
pub use tokio::sync::OnceCell;
pub use mongodb::{options::IndexOptions, Database, IndexModel};
