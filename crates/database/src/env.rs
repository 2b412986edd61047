use anyhow::Result;

use referral_common::{env_or, required_env, EnvVars};

pub const DEFAULT_DATABASE_NAME: &str = "referrals";

#[derive(Debug, Clone)]
pub struct MongoDbEnv {
    pub mongodb_uri: String,
    pub database_name: String,
}

impl EnvVars for MongoDbEnv {
    fn load() -> Result<Self> {
        Ok(Self {
            mongodb_uri: required_env("MONGODB_URI")?,
            database_name: env_or("MONGODB_DATABASE", DEFAULT_DATABASE_NAME.to_string())?,
        })
    }

    fn get_env_var(&self, key: &str) -> Option<String> {
        match key {
            "MONGODB_URI" => Some(self.mongodb_uri.clone()),
            "MONGODB_DATABASE" => Some(self.database_name.clone()),
            _ => None,
        }
    }
}
