use std::time::Duration;

use anyhow::Result;
use referral_common::{env_or, required_env, EnvVars};
use referral_runtime::CLEANUP_INTERVAL;

use crate::middleware::AuthConfig;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = CLEANUP_INTERVAL.as_secs();
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ApiServerEnv {
    pub port: u16,
    pub secret_salt: String,
    pub token_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl ApiServerEnv {
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            secret_salt: self.secret_salt.clone(),
            token_ttl_secs: self.token_ttl_secs,
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl EnvVars for ApiServerEnv {
    fn load() -> Result<Self> {
        Ok(Self {
            port: env_or("PORT", DEFAULT_PORT)?,
            secret_salt: required_env("SECRET_SALT")?,
            token_ttl_secs: env_or("TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?,
            cleanup_interval_secs: env_or("CLEANUP_INTERVAL_SECS", DEFAULT_CLEANUP_INTERVAL_SECS)?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
        })
    }

    fn get_env_var(&self, key: &str) -> Option<String> {
        match key {
            "PORT" => Some(self.port.to_string()),
            "SECRET_SALT" => Some(self.secret_salt.clone()),
            "TOKEN_TTL_SECS" => Some(self.token_ttl_secs.to_string()),
            "CLEANUP_INTERVAL_SECS" => Some(self.cleanup_interval_secs.to_string()),
            "REQUEST_TIMEOUT_SECS" => Some(self.request_timeout_secs.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_interval_defaults_to_scheduler_interval() {
        assert_eq!(Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS), CLEANUP_INTERVAL);
    }
}
