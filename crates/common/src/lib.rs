mod crypto;
mod env;

pub use crypto::{encrypt, decrypt, blake3_hash};
pub use env::{EnvVars, env_or, required_env};

pub fn get_current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
