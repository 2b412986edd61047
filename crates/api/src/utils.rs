use anyhow::anyhow;
use axum::extract::Request;
use axum::http::{header, StatusCode};
use tracing_subscriber::EnvFilter;

use crate::response::AppError;

pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";
pub const INVALID_TOKEN: &str = "Token is not valid";

fn bearer_token(req: &Request) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    match value.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["Bearer", token] => Some(token.to_string()),
        _ => None,
    }
}

/// Reads the caller's token from `Authorization: Bearer <token>`, falling
/// back to the `x-auth-token` header. `Ok(None)` means no token was sent;
/// a malformed `Authorization` header with no usable fallback is invalid.
pub fn extract_auth_token(req: &Request) -> Result<Option<String>, AppError> {
    let invalid = || AppError::new(StatusCode::UNAUTHORIZED, anyhow!(INVALID_TOKEN));

    if let Some(token) = bearer_token(req) {
        return Ok(Some(token));
    }

    let fallback = match req.headers().get(AUTH_TOKEN_HEADER) {
        Some(value) => Some(value.to_str().map_err(|_| invalid())?.trim())
            .filter(|token| !token.is_empty())
            .map(str::to_string),
        None => None,
    };

    match fallback {
        Some(token) => Ok(Some(token)),
        None if req.headers().contains_key(header::AUTHORIZATION) => Err(invalid()),
        None => Ok(None),
    }
}

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
