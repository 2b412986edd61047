use anyhow::anyhow;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use referral_common::{decrypt, encrypt, get_current_timestamp};
use referral_runtime::ObjectId;

use crate::response::AppError;
use crate::utils::{extract_auth_token, INVALID_TOKEN};

pub const MISSING_TOKEN: &str = "No token, authorization denied";
pub const TOKEN_ORIGIN: &str = "referral-service";

/// Sealed token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedRequest {
    pub user_id: String,
    pub timestamp: u64,
    pub origin: String,
}

/// The identity the auth middleware attaches to each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_salt: String,
    pub token_ttl_secs: u64,
}

pub fn issue_auth_token(user_id: &ObjectId, secret_salt: &str) -> anyhow::Result<String> {
    let request = AuthenticatedRequest {
        user_id: user_id.to_hex(),
        timestamp: get_current_timestamp(),
        origin: TOKEN_ORIGIN.to_string(),
    };
    encrypt(&serde_json::to_string(&request)?, secret_salt)
}

pub fn verify_auth_token(token: &str, auth: &AuthConfig) -> Result<ObjectId, AppError> {
    let invalid = || AppError::new(StatusCode::UNAUTHORIZED, anyhow!(INVALID_TOKEN));

    let decrypted = decrypt(token, &auth.secret_salt).map_err(|e| {
        tracing::debug!("[authenticate] token rejected: {}", e);
        invalid()
    })?;
    let request: AuthenticatedRequest = serde_json::from_str(&decrypted).map_err(|_| invalid())?;

    if request.timestamp.saturating_add(auth.token_ttl_secs) < get_current_timestamp() {
        tracing::debug!("[authenticate] token for {} expired", request.user_id);
        return Err(invalid());
    }

    ObjectId::parse_str(&request.user_id).map_err(|_| invalid())
}

pub async fn authenticate(
    State(auth): State<AuthConfig>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_auth_token(&req)?
        .ok_or_else(|| AppError::new(StatusCode::UNAUTHORIZED, anyhow!(MISSING_TOKEN)))?;
    let user_id = verify_auth_token(&token, &auth)?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });
    Ok(next.run(req).await)
}
