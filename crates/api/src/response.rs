use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use referral_runtime::ReferralError;

pub const STALE_REFERRALS_HEADER: &str = "x-stale-referrals";
const SERVER_ERROR: &str = "Server Error";

/// A successful JSON response. Listings may carry the number of entries that
/// were dropped because their references no longer resolve.
#[derive(Debug, Clone)]
pub struct AppSuccess<T> {
    pub status: StatusCode,
    pub body: T,
    pub stale_entries: Option<usize>,
}

impl<T: Serialize> AppSuccess<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            stale_entries: None,
        }
    }

    pub fn with_stale_entries(mut self, stale_entries: usize) -> Self {
        self.stale_entries = Some(stale_entries);
        self
    }
}

impl<T: Serialize> IntoResponse for AppSuccess<T> {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(stale) = self.stale_entries {
            response.headers_mut().insert(STALE_REFERRALS_HEADER, HeaderValue::from(stale));
        }
        response
    }
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub msg: String,
}

impl Message {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[derive(Debug)]
pub struct AppError(pub StatusCode, pub anyhow::Error);

impl AppError {
    pub fn new(status: StatusCode, err: anyhow::Error) -> Self {
        Self(status, err)
    }
}

// Server errors never echo their cause to the caller.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            tracing::error!("CODE: {}, MESSAGE: {:#}", self.0.as_u16(), self.1);
            return (self.0, Json(json!({ "msg": SERVER_ERROR }))).into_response();
        }

        tracing::debug!("CODE: {}, MESSAGE: {}", self.0.as_u16(), self.1);
        (self.0, Json(Message::new(self.1.to_string()))).into_response()
    }
}

impl From<ReferralError> for AppError {
    fn from(err: ReferralError) -> Self {
        let status = match &err {
            ReferralError::InvalidArgument(_) | ReferralError::Conflict(_) => StatusCode::BAD_REQUEST,
            ReferralError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            ReferralError::RoleMismatch(_) => StatusCode::FORBIDDEN,
            ReferralError::NotFound(_) => StatusCode::NOT_FOUND,
            ReferralError::Database(_)
            | ReferralError::Encode(_)
            | ReferralError::Decode(_)
            | ReferralError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self(status, err.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self(StatusCode::BAD_REQUEST, anyhow::anyhow!(rejection.body_text()))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}
