use std::fmt::Display;

use thiserror::Error;

pub type Result<T, E = ReferralError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ReferralError {
    /// Malformed identifier, unknown status, or a missing required field.
    #[error("{0}")]
    InvalidArgument(String),

    /// The caller's role does not permit the operation at all.
    #[error("{0}")]
    RoleMismatch(String),

    /// The caller is not a party allowed to act on this particular record.
    #[error("{0}")]
    NotAuthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("document encoding error: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("document decoding error: {0}")]
    Decode(#[from] bson::de::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReferralError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn not_authorized(msg: impl Into<String>) -> Self {
        Self::NotAuthorized(msg.into())
    }

    pub fn role_mismatch(msg: impl Into<String>) -> Self {
        Self::RoleMismatch(msg.into())
    }

    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Encode(_) | Self::Decode(_) | Self::Internal(_)
        )
    }

    /// Logs internal failures with the operation and identifier they happened under.
    /// Caller-facing errors are left to the request log.
    pub(crate) fn trace(&self, op: &'static str, subject: &dyn Display) {
        if self.is_internal() {
            tracing::error!(op, subject = %subject, error = %self, "referral operation failed");
        }
    }
}

pub(crate) trait Traced<T> {
    fn traced(self, op: &'static str, subject: &dyn Display) -> Result<T>;
}

impl<T> Traced<T> for Result<T> {
    fn traced(self, op: &'static str, subject: &dyn Display) -> Result<T> {
        self.inspect_err(|e| e.trace(op, subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_failures_are_internal() {
        assert!(ReferralError::Internal(anyhow::anyhow!("boom")).is_internal());
        assert!(!ReferralError::invalid("bad id").is_internal());
        assert!(!ReferralError::not_found("gone").is_internal());
        assert!(!ReferralError::Conflict("dup".into()).is_internal());
    }

    #[test]
    fn test_caller_errors_display_their_message() {
        assert_eq!(ReferralError::not_authorized("Not authorized").to_string(), "Not authorized");
    }
}
