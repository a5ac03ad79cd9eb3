//! Authentication error taxonomy
//!
//! Every auth failure maps to 401 at the transport boundary; storage and
//! hashing failures map to 500. The variant itself is kept for logging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Never distinguished externally.
    #[error("invalid credentials")]
    InvalidCredential,

    #[error("missing authorization header")]
    MissingAuthHeader,

    #[error("malformed authorization header")]
    MalformedAuthHeader,

    /// Webhook caller presented the wrong API key
    #[error("invalid api key")]
    InvalidApiKey,

    #[error("malformed access token")]
    TokenMalformed,

    #[error("access token expired")]
    TokenExpired,

    #[error("access token signature mismatch")]
    TokenForged,

    #[error("refresh token revoked")]
    RefreshTokenRevoked,

    #[error("refresh token expired")]
    RefreshTokenExpired,

    #[error("refresh token not found")]
    RefreshTokenNotFound,

    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error("hashing failure: {0}")]
    HashingFailure(String),
}

impl AuthError {
    /// Stable machine-readable kind, used in logs and error pairs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredential => "invalid_credential",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::MalformedAuthHeader => "malformed_auth_header",
            AuthError::InvalidApiKey => "invalid_api_key",
            AuthError::TokenMalformed => "token_malformed",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenForged => "token_forged",
            AuthError::RefreshTokenRevoked => "refresh_token_revoked",
            AuthError::RefreshTokenExpired => "refresh_token_expired",
            AuthError::RefreshTokenNotFound => "refresh_token_not_found",
            AuthError::StorageFailure(_) => "storage_failure",
            AuthError::HashingFailure(_) => "hashing_failure",
        }
    }

    /// Failures of the server itself rather than of the caller's credentials
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::StorageFailure(_) | AuthError::HashingFailure(_)
        )
    }

    /// Message safe to hand back to the caller
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredential => "Incorrect email or password",
            AuthError::MissingAuthHeader => "Missing credential",
            AuthError::MalformedAuthHeader => "Malformed authorization header",
            AuthError::InvalidApiKey => "Invalid API key",
            AuthError::TokenMalformed | AuthError::TokenExpired | AuthError::TokenForged => {
                "Invalid or expired token"
            }
            AuthError::RefreshTokenRevoked
            | AuthError::RefreshTokenExpired
            | AuthError::RefreshTokenNotFound => "Invalid or expired refresh token",
            AuthError::StorageFailure(_) | AuthError::HashingFailure(_) => {
                "Internal server error"
            }
        }
    }
}

impl From<crate::repository::StoreError> for AuthError {
    fn from(e: crate::repository::StoreError) -> Self {
        AuthError::StorageFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_and_forged_share_public_message() {
        assert_eq!(
            AuthError::TokenExpired.public_message(),
            AuthError::TokenForged.public_message()
        );
        assert_ne!(AuthError::TokenExpired.kind(), AuthError::TokenForged.kind());
    }

    #[test]
    fn test_internal_kinds() {
        assert!(AuthError::StorageFailure("down".into()).is_internal());
        assert!(AuthError::HashingFailure("rng".into()).is_internal());
        assert!(!AuthError::InvalidCredential.is_internal());
        assert!(!AuthError::RefreshTokenRevoked.is_internal());
    }
}
