//! Opaque refresh tokens
//!
//! Tokens are random hex strings persisted through [`RefreshTokenRepository`].
//! They are not rotated on use: the same token keeps minting access tokens
//! until it expires or is revoked.

use crate::{auth::AuthError, models::auth::RefreshToken, repository::RefreshTokenRepository};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use uuid::Uuid;

/// Random bytes per token; hex encoding doubles the length
pub const REFRESH_TOKEN_BYTES: usize = 32;

pub struct RefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepository>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(repo: Arc<dyn RefreshTokenRepository>, ttl: Duration) -> Self {
        Self { repo, ttl }
    }

    /// Generate a fresh opaque token string
    pub fn generate_token() -> Result<String, AuthError> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::error!("OS RNG failure while generating refresh token: {}", e);
            AuthError::HashingFailure(e.to_string())
        })?;

        Ok(hex::encode(bytes))
    }

    /// Issue and persist a new refresh token for `user_id`
    pub async fn issue(&self, user_id: Uuid) -> Result<RefreshToken, AuthError> {
        let now = Utc::now();
        let record = RefreshToken {
            token: Self::generate_token()?,
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };

        let stored = self.repo.create_refresh_token(&record).await?;

        tracing::debug!(%user_id, expires_at = %stored.expires_at, "Refresh token issued");
        Ok(stored)
    }

    pub async fn lookup(&self, token: &str) -> Result<RefreshToken, AuthError> {
        self.repo
            .find_refresh_token(token)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)
    }

    pub fn is_usable(token: &RefreshToken) -> bool {
        token.is_usable()
    }

    /// Revoke a token. Revoking twice is accepted and keeps the first timestamp.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        if !self.repo.mark_revoked(token).await? {
            return Err(AuthError::RefreshTokenNotFound);
        }

        tracing::debug!("Refresh token revoked");
        Ok(())
    }

    /// Owning user of a usable token
    pub async fn resolve_user(&self, token: &str) -> Result<Uuid, AuthError> {
        let record = self.lookup(token).await?;

        if record.revoked_at.is_some() {
            return Err(AuthError::RefreshTokenRevoked);
        }

        if !Self::is_usable(&record) {
            return Err(AuthError::RefreshTokenExpired);
        }

        Ok(record.user_id)
    }
}
