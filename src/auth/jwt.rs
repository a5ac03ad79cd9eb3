//! Access token signing and validation
//! Short-lived HS256 JWTs carrying the user id as subject

use crate::{auth::AuthError, config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on every access token
pub const TOKEN_ISSUER: &str = "chirpy";

/// Default and maximum access token lifetime
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    pub iss: String,

    /// Subject (user ID)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Signs and verifies access tokens with a process-wide secret
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Create token signer from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self::new(secret.as_bytes()))
    }

    /// Issue an access token for `user_id` valid for `ttl`.
    ///
    /// Callers clamp `ttl` with [`clamp_ttl`] first.
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now + ttl;

        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AuthError::HashingFailure(format!("failed to sign access token: {}", e))
        })
    }

    /// Validate a token and return the user id it was issued for
    pub fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            let err = match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::TokenForged,
                _ => AuthError::TokenMalformed,
            };
            tracing::debug!(kind = err.kind(), "Token validation failed: {:?}", e);
            err
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| {
            tracing::debug!("Token subject is not a user id");
            AuthError::TokenMalformed
        })
    }
}

/// Resolve a requested lifetime in seconds against `max`.
///
/// Absent, non-positive, or over-limit requests fall back to `max`.
pub fn clamp_ttl(requested_secs: Option<i64>, max: Duration) -> Duration {
    match requested_secs {
        Some(secs) if secs > 0 && secs <= max.num_seconds() => Duration::seconds(secs),
        _ => max,
    }
}
