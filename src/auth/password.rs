//! Password hashing and verification using Argon2id

use crate::{auth::AuthError, config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Plaintext behind the dummy hash used for unknown accounts
const DUMMY_PASSWORD: &str = "chirpy-dummy-password";

/// Password hasher with configurable parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash with the same params, verified when the account does not exist
    dummy_hash: String,
    verifications: AtomicU64,
}

impl PasswordHasher {
    /// Create hasher with explicit cost parameters
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::HashingFailure(format!("invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = Self::hash_with(&argon2, DUMMY_PASSWORD)?;

        Ok(Self {
            argon2,
            dummy_hash,
            verifications: AtomicU64::new(0),
        })
    }

    /// Create hasher from the security section of the config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        Self::with_params(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        Self::hash_with(&self.argon2, password)
    }

    fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AuthError::HashingFailure(e.to_string())
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a hash.
    ///
    /// `Ok(false)` means the password does not match; `Err` means the stored
    /// hash could not be used at all.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        self.verifications.fetch_add(1, Ordering::Relaxed);

        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Failed to parse stored password hash: {:?}", e);
            AuthError::HashingFailure(e.to_string())
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::error!("Password verification failed: {:?}", e);
                Err(AuthError::HashingFailure(e.to_string()))
            }
        }
    }

    /// Hash on the blocking pool so the runtime is not stalled by Argon2
    pub async fn hash_blocking(self: Arc<Self>, password: String) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(move || self.hash(&password))
            .await
            .map_err(|e| AuthError::HashingFailure(e.to_string()))?
    }

    /// Verify on the blocking pool
    pub async fn verify_blocking(
        self: Arc<Self>,
        password: String,
        hash: String,
    ) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || self.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::HashingFailure(e.to_string()))?
    }

    /// Verify against the dummy hash so a missing account costs the same
    /// as a wrong password. The result is always a mismatch.
    pub async fn verify_dummy_blocking(self: Arc<Self>, password: String) -> Result<(), AuthError> {
        tokio::task::spawn_blocking(move || self.verify(&password, &self.dummy_hash))
            .await
            .map_err(|e| AuthError::HashingFailure(e.to_string()))??;

        Ok(())
    }

    /// Number of password verifications performed
    pub fn verifications(&self) -> u64 {
        self.verifications.load(Ordering::Relaxed)
    }

    /// Validate password against policy
    pub fn validate_password_policy(password: &str, policy: &SecurityConfig) -> Result<(), AppError> {
        if password.chars().count() < policy.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                policy.password_min_length
            )));
        }

        Ok(())
    }
}
