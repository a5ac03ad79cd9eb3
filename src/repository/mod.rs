//! Database repository layer
//!
//! Persistence is reached only through these traits so the same services run
//! over PostgreSQL in production and over [`MemoryStore`] in tests.

use crate::models::{auth::RefreshToken, chirp::Chirp, user::User};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage-layer error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate record: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Replace email and password hash; `None` if the user is gone
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Returns false when no such user exists
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Deletes every user together with their chirps and refresh tokens
    async fn delete_all_users(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait ChirpRepository: Send + Sync {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, StoreError>;

    /// All chirps, oldest first, optionally restricted to one author
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, StoreError>;

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>, StoreError>;

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshToken) -> Result<RefreshToken, StoreError>;

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Sets `revoked_at` if unset. Returns false when the token does not exist.
    async fn mark_revoked(&self, token: &str) -> Result<bool, StoreError>;
}
