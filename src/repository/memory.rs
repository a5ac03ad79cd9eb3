//! In-memory repositories
//!
//! Backs the test suite and `chirpy --memory`. Mirrors the PostgreSQL
//! schema's constraints: unique email, cascade delete from users.

use super::{ChirpRepository, RefreshTokenRepository, StoreError, UserRepository};
use crate::models::{auth::RefreshToken, chirp::Chirp, user::User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    chirps: RwLock<Vec<Chirp>>,
    refresh_tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        Ok(users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;

        Ok(users
            .get_mut(&id)
            .map(|user| {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn delete_all_users(&self) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;
        let removed = users.len() as u64;
        users.clear();

        self.chirps.write().await.clear();
        self.refresh_tokens.write().await.clear();

        Ok(removed)
    }
}

#[async_trait]
impl ChirpRepository for MemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, StoreError> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        self.chirps.write().await.push(chirp.clone());

        Ok(chirp)
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, StoreError> {
        let mut chirps: Vec<Chirp> = self
            .chirps
            .read()
            .await
            .iter()
            .filter(|c| author_id.map_or(true, |author| c.user_id == author))
            .cloned()
            .collect();
        chirps.sort_by_key(|c| c.created_at);

        Ok(chirps)
    }

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>, StoreError> {
        Ok(self.chirps.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut chirps = self.chirps.write().await;
        let before = chirps.len();
        chirps.retain(|c| c.id != id);

        Ok(chirps.len() < before)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn create_refresh_token(&self, record: &RefreshToken) -> Result<RefreshToken, StoreError> {
        let mut tokens = self.refresh_tokens.write().await;

        if tokens.contains_key(&record.token) {
            return Err(StoreError::Conflict("refresh token already exists".to_string()));
        }
        tokens.insert(record.token.clone(), record.clone());

        Ok(record.clone())
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        Ok(self.refresh_tokens.read().await.get(token).cloned())
    }

    async fn mark_revoked(&self, token: &str) -> Result<bool, StoreError> {
        let mut tokens = self.refresh_tokens.write().await;

        Ok(tokens
            .get_mut(token)
            .map(|record| {
                // 重复撤销不改变记录
                if record.revoked_at.is_none() {
                    let now = Utc::now();
                    record.revoked_at = Some(now);
                    record.updated_at = now;
                }
            })
            .is_some())
    }
}
