//! 会话服务：登录、令牌刷新、撤销

use crate::{
    auth::{clamp_ttl, AuthError, PasswordHasher, RefreshTokenStore, TokenSigner},
    models::user::User,
    repository::UserRepository,
};
use chrono::Duration;
use std::sync::Arc;

/// Result of a successful login
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    signer: Arc<TokenSigner>,
    refresh_tokens: RefreshTokenStore,
    access_token_ttl: Duration,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        signer: Arc<TokenSigner>,
        refresh_tokens: RefreshTokenStore,
        access_token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            signer,
            refresh_tokens,
            access_token_ttl,
        }
    }

    /// 用户登录
    ///
    /// 未知邮箱与密码错误对外都是 InvalidCredential，只在日志中区分
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        expires_in_secs: Option<i64>,
    ) -> Result<Session, AuthError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                // 与密码错误付出相同的哈希开销
                self.hasher
                    .clone()
                    .verify_dummy_blocking(password.to_string())
                    .await?;
                tracing::info!(reason = "unknown_email", "Login failed");
                return Err(AuthError::InvalidCredential);
            }
        };

        let matched = self
            .hasher
            .clone()
            .verify_blocking(password.to_string(), user.hashed_password.clone())
            .await?;

        if !matched {
            tracing::info!(user_id = %user.id, reason = "wrong_password", "Login failed");
            return Err(AuthError::InvalidCredential);
        }

        let ttl = clamp_ttl(expires_in_secs, self.access_token_ttl);
        let access_token = self.signer.issue(user.id, ttl)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, ttl_secs = ttl.num_seconds(), "User logged in");

        Ok(Session {
            user,
            access_token,
            refresh_token: refresh_token.token,
        })
    }

    /// 刷新令牌：用刷新令牌换取新的访问令牌，刷新令牌本身不轮换
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user_id = self.refresh_tokens.resolve_user(refresh_token).await.map_err(|e| {
            tracing::info!(kind = e.kind(), "Refresh rejected");
            e
        })?;

        let access_token = self.signer.issue(user_id, self.access_token_ttl)?;

        tracing::debug!(%user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// 撤销刷新令牌
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_tokens.revoke(refresh_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    struct Fixture {
        service: SessionService,
        hasher: Arc<PasswordHasher>,
        signer: Arc<TokenSigner>,
        store: Arc<MemoryStore>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let hasher = Arc::new(PasswordHasher::with_params(4096, 1, 1).unwrap());
        let signer = Arc::new(TokenSigner::new(b"test_secret_key_32_characters_long!"));

        let hash = hasher.hash("correct horse").unwrap();
        store.create_user("walt@breakingbad.com", &hash).await.unwrap();

        let service = SessionService::new(
            store.clone(),
            hasher.clone(),
            signer.clone(),
            RefreshTokenStore::new(store.clone(), Duration::days(60)),
            Duration::hours(1),
        );

        Fixture {
            service,
            hasher,
            signer,
            store,
        }
    }

    #[tokio::test]
    async fn test_login_issues_both_tokens() {
        let f = fixture().await;

        let session = f
            .service
            .login("walt@breakingbad.com", "correct horse", None)
            .await
            .unwrap();

        assert_eq!(f.signer.validate(&session.access_token).unwrap(), session.user.id);

        use crate::repository::RefreshTokenRepository;
        let record = f
            .store
            .find_refresh_token(&session.refresh_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.user_id, session.user.id);
        assert_eq!(record.expires_at - record.created_at, Duration::days(60));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_alike() {
        let f = fixture().await;

        let wrong = f
            .service
            .login("walt@breakingbad.com", "wrong horse", None)
            .await
            .unwrap_err();
        let unknown = f
            .service
            .login("jesse@breakingbad.com", "correct horse", None)
            .await
            .unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredential));
        assert!(matches!(unknown, AuthError::InvalidCredential));
    }

    #[tokio::test]
    async fn test_unknown_email_pays_hashing_cost() {
        let f = fixture().await;

        let before = f.hasher.verifications();
        f.service
            .login("walt@breakingbad.com", "wrong horse", None)
            .await
            .unwrap_err();
        let after_wrong_password = f.hasher.verifications();

        f.service
            .login("jesse@breakingbad.com", "correct horse", None)
            .await
            .unwrap_err();
        let after_unknown_email = f.hasher.verifications();

        assert_eq!(after_wrong_password - before, 1);
        assert_eq!(after_unknown_email - after_wrong_password, 1);
    }

    #[tokio::test]
    async fn test_refresh_then_revoke() {
        let f = fixture().await;
        let session = f
            .service
            .login("walt@breakingbad.com", "correct horse", None)
            .await
            .unwrap();

        let access = f.service.refresh(&session.refresh_token).await.unwrap();
        assert_eq!(f.signer.validate(&access).unwrap(), session.user.id);

        // 不轮换：同一个刷新令牌可以再次使用
        assert!(f.service.refresh(&session.refresh_token).await.is_ok());

        f.service.revoke(&session.refresh_token).await.unwrap();
        assert!(matches!(
            f.service.refresh(&session.refresh_token).await.unwrap_err(),
            AuthError::RefreshTokenRevoked
        ));
    }
}
