//! JWT 认证中间件

use crate::{
    auth::{jwt::TokenSigner, AuthError},
    error::AppError,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Auth(AuthError::MissingAuthHeader))
    }
}

/// 从 Authorization 头提取 `<scheme> <credential>` 中的凭证
///
/// 必须恰好是两段、单个空格分隔
fn extract_credential<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, AuthError> {
    let value = match headers.get(AUTHORIZATION) {
        None => return Err(AuthError::MissingAuthHeader),
        Some(v) => v.to_str().map_err(|_| AuthError::MalformedAuthHeader)?,
    };

    if value.is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }

    let mut fields = value.split(' ');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(s), Some(credential), None) if s == scheme && !credential.is_empty() => Ok(credential),
        _ => Err(AuthError::MalformedAuthHeader),
    }
}

/// 提取 `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    extract_credential(headers, "Bearer")
}

/// 提取 `Authorization: ApiKey <key>`（Polka 回调使用）
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    extract_credential(headers, "ApiKey")
}

/// 提取并校验访问令牌，返回用户 ID
pub fn authenticate(headers: &HeaderMap, signer: &TokenSigner) -> Result<Uuid, AuthError> {
    let token = extract_bearer(headers)?;
    signer.validate(token)
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(signer): State<Arc<TokenSigner>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 校验失败时直接短路，不会调用被保护的 handler
    let user_id = authenticate(req.headers(), &signer).map_err(|e| {
        tracing::debug!(kind = e.kind(), uri = %req.uri().path(), "Request rejected by auth gate");
        e
    })?;

    // 附加到请求扩展
    req.extensions_mut().insert(AuthContext { user_id });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_valid() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(extract_bearer(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_extract_bearer_missing() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_bearer(&headers).unwrap_err(),
            AuthError::MissingAuthHeader
        ));
    }

    #[test]
    fn test_extract_bearer_empty() {
        assert!(matches!(
            extract_bearer(&headers_with("")).unwrap_err(),
            AuthError::MissingAuthHeader
        ));
    }

    #[test]
    fn test_extract_bearer_malformed() {
        for value in [
            "abc123",
            "Bearer",
            "Bearer ",
            "Bearer  abc123",
            "Bearer abc 123",
            "bearer abc123",
            "Basic abc123",
            "ApiKey abc123",
        ] {
            assert!(
                matches!(
                    extract_bearer(&headers_with(value)).unwrap_err(),
                    AuthError::MalformedAuthHeader
                ),
                "{value:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_extract_api_key() {
        let headers = headers_with("ApiKey f271c81ff7084ee5b99a5091b42d486e");
        assert_eq!(
            extract_api_key(&headers).unwrap(),
            "f271c81ff7084ee5b99a5091b42d486e"
        );
        assert!(extract_api_key(&headers_with("Bearer abc")).is_err());
    }

    #[test]
    fn test_authenticate() {
        let signer = TokenSigner::new(b"test_secret_key_32_characters_long!");
        let user_id = Uuid::new_v4();
        let token = signer.issue(user_id, Duration::hours(1)).unwrap();

        let headers = headers_with(&format!("Bearer {}", token));
        assert_eq!(authenticate(&headers, &signer).unwrap(), user_id);

        let forged = TokenSigner::new(b"another-secret")
            .issue(user_id, Duration::hours(1))
            .unwrap();
        let headers = headers_with(&format!("Bearer {}", forged));
        assert!(matches!(
            authenticate(&headers, &signer).unwrap_err(),
            AuthError::TokenForged
        ));
    }
}
