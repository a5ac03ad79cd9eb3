//! 认证 API 集成测试

use axum::http::{Method, StatusCode};
use chirpy::{
    auth::{Claims, TokenSigner},
    repository::RefreshTokenRepository,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::json;
use uuid::Uuid;

mod common;
use common::{
    bearer, create_test_app, create_test_user, login, send, signed_in_user, TEST_JWT_SECRET,
    TEST_PASSWORD,
};

fn decode_claims(token: &str) -> Claims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&["chirpy"]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        &validation,
    )
    .unwrap()
    .claims
}

#[tokio::test]
async fn test_login_success() {
    let (app, state) = create_test_app();
    let user = create_test_user(&app, "walt@breakingbad.com", TEST_PASSWORD).await;

    let body = login(&app, "walt@breakingbad.com", TEST_PASSWORD).await;

    assert_eq!(body["id"], user["id"]);
    assert_eq!(body["email"], "walt@breakingbad.com");
    assert_eq!(body["is_chirpy_red"], false);
    assert!(body.get("hashed_password").is_none());

    // 访问令牌：1 小时
    let claims = decode_claims(body["token"].as_str().unwrap());
    assert_eq!(claims.iss, "chirpy");
    assert_eq!(claims.sub, user["id"].as_str().unwrap());
    assert_eq!(claims.exp - claims.iat, 3600);
    assert!((claims.exp - (Utc::now() + Duration::hours(1)).timestamp()).abs() <= 5);

    // 刷新令牌：64 位十六进制，60 天
    let refresh = body["refresh_token"].as_str().unwrap();
    assert_eq!(refresh.len(), 64);
    assert!(refresh.chars().all(|c| c.is_ascii_hexdigit()));

    let record = state
        .refresh_tokens
        .find_refresh_token(refresh)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.user_id.to_string(), user["id"].as_str().unwrap());
    assert_eq!(record.expires_at - record.created_at, Duration::days(60));
    assert!(record.revoked_at.is_none());
}

#[tokio::test]
async fn test_login_expires_in_seconds_is_clamped() {
    let (app, _) = create_test_app();
    create_test_user(&app, "walt@breakingbad.com", TEST_PASSWORD).await;

    let (_, short) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({
            "email": "walt@breakingbad.com",
            "password": TEST_PASSWORD,
            "expires_in_seconds": 60
        })),
    )
    .await;
    let claims = decode_claims(short["token"].as_str().unwrap());
    assert_eq!(claims.exp - claims.iat, 60);

    let (_, long) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({
            "email": "walt@breakingbad.com",
            "password": TEST_PASSWORD,
            "expires_in_seconds": 7200
        })),
    )
    .await;
    let claims = decode_claims(long["token"].as_str().unwrap());
    assert_eq!(claims.exp - claims.iat, 3600);

    let (status, huge) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({
            "email": "walt@breakingbad.com",
            "password": TEST_PASSWORD,
            "expires_in_seconds": i64::MAX
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let claims = decode_claims(huge["token"].as_str().unwrap());
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _) = create_test_app();
    create_test_user(&app, "walt@breakingbad.com", TEST_PASSWORD).await;

    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "walt@breakingbad.com", "password": "not-the-password" })),
    )
    .await;

    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "jesse@breakingbad.com", "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["error"]["message"], unknown_body["error"]["message"]);
    assert_eq!(wrong_body["error"]["message"], "Incorrect email or password");
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let (app, _) = create_test_app();
    create_test_user(&app, "walt@breakingbad.com", TEST_PASSWORD).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "walt", "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid email address");
}

#[tokio::test]
async fn test_refresh_and_revoke_flow() {
    let (app, _) = create_test_app();
    let (_, refresh_token, user_id) = signed_in_user(&app, "walt@breakingbad.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/refresh",
        Some(&bearer(&refresh_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let claims = decode_claims(body["token"].as_str().unwrap());
    assert_eq!(claims.sub, user_id);

    // 新访问令牌可用于受保护的接口
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/chirps",
        Some(&bearer(body["token"].as_str().unwrap())),
        Some(json!({ "body": "refreshed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/revoke",
        Some(&bearer(&refresh_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/refresh",
        Some(&bearer(&refresh_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 重复撤销仍然成功
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/revoke",
        Some(&bearer(&refresh_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_refresh_rejects_unknown_and_access_tokens() {
    let (app, _) = create_test_app();
    let (access_token, _, _) = signed_in_user(&app, "walt@breakingbad.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/refresh",
        Some(&bearer(&"ab".repeat(32))),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/refresh",
        Some(&bearer(&access_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::POST, "/api/refresh", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_bad_headers() {
    let (app, _) = create_test_app();
    let (access_token, _, _) = signed_in_user(&app, "walt@breakingbad.com").await;
    let chirp = Some(json!({ "body": "hello" }));

    for header in [
        None,
        Some(String::new()),
        Some("Bearer".to_string()),
        Some("Bearer ".to_string()),
        Some(format!("Token {}", access_token)),
        Some(format!("Bearer  {}", access_token)),
        Some(format!("Bearer {} extra", access_token)),
        Some("Bearer not.a.jwt".to_string()),
    ] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/chirps",
            header.as_deref(),
            chirp.clone(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", header);
        assert_eq!(body["error"]["code"], 401);
    }
}

#[tokio::test]
async fn test_expired_and_forged_tokens_rejected() {
    let (app, _) = create_test_app();
    let (_, _, user_id) = signed_in_user(&app, "walt@breakingbad.com").await;
    let user_id = Uuid::parse_str(&user_id).unwrap();

    let expired = TokenSigner::new(TEST_JWT_SECRET.as_bytes())
        .issue(user_id, Duration::seconds(-10))
        .unwrap();
    let forged = TokenSigner::new(b"another-secret-that-is-32-chars-long!!")
        .issue(user_id, Duration::hours(1))
        .unwrap();

    for token in [expired, forged] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/chirps",
            Some(&bearer(&token)),
            Some(json!({ "body": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid or expired token");
    }
}
