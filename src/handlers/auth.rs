//! 会话相关的 HTTP 处理器

use crate::{
    auth::extract_bearer,
    error::AppError,
    handlers::ValidatedJson,
    middleware::AppState,
    models::auth::{LoginRequest, LoginResponse, RefreshResponse},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .session_service
        .login(&req.email, &req.password, req.expires_in_seconds)
        .await?;

    Ok(Json(LoginResponse {
        user: session.user.into(),
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// 刷新访问令牌，刷新令牌放在 `Authorization: Bearer` 中
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = extract_bearer(&headers)?;
    let token = state.session_service.refresh(refresh_token).await?;

    Ok(Json(RefreshResponse { token }))
}

/// 撤销刷新令牌
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = extract_bearer(&headers)?;
    state.session_service.revoke(refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
