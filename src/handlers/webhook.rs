//! Polka 支付回调

use crate::{
    auth::{extract_api_key, AuthError},
    error::AppError,
    handlers::ValidatedJson,
    middleware::AppState,
    models::webhook::PolkaWebhookRequest,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use secrecy::ExposeSecret;
use std::sync::Arc;

/// 处理 Polka 回调：`user.upgraded` 升级为 Chirpy Red，其他事件忽略
pub async fn polka_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    // 请求体在 API key 校验通过后才解析
    let key = extract_api_key(&headers)?;
    let expected = state.config.security.polka_key.expose_secret();

    if expected.is_empty() || key != expected.as_str() {
        tracing::warn!("Polka webhook rejected: API key mismatch");
        return Err(AuthError::InvalidApiKey.into());
    }

    let ValidatedJson(req) = ValidatedJson::<PolkaWebhookRequest>::from_bytes(&body)?;

    if !req.is_upgrade() {
        tracing::debug!(event = %req.event, "Ignoring Polka event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = req.data.user_id;
    if !state.users.upgrade_to_chirpy_red(user_id).await? {
        return Err(AppError::not_found("user"));
    }

    tracing::info!(%user_id, "User upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
