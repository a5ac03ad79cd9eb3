//! 用户注册与资料更新的 HTTP 处理器

use crate::{
    auth::{AuthContext, PasswordHasher},
    error::AppError,
    handlers::ValidatedJson,
    middleware::AppState,
    models::user::{CreateUserRequest, UpdateUserRequest, UserResponse},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// 注册用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    PasswordHasher::validate_password_policy(&req.password, &state.config.security)?;

    let hashed = state.hasher.clone().hash_blocking(req.password).await?;
    let user = state.users.create_user(&req.email, &hashed).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// 更新当前用户的邮箱和密码
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    PasswordHasher::validate_password_policy(&req.password, &state.config.security)?;

    let hashed = state.hasher.clone().hash_blocking(req.password).await?;
    let user = state
        .users
        .update_credentials(auth.user_id, &req.email, &hashed)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    tracing::info!(user_id = %user.id, "User credentials updated");

    Ok(Json(UserResponse::from(user)))
}
