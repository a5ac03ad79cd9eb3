//! Chirp 的 HTTP 处理器

use crate::{
    auth::AuthContext,
    error::AppError,
    handlers::ValidatedJson,
    middleware::AppState,
    models::chirp::{CreateChirpRequest, ListChirpsQuery, SortOrder},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {}", what)))
}

/// 发布 chirp
pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<CreateChirpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let chirp = state.chirp_service.create(auth.user_id, &req.body).await?;
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// 列出 chirps，可按作者过滤、按时间排序
pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let author_id = match query.author_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_id(raw, "author_id")?),
    };

    let order = match query.sort.as_deref() {
        None | Some("") => SortOrder::default(),
        Some(raw) => raw.parse::<SortOrder>().map_err(AppError::BadRequest)?,
    };

    let chirps = state.chirp_service.list(author_id, order).await?;
    Ok(Json(chirps))
}

pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&chirp_id, "chirp ID")?;
    let chirp = state.chirp_service.get(id).await?;
    Ok(Json(chirp))
}

/// 删除 chirp（仅作者）
pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(chirp_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&chirp_id, "chirp ID")?;
    state.chirp_service.delete(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
