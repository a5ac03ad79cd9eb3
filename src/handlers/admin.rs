//! 管理端点：访问统计与开发环境重置

use crate::{error::AppError, middleware::AppState};
use axum::{extract::State, response::Html, response::IntoResponse};
use std::sync::Arc;

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>\n",
        state.hits()
    ))
}

/// 仅在 platform=dev 时允许：清零访问计数并删除所有用户
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    if !state.config.is_dev() {
        tracing::warn!(platform = %state.config.server.platform, "Reset refused outside dev");
        return Err(AppError::Forbidden);
    }

    state.reset_hits();
    let deleted = state.users.delete_all_users().await?;

    tracing::info!(deleted_users = deleted, "State reset");
    Ok("Hits reset to 0 and database reset to initial state.")
}
