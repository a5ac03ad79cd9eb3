//! 健康检查处理器

use axum::{http::header, response::IntoResponse};

/// 就绪探针，纯文本 `OK`
pub async fn readiness() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}
